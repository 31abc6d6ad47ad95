//! bali-core: scanner, parser and canonical formatter for the Bali
//! Document Notation (BDN).
//!
//! # Public API
//!
//! - [`parse_document()`] -- bytes of a complete document to a [`Component`]
//! - [`parse_component()`], [`parse_entity()`], [`parse_context()`],
//!   [`parse_expression()`], [`parse_procedure()`] -- BDN fragments
//!   embedded in other text
//! - [`format()`] and friends -- canonical rendering
//! - [`tokenize()`] -- the token stream of a document
//! - [`BaliError`] -- every parse failure, with a [`Diagnostic`]
//!
//! Parsing is all or nothing: a document either parses completely or the
//! call fails with one diagnostic.

pub mod ast;
pub mod collections;
pub mod error;
pub mod formatter;
pub mod grammar;
pub mod options;
mod parser;
pub mod scanner;
pub mod token;
pub mod values;

use parser::Parser;
use std::borrow::Cow;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{
    Annotation, Attribute, Binary, Catalog, Clause, Collection, Component, Context, Continuum,
    Element, Entity, Expression, Extent, Interval, Key, MatchBlock, OnClause, Operator, Primitive,
    Procedure, Range, RangeClass, Recipient, SelectClause, Spectrum, Statement, StringValue,
    Subcomponent,
};
pub use error::{BaliError, Diagnostic, StructureError};
pub use options::{ParseOptions, Scanning};
pub use token::{Token, TokenKind};

// ── Convenience re-exports: rendering ────────────────────────────────

pub use formatter::{format, format_component, format_entity, format_expression, format_procedure};

/// Parse a complete document: one component, then EOL, then the end.
pub fn parse_document(bytes: &[u8]) -> Result<Component, BaliError> {
    parse_document_with(bytes, &ParseOptions::default())
}

pub fn parse_document_with(bytes: &[u8], options: &ParseOptions) -> Result<Component, BaliError> {
    let source = decode(bytes)?;
    Parser::new(source, options).parse_document()
}

/// Parse a component, supplying the terminating EOL when it is missing.
pub fn parse_component(text: &str) -> Result<Component, BaliError> {
    parse_component_with(text, &ParseOptions::default())
}

pub fn parse_component_with(text: &str, options: &ParseOptions) -> Result<Component, BaliError> {
    parse_document_with(terminated(text).as_bytes(), options)
}

/// Parse a bare entity, without context or note.
pub fn parse_entity(text: &str) -> Result<Entity, BaliError> {
    let source = terminated(text);
    let mut parser = Parser::new(&source, &ParseOptions::default());
    parser.parse_fragment("entity", |p| p.parse_entity())
}

/// Parse a parameter context such as `($type: /bali/collections/Set/v1)`.
pub fn parse_context(text: &str) -> Result<Context, BaliError> {
    let source = terminated(text);
    let mut parser = Parser::new(&source, &ParseOptions::default());
    parser.parse_fragment("context", |p| p.parse_context())
}

pub fn parse_expression(text: &str) -> Result<Expression, BaliError> {
    let source = terminated(text);
    let mut parser = Parser::new(&source, &ParseOptions::default());
    parser.parse_fragment("expression", |p| p.parse_expression())
}

pub fn parse_procedure(text: &str) -> Result<Procedure, BaliError> {
    let source = terminated(text);
    let mut parser = Parser::new(&source, &ParseOptions::default());
    parser.parse_fragment("procedure", |p| p.parse_procedure())
}

/// Scan a document into its tokens, ending with EOF.
pub fn tokenize(bytes: &[u8]) -> Result<Vec<Token>, BaliError> {
    let source = decode(bytes)?;
    let mut tokens = Vec::new();
    for token in scanner::Scanner::new(source) {
        match token.kind {
            TokenKind::Error => {
                let diagnostic = parser::unexpected_character(&token).within(source);
                return Err(BaliError::Lexical(Box::new(diagnostic)));
            }
            TokenKind::Eof => {
                tokens.push(token);
                tracing::debug!(tokens = tokens.len(), "tokenized document");
                return Ok(tokens);
            }
            _ => tokens.push(token),
        }
    }
    let diagnostic = parser::missing_terminator(source).within(source);
    Err(BaliError::MissingTerminator(Box::new(diagnostic)))
}

fn terminated(text: &str) -> Cow<'_, str> {
    if text.ends_with('\n') {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(format!("{}\n", text))
    }
}

fn decode(bytes: &[u8]) -> Result<&str, BaliError> {
    std::str::from_utf8(bytes).map_err(|error| {
        let prefix = String::from_utf8_lossy(&bytes[..error.valid_up_to()]);
        let (line, column) = parser::end_of(&prefix);
        let byte = bytes.get(error.valid_up_to()).copied().unwrap_or_default();
        let message = format!("The scanner found an invalid UTF-8 byte: <0x{:02X}>", byte);
        let diagnostic = Diagnostic::new(message, line, column).within(&prefix);
        BaliError::Lexical(Box::new(diagnostic))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragments_get_their_terminator() {
        assert!(parse_component("true").is_ok());
        assert!(parse_component("true\n").is_ok());
        assert!(parse_document(b"true").is_err());
    }

    #[test]
    fn invalid_utf8_is_lexical() {
        let err = parse_document(b"[1,\n \xff]\n").unwrap_err();
        assert!(matches!(err, BaliError::Lexical(_)));
        let diagnostic = err.diagnostic();
        assert!(diagnostic.message.contains("<0xFF>"));
        assert_eq!((diagnostic.line, diagnostic.column), (2, 2));
    }

    #[test]
    fn tokenize_ends_with_eof() {
        let tokens = tokenize(b"[1..3]\n").unwrap();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Delimiter,
                TokenKind::Number,
                TokenKind::Delimiter,
                TokenKind::Number,
                TokenKind::Delimiter,
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tokenize_reports_missing_terminators() {
        let err = tokenize(b"[1..3]").unwrap_err();
        assert!(matches!(err, BaliError::MissingTerminator(_)));
    }

    #[test]
    fn context_fragment() {
        let context = parse_context("($type: /bali/collections/Set/v1, $size: 3)").unwrap();
        assert_eq!(context.len(), 2);
        assert!(context.get("size").is_some());
    }
}
