//! Recursive-descent parser for BDN.
//!
//! There is one method per grammar rule. Alternatives are tried in the
//! order the grammar table lists them, and an alternative that does not
//! apply hands back every token it consumed before the next one is tried
//! (see [`Parser::attempt`]). Once a rule has seen enough to commit, such
//! as a clause keyword or the `..` of a range, a missing continuation is a
//! syntax error and the whole parse fails.
use crate::ast::Component;
use crate::error::{BaliError, Diagnostic, StructureError};
use crate::grammar;
use crate::options::{ParseOptions, Scanning};
use crate::scanner::{self, Scanner};
use crate::token::{Token, TokenKind};

mod entities;
mod expressions;
mod statements;

/// Outcome of trying one grammar alternative. `Ok(None)` means the
/// alternative did not apply and the token stream is as it was.
pub(crate) type Attempt<T> = Result<Option<T>, BaliError>;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

pub(crate) struct Parser<'s> {
    source: &'s str,
    tokens: Box<dyn Iterator<Item = Token> + 's>,
    /// Every token handed out so far, in order.
    consumed: Vec<Token>,
    /// Tokens given back by failed alternatives; the top is read next.
    pushback: Vec<Token>,
    eof: Option<Token>,
    rules: Vec<&'static str>,
    depth: usize,
    max_depth: usize,
}

impl<'s> Parser<'s> {
    pub(crate) fn new(source: &'s str, options: &ParseOptions) -> Self {
        let tokens: Box<dyn Iterator<Item = Token> + 's> = match options.scanning {
            Scanning::Inline => Box::new(Scanner::new(source)),
            Scanning::Threaded => Box::new(scanner::spawn(
                source.to_owned(),
                options.channel_capacity,
            )),
        };
        Self::from_tokens(source, tokens, options.max_depth)
    }

    fn from_tokens(
        source: &'s str,
        tokens: Box<dyn Iterator<Item = Token> + 's>,
        max_depth: usize,
    ) -> Self {
        Parser {
            source,
            tokens,
            consumed: Vec::new(),
            pushback: Vec::new(),
            eof: None,
            rules: Vec::new(),
            depth: 0,
            max_depth,
        }
    }

    // -- Token plumbing -----------------------------------------

    fn next_token(&mut self) -> Result<Token, BaliError> {
        let token = match self.pushback.pop() {
            Some(token) => token,
            None => self.pull()?,
        };
        self.consumed.push(token.clone());
        Ok(token)
    }

    fn pull(&mut self) -> Result<Token, BaliError> {
        if let Some(eof) = &self.eof {
            return Ok(eof.clone());
        }
        match self.tokens.next() {
            Some(token) if token.kind == TokenKind::Error => {
                Err(self.fatal(BaliError::Lexical, unexpected_character(&token)))
            }
            Some(token) => {
                if token.kind == TokenKind::Eof {
                    self.eof = Some(token.clone());
                }
                Ok(token)
            }
            None => Err(self.fatal(
                BaliError::MissingTerminator,
                missing_terminator(self.source),
            )),
        }
    }

    /// Give back the most recently read token.
    fn unread(&mut self) {
        if let Some(token) = self.consumed.pop() {
            self.pushback.push(token);
        }
    }

    fn mark(&self) -> usize {
        self.consumed.len()
    }

    /// Give back every token read since `mark`, newest first.
    fn rewind(&mut self, mark: usize) {
        let restored = self.consumed.len().saturating_sub(mark);
        for _ in 0..restored {
            self.unread();
        }
        if restored > 0 {
            tracing::trace!(restored, "rewound");
        }
    }

    fn peek_token(&mut self) -> Result<Token, BaliError> {
        let token = self.next_token()?;
        self.unread();
        Ok(token)
    }

    /// The last token read, used to position structural errors.
    fn last_token(&self) -> Token {
        self.consumed
            .last()
            .cloned()
            .unwrap_or_else(|| Token::new(TokenKind::Eof, "", 1, 1))
    }

    // -- Rule bookkeeping ---------------------------------------

    fn within<T>(
        &mut self,
        rule: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, BaliError>,
    ) -> Result<T, BaliError> {
        self.rules.push(rule);
        let result = f(self);
        self.rules.pop();
        result
    }

    /// Try one alternative under `rule`, restoring the stream if it does
    /// not apply.
    fn attempt<T>(
        &mut self,
        rule: &'static str,
        f: impl FnOnce(&mut Self) -> Attempt<T>,
    ) -> Attempt<T> {
        let mark = self.mark();
        let result = self.within(rule, f);
        if matches!(result, Ok(None)) {
            self.rewind(mark);
        }
        result
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, BaliError>,
    ) -> Result<T, BaliError> {
        if self.depth >= self.max_depth {
            let token = self.peek_token()?;
            return Err(self.structural(StructureError::TooDeep(self.max_depth), &token));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    // -- Token-level rules --------------------------------------

    fn attempt_token(&mut self, accept: impl Fn(&Token) -> bool) -> Attempt<Token> {
        let token = self.next_token()?;
        if accept(&token) {
            Ok(Some(token))
        } else {
            self.unread();
            Ok(None)
        }
    }

    fn attempt_kind(&mut self, kind: TokenKind) -> Attempt<Token> {
        self.attempt_token(|t| t.kind == kind)
    }

    fn attempt_delimiter(&mut self, text: &str) -> Result<bool, BaliError> {
        Ok(self.attempt_token(|t| t.is_delimiter(text))?.is_some())
    }

    fn attempt_keyword(&mut self, word: &str) -> Attempt<Token> {
        self.attempt_token(|t| t.is_keyword(word))
    }

    fn attempt_eol(&mut self) -> Result<bool, BaliError> {
        Ok(self.attempt_kind(TokenKind::Eol)?.is_some())
    }

    fn expect_delimiter(&mut self, text: &str) -> Result<Token, BaliError> {
        let token = self.attempt_token(|t| t.is_delimiter(text))?;
        self.required(token, text)
    }

    fn expect_keyword(&mut self, word: &str) -> Result<Token, BaliError> {
        let token = self.attempt_keyword(word)?;
        self.required(token, word)
    }

    fn expect_kind(&mut self, kind: TokenKind) -> Result<Token, BaliError> {
        let token = self.attempt_kind(kind)?;
        self.required(token, kind.as_str())
    }

    fn required<T>(&mut self, found: Option<T>, expected: &str) -> Result<T, BaliError> {
        match found {
            Some(value) => Ok(value),
            None => Err(self.unexpected(expected)),
        }
    }

    // -- Diagnostics --------------------------------------------

    fn unexpected(&mut self, expected: &str) -> BaliError {
        let token = match self.peek_token() {
            Ok(token) => token,
            Err(error) => return error,
        };
        let message = format!(
            "An unexpected token was found while looking for '{}'.",
            expected
        );
        let diagnostic = Diagnostic::at(message, &token).expecting(expected);
        self.fatal(BaliError::Syntax, diagnostic)
    }

    fn structural(&self, error: StructureError, token: &Token) -> BaliError {
        self.fatal(BaliError::Structural, Diagnostic::at(error.to_string(), token))
    }

    fn fatal(
        &self,
        kind: fn(Box<Diagnostic>) -> BaliError,
        diagnostic: Diagnostic,
    ) -> BaliError {
        let diagnostic = diagnostic.within(self.source).under(&self.rules);
        tracing::debug!(
            line = diagnostic.line,
            column = diagnostic.column,
            message = %diagnostic.message,
            "parse failed"
        );
        kind(Box::new(diagnostic))
    }

    // -- Entry points -------------------------------------------

    pub(crate) fn parse_document(&mut self) -> Result<Component, BaliError> {
        tracing::debug!(bytes = self.source.len(), "parsing document");
        let component = self.within(grammar::DOCUMENT, |p| {
            let component = p.parse_component()?;
            let component = p.required(component, "component")?;
            p.finish()?;
            Ok(component)
        })?;
        tracing::debug!(tokens = self.consumed.len(), "parsed document");
        Ok(component)
    }

    /// Parse one construct that must make up the whole source.
    pub(crate) fn parse_fragment<T>(
        &mut self,
        expected: &str,
        rule: impl FnOnce(&mut Self) -> Attempt<T>,
    ) -> Result<T, BaliError> {
        let found = rule(self)?;
        let value = self.required(found, expected)?;
        self.finish()?;
        Ok(value)
    }

    fn finish(&mut self) -> Result<(), BaliError> {
        self.expect_kind(TokenKind::Eol)?;
        self.expect_kind(TokenKind::Eof)?;
        Ok(())
    }
}

pub(crate) fn unexpected_character(token: &Token) -> Diagnostic {
    let message = format!("The scanner found an unexpected character: {}", token.text);
    Diagnostic::at(message, token)
}

pub(crate) fn missing_terminator(source: &str) -> Diagnostic {
    let (line, column) = end_of(source);
    Diagnostic::new(
        "The document does not end with an EOL character.",
        line,
        column,
    )
}

/// Line and column just past the last character of `source`.
pub(crate) fn end_of(source: &str) -> (usize, usize) {
    let line = source.matches('\n').count() + 1;
    let last = source.rsplit('\n').next().unwrap_or("");
    (line, last.chars().count() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parser(source: &str) -> Parser<'_> {
        Parser::new(source, &ParseOptions::default())
    }

    #[test]
    fn rewind_restores_tokens_in_source_order() {
        let mut p = parser("[1, 2]\n");
        let mark = p.mark();
        let first: Vec<String> = (0..4).map(|_| p.next_token().unwrap().text).collect();
        p.rewind(mark);
        let again: Vec<String> = (0..4).map(|_| p.next_token().unwrap().text).collect();
        assert_eq!(first, again);
        assert_eq!(first, vec!["[", "1", ",", "2"]);
    }

    #[test]
    fn eof_is_sticky() {
        let mut p = parser("\n");
        assert_eq!(p.next_token().unwrap().kind, TokenKind::Eol);
        assert_eq!(p.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(p.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn running_out_without_eof_is_a_missing_terminator() {
        let mut p = parser("true");
        assert_eq!(p.next_token().unwrap().text, "true");
        let err = p.next_token().unwrap_err();
        assert!(matches!(err, BaliError::MissingTerminator(_)));
        assert_eq!((err.diagnostic().line, err.diagnostic().column), (1, 5));
    }

    #[test]
    fn error_tokens_raise_lexical_errors() {
        let mut p = parser("\t\n");
        let err = p.next_token().unwrap_err();
        assert!(matches!(err, BaliError::Lexical(_)));
        assert!(err.diagnostic().message.contains("<HTAB>"));
    }

    #[test]
    fn attempt_rewinds_only_when_the_alternative_does_not_apply() {
        let mut p = parser("[1, 2]\n");
        let skipped: Attempt<()> = p.attempt(grammar::SERIES, |p| {
            p.next_token()?;
            p.next_token()?;
            Ok(None)
        });
        assert!(skipped.unwrap().is_none());
        assert_eq!(p.mark(), 0);
        assert!(p.rules.is_empty());
        let kept = p.attempt(grammar::SERIES, |p| p.next_token().map(Some));
        assert_eq!(kept.unwrap().unwrap().text, "[");
        assert_eq!(p.mark(), 1);
    }

    #[test]
    fn nesting_beyond_the_limit_is_structural() {
        let options = ParseOptions::default().with_max_depth(2);
        let mut p = Parser::new("[[[1]]]\n", &options);
        let err = p.parse_document().unwrap_err();
        assert!(matches!(err, BaliError::Structural(_)));
        assert!(err.diagnostic().message.contains("maximum depth of 2"));
    }

    #[test]
    fn end_position_follows_the_last_line() {
        assert_eq!(end_of("ab"), (1, 3));
        assert_eq!(end_of("a\nbcd"), (2, 4));
        assert_eq!(end_of(""), (1, 1));
    }

    proptest! {
        #[test]
        fn failed_attempts_leave_the_stream_where_it_was(
            reads in proptest::collection::vec(0usize..6, 1..8),
        ) {
            let source = "[$a: 1, $b: [2..5], $c: \"x\"]\n";
            let mut p = parser(source);
            let before = p.peek_token().unwrap();
            for count in reads {
                let outcome: Attempt<()> = p.attempt(grammar::MAPPING, |p| {
                    for _ in 0..count {
                        p.next_token()?;
                    }
                    Ok(None)
                });
                prop_assert!(outcome.unwrap().is_none());
                prop_assert_eq!(p.mark(), 0);
            }
            prop_assert_eq!(p.next_token().unwrap(), before);
        }
    }
}
