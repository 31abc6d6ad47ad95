//! Tokens produced by the scanner and consumed by the parser.

use serde::Serialize;
use std::fmt;

/// The closed set of token kinds recognised by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    Angle,
    Binary,
    Boolean,
    Bytecode,
    Comment,
    Delimiter,
    Duration,
    Eof,
    Eol,
    Error,
    Identifier,
    Intrinsic,
    Keyword,
    Moment,
    Name,
    Narrative,
    Note,
    Number,
    Pattern,
    Percentage,
    Probability,
    Quote,
    Resource,
    Symbol,
    Tag,
    Version,
    /// Consumed by the scanner, never forwarded to the parser.
    Whitespace,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Angle => "ANGLE",
            TokenKind::Binary => "BINARY",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::Bytecode => "BYTECODE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Delimiter => "DELIMITER",
            TokenKind::Duration => "DURATION",
            TokenKind::Eof => "EOF",
            TokenKind::Eol => "EOL",
            TokenKind::Error => "ERROR",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Intrinsic => "INTRINSIC",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Moment => "MOMENT",
            TokenKind::Name => "NAME",
            TokenKind::Narrative => "NARRATIVE",
            TokenKind::Note => "NOTE",
            TokenKind::Number => "NUMBER",
            TokenKind::Pattern => "PATTERN",
            TokenKind::Percentage => "PERCENTAGE",
            TokenKind::Probability => "PROBABILITY",
            TokenKind::Quote => "QUOTE",
            TokenKind::Resource => "RESOURCE",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Tag => "TAG",
            TokenKind::Version => "VERSION",
            TokenKind::Whitespace => "WHITESPACE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One scanned token. Line and column are 1-based; the column counts
/// characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            line,
            column,
        }
    }

    /// True for a DELIMITER token with exactly this text.
    pub fn is_delimiter(&self, text: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.text == text
    }

    /// True for a KEYWORD token with exactly this text.
    pub fn is_keyword(&self, text: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self.kind {
            TokenKind::Eol => "<EOL>".to_owned(),
            TokenKind::Eof => "<EOF>".to_owned(),
            _ => self.text.clone(),
        };
        write!(
            f,
            "Token [type: {}, line: {}, column: {}]: {:?}",
            self.kind, self.line, self.column, text
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_spells_out_line_terminators() {
        let eol = Token::new(TokenKind::Eol, "\n", 3, 7);
        assert_eq!(
            eol.to_string(),
            "Token [type: EOL, line: 3, column: 7]: \"<EOL>\""
        );
    }

    #[test]
    fn delimiter_and_keyword_checks_match_kind_and_text() {
        let bracket = Token::new(TokenKind::Delimiter, "[", 1, 1);
        assert!(bracket.is_delimiter("["));
        assert!(!bracket.is_keyword("["));
        let keyword = Token::new(TokenKind::Keyword, "if", 1, 1);
        assert!(keyword.is_keyword("if"));
        assert!(!keyword.is_delimiter("if"));
    }
}
