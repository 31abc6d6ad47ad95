use crate::grammar;
use crate::token::{Token, TokenKind};
use serde::Serialize;
use std::fmt;

/// A source line quoted in a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    pub number: usize,
    pub text: String,
}

/// A grammar rule quoted in a diagnostic, rendered from the grammar table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSnippet {
    pub name: String,
    pub definition: String,
}

/// Everything a caller needs to explain a rejected document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<Token>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<String>,
    pub context: Vec<SourceLine>,
    pub rules: Vec<RuleSnippet>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
        Diagnostic {
            message: message.into(),
            line,
            column,
            token: None,
            expected: None,
            context: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Positioned at `token`, which is recorded as the offending token.
    pub fn at(message: impl Into<String>, token: &Token) -> Self {
        let mut diagnostic = Diagnostic::new(message, token.line, token.column);
        diagnostic.token = Some(token.clone());
        diagnostic
    }

    pub fn expecting(mut self, expected: impl Into<String>) -> Self {
        self.expected = Some(expected.into());
        self
    }

    /// Quote the offending line and the one before it.
    pub fn within(mut self, source: &str) -> Self {
        let lines: Vec<&str> = source.lines().collect();
        let last = self.line.min(lines.len());
        let first = last.saturating_sub(1).max(1);
        self.context = (first..=last)
            .filter_map(|number| {
                lines.get(number - 1).map(|text| SourceLine {
                    number,
                    text: (*text).to_owned(),
                })
            })
            .collect();
        self
    }

    /// Attach the rules being parsed, given outermost first; they are
    /// stored most specific first.
    pub fn under(mut self, rules: &[&'static str]) -> Self {
        self.rules = rules
            .iter()
            .rev()
            .map(|name| RuleSnippet {
                name: (*name).to_owned(),
                definition: grammar::definition(name).unwrap_or_default().to_owned(),
            })
            .collect();
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        if let Some(token) = &self.token {
            writeln!(f, "{}", token)?;
        }
        for line in &self.context {
            writeln!(f, "{:04}: {}", line.number, line.text)?;
            if line.number == self.line {
                writeln!(f, "      {}^", " ".repeat(self.column.saturating_sub(1)))?;
            }
        }
        if !self.rules.is_empty() {
            match &self.expected {
                Some(expected) => writeln!(f, "Was expecting '{}' from:", expected)?,
                None => writeln!(f, "While parsing:")?,
            }
            for rule in &self.rules {
                writeln!(f, "  {}: {}", rule.name, rule.definition)?;
            }
        }
        Ok(())
    }
}

/// A parse failure. Every kind is fatal for the document being parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
#[serde(tag = "kind", content = "diagnostic", rename_all = "snake_case")]
pub enum BaliError {
    /// No matcher accepted the next character.
    #[error("lexical error: {0}")]
    Lexical(Box<Diagnostic>),
    /// A required grammar continuation was not found.
    #[error("syntax error: {0}")]
    Syntax(Box<Diagnostic>),
    /// The parsed shape would violate an AST invariant.
    #[error("structural error: {0}")]
    Structural(Box<Diagnostic>),
    /// The document does not end with an EOL.
    #[error("missing terminator: {0}")]
    MissingTerminator(Box<Diagnostic>),
}

impl BaliError {
    pub fn diagnostic(&self) -> &Diagnostic {
        match self {
            BaliError::Lexical(d)
            | BaliError::Syntax(d)
            | BaliError::Structural(d)
            | BaliError::MissingTerminator(d) => &**d,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            BaliError::Lexical(_) => "lexical",
            BaliError::Syntax(_) => "syntax",
            BaliError::Structural(_) => "structural",
            BaliError::MissingTerminator(_) => "missing_terminator",
        }
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::json!({
                "kind": self.kind_name(),
                "message": format!("unserializable diagnostic: {}", e),
            })
        })
    }
}

/// Invariant violations detected while building AST nodes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("'{text}' is not a valid {kind} literal")]
    InvalidLiteral { kind: TokenKind, text: String },

    #[error("range endpoints must have identical types, found {first} and {last}")]
    MismatchedEndpoints { first: String, last: String },

    #[error("{0} values cannot bound a range")]
    UnrangeableEndpoint(String),

    #[error("the interval from {first} to {last} would have a negative size")]
    NegativeSize { first: i64, last: i64 },

    #[error("the interval from {first} to {last} has more members than can be counted")]
    Uncountable { first: i64, last: i64 },

    #[error("an interval of {0} members is too large to list")]
    TooManyMembers(u64),

    #[error("{0} requires at least one match block")]
    MissingMatchBlocks(&'static str),

    #[error("{0} requires at least one index")]
    MissingIndices(&'static str),

    #[error("nesting exceeds the maximum depth of {0}")]
    TooDeep(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_places_caret_under_the_column() {
        let token = Token::new(TokenKind::Delimiter, "}", 1, 12);
        let diagnostic = Diagnostic::at("unexpected token", &token)
            .within("{if true do}\n")
            .expecting("procedure")
            .under(&[grammar::PROCEDURE, grammar::IF_CLAUSE]);
        let text = diagnostic.to_string();
        assert!(text.contains("0001: {if true do}\n"));
        assert!(text.contains(&format!("\n      {}^\n", " ".repeat(11))));
        assert!(text.contains("Was expecting 'procedure' from:"));
        let if_at = text.find("$ifClause").unwrap();
        let procedure_at = text.find("$procedure:").unwrap();
        assert!(if_at < procedure_at, "most specific rule comes first");
    }

    #[test]
    fn context_quotes_the_previous_line_too() {
        let diagnostic = Diagnostic::new("oops", 3, 1).within("a\nb\nc\nd\n");
        let numbers: Vec<usize> = diagnostic.context.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn json_rendering_names_the_kind() {
        let diagnostic = Diagnostic::new("missing EOL", 1, 4);
        let error = BaliError::MissingTerminator(Box::new(diagnostic));
        let json = error.to_json_value();
        assert_eq!(json["kind"], "missing_terminator");
        assert_eq!(json["diagnostic"]["line"], 1);
    }

    #[test]
    fn errors_stay_pointer_sized() {
        assert_eq!(
            std::mem::size_of::<BaliError>(),
            2 * std::mem::size_of::<usize>()
        );
    }
}
