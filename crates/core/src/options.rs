//! Parse options.
//!
//! Deserializable so that front ends can read them from their own
//! configuration files (the `bali` CLI reads a `[parser]` table).

use crate::scanner::CHANNEL_CAPACITY;
use serde::Deserialize;

/// Default limit on nesting of components, expressions and procedures.
pub const MAX_DEPTH: usize = 32;

/// How tokens reach the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scanning {
    /// The parser pulls tokens from the scanner on demand.
    #[default]
    Inline,
    /// The scanner runs on its own thread and feeds a bounded channel.
    Threaded,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseOptions {
    pub max_depth: usize,
    pub scanning: Scanning,
    pub channel_capacity: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: MAX_DEPTH,
            scanning: Scanning::Inline,
            channel_capacity: CHANNEL_CAPACITY,
        }
    }
}

impl ParseOptions {
    pub fn threaded() -> Self {
        ParseOptions {
            scanning: Scanning::Threaded,
            ..Self::default()
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options: ParseOptions = serde_json::from_str(r#"{"scanning": "threaded"}"#).unwrap();
        assert_eq!(options.scanning, Scanning::Threaded);
        assert_eq!(options.max_depth, MAX_DEPTH);
        assert_eq!(options.channel_capacity, CHANNEL_CAPACITY);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result: Result<ParseOptions, _> = serde_json::from_str(r#"{"depth": 3}"#);
        assert!(result.is_err());
    }
}
