//! Primitive value types: the elements and strings a component can hold.
//!
//! Each type is built from the literal text of one token and renders back to
//! that text. Values keep their literal form; arithmetic on them is not the
//! concern of this crate beyond what ranges need (integral numbers).

use crate::error::StructureError;
use crate::scanner;
use crate::token::TokenKind;
use serde::Serialize;
use std::fmt;

macro_rules! literal_value {
    ($(#[$meta:meta])* $name:ident => $kind:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Build the value from its literal text.
            pub fn from_token(text: &str) -> Result<Self, StructureError> {
                if scanner::matches_exactly($kind, text) {
                    Ok($name(text.to_owned()))
                } else {
                    Err(StructureError::InvalidLiteral {
                        kind: $kind,
                        text: text.to_owned(),
                    })
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

literal_value!(
    /// An angle such as `~π` or `~1.5`.
    Angle => TokenKind::Angle
);
literal_value!(
    /// An ISO-8601 style duration such as `~P3DT4H`.
    Duration => TokenKind::Duration
);
literal_value!(
    /// A moment in time such as `<2024-01-31T12:30:00>`.
    Moment => TokenKind::Moment
);
literal_value!(Number => TokenKind::Number);
literal_value!(
    /// `none`, `any`, or a quoted regular expression followed by `?`.
    Pattern => TokenKind::Pattern
);
literal_value!(Percentage => TokenKind::Percentage);
literal_value!(
    /// A probability: `.25`, `1.` and so on.
    Probability => TokenKind::Probability
);
literal_value!(Resource => TokenKind::Resource);
literal_value!(Binary => TokenKind::Binary);
literal_value!(Bytecode => TokenKind::Bytecode);
literal_value!(
    /// A moniker (slash separated name), e.g. `/bali/collections/Set/v1`.
    Moniker => TokenKind::Name
);
literal_value!(
    /// A multi-line narrative string, kept verbatim including its delimiters.
    Narrative => TokenKind::Narrative
);
literal_value!(Quote => TokenKind::Quote);
literal_value!(Symbol => TokenKind::Symbol);
literal_value!(Tag => TokenKind::Tag);
literal_value!(Version => TokenKind::Version);
literal_value!(
    /// A single-line note: `! text` up to the end of the line.
    Note => TokenKind::Note
);
literal_value!(
    /// A multi-line comment, `!>` through `<!`, kept verbatim.
    Comment => TokenKind::Comment
);

/// `true` or `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Boolean(bool);

impl Boolean {
    pub fn new(value: bool) -> Self {
        Boolean(value)
    }

    pub fn from_token(text: &str) -> Result<Self, StructureError> {
        match text {
            "true" => Ok(Boolean(true)),
            "false" => Ok(Boolean(false)),
            _ => Err(StructureError::InvalidLiteral {
                kind: TokenKind::Boolean,
                text: text.to_owned(),
            }),
        }
    }

    pub fn value(self) -> bool {
        self.0
    }

    pub fn as_str(&self) -> &str {
        if self.0 {
            "true"
        } else {
            "false"
        }
    }
}

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Number {
    /// The integer value, when the literal is a plain integer.
    pub fn as_integer(&self) -> Option<i64> {
        let text = self.0.as_str();
        let digits = text.strip_prefix('-').unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }

    pub fn is_integral(&self) -> bool {
        self.as_integer().is_some()
    }

    pub fn from_integer(value: i64) -> Self {
        Number(value.to_string())
    }
}

impl Symbol {
    /// The symbol name without its leading `$`.
    pub fn name(&self) -> &str {
        self.0.trim_start_matches('$')
    }
}

impl Moniker {
    /// The path segments, without the leading slashes.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }

    /// The last segment that is not a version, e.g. `Set` for
    /// `/bali/collections/Set/v1`.
    pub fn type_name(&self) -> Option<&str> {
        self.segments()
            .filter(|s| !scanner::matches_exactly(TokenKind::Version, s))
            .last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_round_trip_their_text() {
        let angle = Angle::from_token("~π").unwrap();
        assert_eq!(angle.to_string(), "~π");
        let moment = Moment::from_token("<2024-01-31>").unwrap();
        assert_eq!(moment.as_str(), "<2024-01-31>");
    }

    #[test]
    fn invalid_literal_text_is_rejected() {
        let err = Quote::from_token("unquoted").unwrap_err();
        assert!(matches!(
            err,
            StructureError::InvalidLiteral {
                kind: TokenKind::Quote,
                ..
            }
        ));
        assert!(Boolean::from_token("yes").is_err());
    }

    #[test]
    fn integral_numbers() {
        assert_eq!(Number::from_token("-42").unwrap().as_integer(), Some(-42));
        assert_eq!(Number::from_token("4.5").unwrap().as_integer(), None);
        assert_eq!(Number::from_token("π").unwrap().as_integer(), None);
        assert_eq!(Number::from_integer(7).as_str(), "7");
    }

    #[test]
    fn moniker_type_name_skips_versions() {
        let moniker = Moniker::from_token("/bali/collections/Set/v1.2").unwrap();
        assert_eq!(moniker.type_name(), Some("Set"));
        let bare = Moniker::from_token("/Queue").unwrap();
        assert_eq!(bare.type_name(), Some("Queue"));
    }

    #[test]
    fn symbol_name_drops_the_sigil() {
        assert_eq!(Symbol::from_token("$type").unwrap().name(), "type");
    }
}
