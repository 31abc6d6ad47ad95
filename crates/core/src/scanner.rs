//! Scanner: turns BDN source text into a stream of tokens.
//!
//! Each position is offered to an ordered table of matchers and the first
//! one that accepts wins. The order resolves the ambiguities of the
//! notation (keywords before identifiers, probabilities before numbers,
//! bytecode before binary and so on), so it must not be rearranged.
//!
//! Two delivery modes are provided: [`Scanner`] is a pull-based iterator
//! that scans on demand, and [`spawn`] runs a scanner on its own thread
//! feeding a bounded channel.

use crate::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::mpsc::{sync_channel, Receiver};
use std::thread;

/// Default bound of the channel used by [`spawn`].
pub const CHANNEL_CAPACITY: usize = 256;

const KEYWORDS: &[&str] = &[
    "AND", "IS", "MATCHES", "NOT", "OR", "SANS", "XOR", "accept", "as", "at", "break",
    "checkout", "continue", "discard", "do", "each", "from", "if", "in", "let", "level", "loop",
    "matching", "notarize", "on", "post", "publish", "reject", "retrieve", "return", "save",
    "select", "throw", "to", "while", "with",
];

const INTRINSICS: &[&str] = &[
    "asString",
    "getSize",
    "hashValue",
    "isDefined",
    "isEmpty",
    "isEqual",
    "isSameAs",
    "randomBytes",
    "randomInteger",
    "randomProbability",
    "randomTag",
    "reverse",
    "shuffle",
    "sort",
];

const REAL: &str = r"(?:0|[1-9][0-9]*)(?:\.[0-9]+)?(?:E[+-]?[0-9]+)?";

/// Extra acceptance test applied to the text following a match.
#[derive(Debug, Clone, Copy)]
enum Guard {
    Always,
    /// Reject when the match would split a word.
    Word,
    /// Reject `1.` when followed by another `.` (range syntax) or a digit.
    Probability,
}

impl Guard {
    fn accepts(self, following: &str) -> bool {
        let next = following.chars().next();
        match self {
            Guard::Always => true,
            Guard::Word => !next.is_some_and(|c| c.is_ascii_alphanumeric()),
            Guard::Probability => !next.is_some_and(|c| c == '.' || c.is_ascii_alphanumeric()),
        }
    }
}

struct Matcher {
    kind: TokenKind,
    pattern: Regex,
    guard: Guard,
}

fn matcher(kind: TokenKind, pattern: &str, guard: Guard) -> Matcher {
    let anchored = format!("^(?:{})", pattern);
    Matcher {
        kind,
        pattern: Regex::new(&anchored).expect("scanner patterns are valid regular expressions"),
        guard,
    }
}

/// Alternation of literal words, longest first so that no word shadows a
/// longer one sharing its prefix.
fn alternation(words: &[&str]) -> String {
    let mut sorted: Vec<&str> = words.to_vec();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    sorted
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|")
}

static MATCHERS: Lazy<Vec<Matcher>> = Lazy::new(|| {
    vec![
        matcher(TokenKind::Whitespace, r" +", Guard::Always),
        matcher(TokenKind::Keyword, &alternation(KEYWORDS), Guard::Word),
        matcher(TokenKind::Comment, r"!>\n(?s:.*?)\n *<!", Guard::Always),
        matcher(TokenKind::Note, r"! [^\n]*", Guard::Always),
        matcher(
            TokenKind::Angle,
            &format!("~(?:-?{REAL}|tau|pi|π|τ)"),
            Guard::Word,
        ),
        matcher(TokenKind::Boolean, "false|true", Guard::Word),
        matcher(
            TokenKind::Duration,
            r"~-?P(?:[0-9]+W|(?:[0-9]+Y)?(?:[0-9]+M)?(?:[0-9]+D)?(?:T(?:[0-9]+H)?(?:[0-9]+M)?(?:[0-9]+(?:\.[0-9]+)?S)?)?)",
            Guard::Word,
        ),
        matcher(
            TokenKind::Moment,
            r"<-?[0-9]{1,4}(?:-[0-9]{2}(?:-[0-9]{2}(?:T[0-9]{2}(?::[0-9]{2}(?::[0-9]{2}(?:\.[0-9]+)?)?)?)?)?)?>",
            Guard::Always,
        ),
        matcher(
            TokenKind::Pattern,
            r#"none|any|"(?:[^"\\\n]|\\.)*"\?"#,
            Guard::Word,
        ),
        matcher(TokenKind::Percentage, &format!("-?{REAL}%"), Guard::Always),
        matcher(TokenKind::Probability, r"\.[0-9]+", Guard::Word),
        matcher(TokenKind::Probability, r"1\.", Guard::Probability),
        matcher(
            TokenKind::Resource,
            r"<[a-z][a-z0-9+\-.]*:[^\s<>]*>",
            Guard::Always,
        ),
        matcher(
            TokenKind::Bytecode,
            r"'[0-9a-f]{4}(?: [0-9a-f]{4})*'",
            Guard::Always,
        ),
        matcher(TokenKind::Binary, r"'[A-Za-z0-9+/=\s]*'", Guard::Always),
        matcher(
            TokenKind::Name,
            r"(?:/[a-zA-Z][0-9a-zA-Z\-]*(?:\.[0-9]+)*)+",
            Guard::Always,
        ),
        matcher(TokenKind::Narrative, r#"">\n(?s:.*?)\n *<""#, Guard::Always),
        matcher(TokenKind::Quote, r#""(?:[^"\\\n]|\\.)*""#, Guard::Always),
        matcher(TokenKind::Symbol, r"\$[a-zA-Z][0-9a-zA-Z]*", Guard::Always),
        matcher(TokenKind::Tag, r"#[0-9A-DF-HJ-NP-TV-Z]+", Guard::Word),
        matcher(TokenKind::Version, r"v[1-9][0-9]*(?:\.[0-9]+)*", Guard::Word),
        matcher(
            TokenKind::Number,
            &format!("undefined|infinity|∞|-?(?:{REAL}|phi|tau|pi|e|π|φ|τ|∞)"),
            Guard::Word,
        ),
        matcher(TokenKind::Intrinsic, &alternation(INTRINSICS), Guard::Word),
        matcher(TokenKind::Identifier, r"[a-zA-Z][0-9a-zA-Z]*", Guard::Always),
        matcher(
            TokenKind::Delimiter,
            r"[:?+\-*/]=|//|<-|\.\.|[\[\](){}:;,.@&^|+\-*/<=>]",
            Guard::Always,
        ),
        matcher(TokenKind::Eol, r"\n", Guard::Always),
    ]
});

/// True when `text` is, in its entirety, a token of the given kind.
/// Used to validate values built outside the scanner.
pub fn matches_exactly(kind: TokenKind, text: &str) -> bool {
    MATCHERS
        .iter()
        .filter(|m| m.kind == kind)
        .any(|m| m.pattern.find(text).is_some_and(|found| found.end() == text.len()))
}

/// Spell out a character for an ERROR token so that invisible control
/// characters show up in diagnostics.
pub fn spell(c: char) -> String {
    match c {
        '\t' => "<HTAB>".to_owned(),
        '\r' => "<CRTN>".to_owned(),
        '\0' => "<NULL>".to_owned(),
        '\u{0b}' => "<VTAB>".to_owned(),
        '\u{0c}' => "<FMFD>".to_owned(),
        c if c.is_control() => format!("<U+{:04X}>", c as u32),
        c => c.to_string(),
    }
}

/// Pull-based scanner over borrowed source text.
///
/// Yields tokens in source order. Scanning stops after an ERROR token, and
/// after the last byte; an EOF token is emitted only when that last byte is
/// an EOL.
pub struct Scanner<'s> {
    source: &'s str,
    position: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'s> Scanner<'s> {
    pub fn new(source: &'s str) -> Self {
        Scanner {
            source,
            position: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn advance(&mut self, text: &str) {
        self.position += text.len();
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn end_of_source(&mut self) -> Option<Token> {
        self.finished = true;
        if self.source.ends_with('\n') {
            Some(Token::new(TokenKind::Eof, "", self.line, self.column))
        } else {
            None
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        'scan: loop {
            if self.finished {
                return None;
            }
            if self.position >= self.source.len() {
                return self.end_of_source();
            }
            let rest = &self.source[self.position..];
            for m in MATCHERS.iter() {
                let Some(found) = m.pattern.find(rest) else {
                    continue;
                };
                if found.end() == 0 || !m.guard.accepts(&rest[found.end()..]) {
                    continue;
                }
                let text = found.as_str();
                let token = Token::new(m.kind, text, self.line, self.column);
                self.advance(text);
                if m.kind == TokenKind::Whitespace {
                    continue 'scan;
                }
                return Some(token);
            }
            self.finished = true;
            let offending = rest.chars().next().map(spell).unwrap_or_default();
            tracing::debug!(line = self.line, column = self.column, %offending, "no matcher accepted input");
            return Some(Token::new(
                TokenKind::Error,
                offending,
                self.line,
                self.column,
            ));
        }
    }
}

/// Tokens delivered by a scanner running on its own thread.
///
/// Dropping the channel before it is exhausted disconnects the scanner,
/// which notices on its next send and stops.
pub struct TokenChannel {
    receiver: Receiver<Token>,
}

impl Iterator for TokenChannel {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.receiver.recv().ok()
    }
}

/// Scan `source` on a dedicated thread, writing into a channel bounded to
/// `capacity` tokens. The channel closes when scanning ends.
pub fn spawn(source: String, capacity: usize) -> TokenChannel {
    let (sender, receiver) = sync_channel(capacity.max(1));
    thread::spawn(move || {
        for token in Scanner::new(&source) {
            if sender.send(token).is_err() {
                tracing::trace!("token consumer went away, scanner stopping");
                break;
            }
        }
    });
    TokenChannel { receiver }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<(TokenKind, String)> {
        Scanner::new(source).map(|t| (t.kind, t.text)).collect()
    }

    #[test]
    fn scans_a_simple_list() {
        let tokens = kinds("[1, $x]\n");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Delimiter, "[".to_owned()),
                (TokenKind::Number, "1".to_owned()),
                (TokenKind::Delimiter, ",".to_owned()),
                (TokenKind::Symbol, "$x".to_owned()),
                (TokenKind::Delimiter, "]".to_owned()),
                (TokenKind::Eol, "\n".to_owned()),
                (TokenKind::Eof, String::new()),
            ]
        );
    }

    #[test]
    fn probability_is_not_taken_from_range_syntax() {
        let tokens = kinds("1...5\n");
        assert_eq!(tokens[0], (TokenKind::Number, "1".to_owned()));
        assert_eq!(tokens[1], (TokenKind::Delimiter, "..".to_owned()));
        assert_eq!(tokens[2], (TokenKind::Probability, ".5".to_owned()));
        assert!(tokens.iter().all(|(_, text)| text != "1."));
    }

    #[test]
    fn fractional_probability_may_open_a_range() {
        let tokens = kinds("[.25..1.]\n");
        assert_eq!(tokens[1], (TokenKind::Probability, ".25".to_owned()));
        assert_eq!(tokens[2], (TokenKind::Delimiter, "..".to_owned()));
        assert_eq!(tokens[3], (TokenKind::Probability, "1.".to_owned()));
        assert_eq!(tokens[4], (TokenKind::Delimiter, "]".to_owned()));
    }

    #[test]
    fn probability_one_stands_alone() {
        let tokens = kinds("1.\n");
        assert_eq!(tokens[0], (TokenKind::Probability, "1.".to_owned()));
    }

    #[test]
    fn decimal_number_is_not_a_probability() {
        let tokens = kinds("1.5\n");
        assert_eq!(tokens[0], (TokenKind::Number, "1.5".to_owned()));
    }

    #[test]
    fn words_fall_through_to_identifiers() {
        let tokens = kinds("pipe phi ifx e else\n");
        assert_eq!(tokens[0], (TokenKind::Identifier, "pipe".to_owned()));
        assert_eq!(tokens[1], (TokenKind::Number, "phi".to_owned()));
        assert_eq!(tokens[2], (TokenKind::Identifier, "ifx".to_owned()));
        assert_eq!(tokens[3], (TokenKind::Number, "e".to_owned()));
        assert_eq!(tokens[4], (TokenKind::Identifier, "else".to_owned()));
    }

    #[test]
    fn keywords_and_intrinsics_are_recognised() {
        let tokens = kinds("if getSize(x) do\n");
        assert_eq!(tokens[0], (TokenKind::Keyword, "if".to_owned()));
        assert_eq!(tokens[1], (TokenKind::Intrinsic, "getSize".to_owned()));
        assert_eq!(tokens[5], (TokenKind::Keyword, "do".to_owned()));
    }

    #[test]
    fn element_literals() {
        let tokens = kinds("~π ~P3DT4H <2024-01-31T12:30:00> 25% .75 <https://a.b/c> \"^a\"? any\n");
        let found: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            &found[..8],
            &[
                TokenKind::Angle,
                TokenKind::Duration,
                TokenKind::Moment,
                TokenKind::Percentage,
                TokenKind::Probability,
                TokenKind::Resource,
                TokenKind::Pattern,
                TokenKind::Pattern,
            ]
        );
    }

    #[test]
    fn string_literals() {
        let tokens = kinds("'0a1b 2c3d' 'SGVsbG8=' /bali/types/Number/v1.2 \"hi\" #AB12 v3.1\n");
        let found: Vec<TokenKind> = tokens.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            &found[..6],
            &[
                TokenKind::Bytecode,
                TokenKind::Binary,
                TokenKind::Name,
                TokenKind::Quote,
                TokenKind::Tag,
                TokenKind::Version,
            ]
        );
    }

    #[test]
    fn multiline_tokens_advance_line_numbers() {
        let source = "[\n    \">\n        two lines\n    <\"\n    $x\n]\n";
        let tokens: Vec<Token> = Scanner::new(source).collect();
        let narrative = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Narrative)
            .expect("narrative token");
        assert_eq!((narrative.line, narrative.column), (2, 5));
        let symbol = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Symbol)
            .expect("symbol token");
        assert_eq!((symbol.line, symbol.column), (5, 5));
    }

    #[test]
    fn control_characters_are_spelled_out_and_stop_scanning() {
        let tokens: Vec<Token> = Scanner::new("[1,\t2]\n").collect();
        let last = tokens.last().expect("error token");
        assert_eq!(last.kind, TokenKind::Error);
        assert_eq!(last.text, "<HTAB>");
        assert_eq!((last.line, last.column), (1, 4));
    }

    #[test]
    fn missing_final_eol_yields_no_eof() {
        let tokens = kinds("[1]");
        assert!(tokens.iter().all(|(k, _)| *k != TokenKind::Eof));
        assert!(kinds("").is_empty());
    }

    #[test]
    fn matches_exactly_checks_the_whole_text() {
        assert!(matches_exactly(TokenKind::Number, "-12.5E3"));
        assert!(!matches_exactly(TokenKind::Number, "12x"));
        assert!(matches_exactly(TokenKind::Symbol, "$name"));
        assert!(!matches_exactly(TokenKind::Symbol, "name"));
    }

    #[test]
    fn threaded_scanner_delivers_the_same_stream() {
        let source = "{return [1, 2, 3]}\n";
        let pulled: Vec<Token> = Scanner::new(source).collect();
        let pushed: Vec<Token> = spawn(source.to_owned(), 2).collect();
        assert_eq!(pulled, pushed);
    }

    #[test]
    fn abandoning_the_channel_does_not_block_the_scanner() {
        let source = "[1, 2, 3, 4, 5, 6, 7, 8, 9]\n".repeat(50);
        let mut channel = spawn(source, 1);
        assert!(channel.next().is_some());
        drop(channel);
    }
}
