use std::path::Path;
use std::process;

use bali_core::{Token, TokenKind};

use super::read_source;
use crate::{report_parse_error, OutputFormat};

pub(crate) fn cmd_tokens(file: &Path, output: OutputFormat, quiet: bool) {
    let bytes = read_source(file, output, quiet);
    let tokens = match bali_core::tokenize(&bytes) {
        Ok(tokens) => tokens,
        Err(e) => {
            report_parse_error(file, &e, output, quiet);
            process::exit(1);
        }
    };

    match output {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&tokens)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            for token in &tokens {
                println!("{}", table_row(token));
            }
        }
    }
}

/// `line:column  KIND  text`, with line breaks in the text escaped.
fn table_row(token: &Token) -> String {
    let text = match token.kind {
        TokenKind::Eol => "<EOL>".to_owned(),
        TokenKind::Eof => "<EOF>".to_owned(),
        _ => token.text.replace('\n', "\\n"),
    };
    let position = format!("{}:{}", token.line, token.column);
    format!("{:<9} {:<12} {}", position, token.kind.as_str(), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_align_and_escape_line_breaks() {
        let eol = Token::new(TokenKind::Eol, "\n", 3, 14);
        assert_eq!(table_row(&eol), "3:14      EOL          <EOL>");
        let comment = Token::new(TokenKind::Comment, "!>\nhi\n<!", 1, 2);
        assert_eq!(table_row(&comment), "1:2       COMMENT      !>\\nhi\\n<!");
    }
}
