use std::path::Path;
use std::process;

use bali_core::ParseOptions;

use super::read_source;
use crate::{report_error, report_parse_error, OutputFormat};

/// The tree is always printed as JSON; `--output` only affects how
/// errors are reported.
pub(crate) fn cmd_parse(file: &Path, options: &ParseOptions, output: OutputFormat, quiet: bool) {
    let bytes = read_source(file, output, quiet);
    let component = match bali_core::parse_document_with(&bytes, options) {
        Ok(component) => component,
        Err(e) => {
            report_parse_error(file, &e, output, quiet);
            process::exit(1);
        }
    };
    match serde_json::to_string_pretty(&component) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            report_error(&format!("serialization error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}
