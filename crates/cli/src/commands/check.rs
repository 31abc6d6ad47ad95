use std::path::Path;
use std::process;

use bali_core::ParseOptions;

use super::read_source;
use crate::{report_parse_error, OutputFormat};

pub(crate) fn cmd_check(file: &Path, options: &ParseOptions, output: OutputFormat, quiet: bool) {
    let bytes = read_source(file, output, quiet);
    match bali_core::parse_document_with(&bytes, options) {
        Ok(_) => {
            if quiet {
                return;
            }
            match output {
                OutputFormat::Json => {
                    let report = serde_json::json!({
                        "file": file.display().to_string(),
                        "valid": true,
                    });
                    println!("{}", report);
                }
                OutputFormat::Text => println!("{}: valid", file.display()),
            }
        }
        Err(e) => {
            report_parse_error(file, &e, output, quiet);
            process::exit(1);
        }
    }
}
