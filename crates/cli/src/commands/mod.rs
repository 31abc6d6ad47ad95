pub(crate) mod check;
pub(crate) mod format;
pub(crate) mod parse;
pub(crate) mod tokens;

use std::path::Path;
use std::process;

use crate::{report_error, OutputFormat};

/// Read a document's bytes, or report the failure and exit.
pub(crate) fn read_source(file: &Path, output: OutputFormat, quiet: bool) -> Vec<u8> {
    match std::fs::read(file) {
        Ok(bytes) => bytes,
        Err(e) => {
            let msg = format!("could not read '{}': {}", file.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}
