use std::path::{Path, PathBuf};
use std::process;

use super::read_source;
use crate::config::Config;
use crate::{report_error, report_parse_error, OutputFormat};

pub(crate) fn cmd_format(
    paths: &[PathBuf],
    check: bool,
    write: bool,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) {
    let files = match collect_documents(paths, &config.format.extensions) {
        Ok(files) => files,
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };

    let mut rejected = 0usize;
    let mut changed: Vec<&Path> = Vec::new();
    let mut printed = Vec::new();

    for file in &files {
        let Some((canonical, unchanged)) = format_file(file, config, output, quiet) else {
            rejected += 1;
            continue;
        };
        if write {
            if unchanged {
                continue;
            }
            match std::fs::write(file, &canonical) {
                Ok(()) => changed.push(file.as_path()),
                Err(e) => {
                    let msg = format!("could not write '{}': {}", file.display(), e);
                    report_error(&msg, output, quiet);
                    rejected += 1;
                }
            }
        } else if check {
            if !unchanged {
                changed.push(file.as_path());
            }
        } else {
            printed.push((file, canonical));
        }
    }

    if !quiet || output == OutputFormat::Json {
        report(&files, &changed, &printed, check, write, output);
    }
    tracing::debug!(
        files = files.len(),
        changed = changed.len(),
        rejected,
        "format finished"
    );

    if rejected > 0 || (check && !changed.is_empty()) {
        process::exit(1);
    }
}

/// The canonical text of a document and whether the file already holds
/// it, or `None` when the document is rejected.
fn format_file(
    file: &Path,
    config: &Config,
    output: OutputFormat,
    quiet: bool,
) -> Option<(String, bool)> {
    let bytes = read_source(file, output, quiet);
    match bali_core::parse_document_with(&bytes, &config.parser) {
        Ok(component) => {
            let canonical = bali_core::format(&component);
            let unchanged = canonical.as_bytes() == bytes.as_slice();
            Some((canonical, unchanged))
        }
        Err(e) => {
            report_parse_error(file, &e, output, quiet);
            None
        }
    }
}

fn report(
    files: &[PathBuf],
    changed: &[&Path],
    printed: &[(&PathBuf, String)],
    check: bool,
    write: bool,
    output: OutputFormat,
) {
    match output {
        OutputFormat::Json => {
            let report = if check || write {
                let key = if write { "written" } else { "unformatted" };
                let mut report = serde_json::json!({ "files": files.len() });
                report[key] = serde_json::json!(names(changed));
                report
            } else {
                let documents: Vec<serde_json::Value> = printed
                    .iter()
                    .map(|(file, text)| {
                        serde_json::json!({
                            "file": file.display().to_string(),
                            "formatted": text,
                        })
                    })
                    .collect();
                serde_json::json!({ "documents": documents })
            };
            let json = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
            println!("{}", json);
        }
        OutputFormat::Text => {
            if check {
                for file in changed {
                    println!("not canonical: {}", file.display());
                }
            } else if write {
                for file in changed {
                    println!("formatted {}", file.display());
                }
            } else {
                for (_, text) in printed {
                    print!("{}", text);
                }
            }
        }
    }
}

fn names(paths: &[&Path]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

/// Expand directories into the documents beneath them whose extension is
/// listed. Files named explicitly are kept whatever their extension.
fn collect_documents(paths: &[PathBuf], extensions: &[String]) -> Result<Vec<PathBuf>, String> {
    let mut documents = Vec::new();
    for path in paths {
        if path.is_dir() {
            walk(path, extensions, &mut documents)?;
        } else {
            documents.push(path.clone());
        }
    }
    Ok(documents)
}

fn walk(dir: &Path, extensions: &[String], documents: &mut Vec<PathBuf>) -> Result<(), String> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| format!("could not read directory '{}': {}", dir.display(), e))?;
    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            walk(&path, extensions, documents)?;
        } else if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| extensions.iter().any(|wanted| wanted == e))
        {
            documents.push(path);
        }
    }
    Ok(())
}
