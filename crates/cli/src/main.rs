mod commands;
mod config;

use std::path::{Path, PathBuf};
use std::process;

use bali_core::BaliError;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::check::cmd_check;
use commands::format::cmd_format;
use commands::parse::cmd_parse;
use commands::tokens::cmd_tokens;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Bali Document Notation toolchain.
#[derive(Parser)]
#[command(name = "bali", version, about = "Bali Document Notation toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Path to a bali.toml configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of BDN documents
    Format {
        /// Documents, or directories to search for documents
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Exit with status 1 if any document is not in canonical form
        #[arg(long)]
        check: bool,
        /// Rewrite documents in place
        #[arg(long, conflicts_with = "check")]
        write: bool,
    },

    /// Parse a document and report whether it is valid
    Check {
        /// Path to the document
        file: PathBuf,
    },

    /// List the tokens of a document
    Tokens {
        /// Path to the document
        file: PathBuf,
    },

    /// Dump the parse tree of a document as JSON
    Parse {
        /// Path to the document
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(msg) => {
            report_error(&msg, cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Format { paths, check, write } => {
            cmd_format(&paths, check, write, &config, cli.output, cli.quiet);
        }
        Commands::Check { file } => {
            cmd_check(&file, &config.parser, cli.output, cli.quiet);
        }
        Commands::Tokens { file } => {
            cmd_tokens(&file, cli.output, cli.quiet);
        }
        Commands::Parse { file } => {
            cmd_parse(&file, &config.parser, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so they never mix with documents on stdout.
fn init_tracing(verbose: u8) {
    let default_directive = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}

/// Report a rejected document. JSON diagnostics are printed even when
/// quiet, since callers parse them.
pub(crate) fn report_parse_error(file: &Path, error: &BaliError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "file": file.display().to_string(),
                "error": error.to_json_value(),
            });
            let pretty = serde_json::to_string_pretty(&report)
                .unwrap_or_else(|_| format!("{{\"error\": \"{}\"}}", error.kind_name()));
            eprintln!("{}", pretty);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("{}: {}", file.display(), error);
            }
        }
    }
}
