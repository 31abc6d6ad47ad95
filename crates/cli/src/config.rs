//! `bali.toml` configuration.
//!
//! # Example
//!
//! ```toml
//! [parser]
//! max_depth = 64
//! scanning = "threaded"
//! channel_capacity = 256
//!
//! [format]
//! extensions = ["bali", "bdn"]
//! ```
//!
//! Every table and key is optional. Without `--config`, a `bali.toml` in
//! the working directory is used when there is one.

use std::path::Path;

use bali_core::ParseOptions;
use serde::Deserialize;

pub(crate) const CONFIG_FILE: &str = "bali.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Options handed to the parser for every document.
    pub parser: ParseOptions,
    pub format: FormatSettings,
}

/// `[format]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FormatSettings {
    /// File extensions picked up when `bali format` is given a directory.
    pub extensions: Vec<String>,
}

impl Default for FormatSettings {
    fn default() -> Self {
        FormatSettings {
            extensions: vec!["bali".to_owned(), "bdn".to_owned()],
        }
    }
}

/// Load the explicit configuration file, or `./bali.toml` if present, or
/// the defaults.
pub(crate) fn load(explicit: Option<&Path>) -> Result<Config, String> {
    match explicit {
        Some(path) => read_config(path),
        None => {
            let local = Path::new(CONFIG_FILE);
            if local.is_file() {
                read_config(local)
            } else {
                Ok(Config::default())
            }
        }
    }
}

pub(crate) fn read_config(path: &Path) -> Result<Config, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("could not read '{}': {}", path.display(), e))?;
    let config: Config = toml::from_str(&content)
        .map_err(|e| format!("could not parse '{}': {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), ?config, "loaded configuration");
    Ok(config)
}
