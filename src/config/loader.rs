// src/config/loader.rs

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::config::model::{Configuration, RawConfiguration};
use crate::errors::{LayerbuildError, Result};

/// Path used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Document formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Format::Toml,
            _ => Format::Json,
        }
    }
}

/// Load and validate the configuration at `path`.
///
/// JSON is the default format; a `.toml` extension selects TOML. Every
/// failure (missing file, malformed document, missing key, invalid value) is
/// reported as [`LayerbuildError::ConfigLoad`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<Configuration> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| LayerbuildError::config(path, format!("cannot read file: {e}")))?;

    let config = parse_str(&contents, Format::for_path(path) == Format::Toml)
        .map_err(|reason| LayerbuildError::config(path, reason))?;

    debug!(?path, "configuration loaded");
    Ok(config)
}

/// Parse and validate a configuration document held in memory.
///
/// The error is a human-readable reason; [`load_from_path`] attaches the path.
pub fn parse_str(contents: &str, toml: bool) -> std::result::Result<Configuration, String> {
    let raw: RawConfiguration = if toml {
        toml::from_str(contents).map_err(|e| format!("invalid TOML: {e}"))?
    } else {
        serde_json::from_str(contents).map_err(|e| format!("invalid JSON: {e}"))?
    };

    Configuration::try_from(raw).map_err(|e| e.to_string())
}
