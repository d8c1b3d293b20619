// src/watch/hash.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// blake3 hex digest of a file's contents, or `None` if it is not a file.
pub fn fingerprint(fs: &dyn FileSystem, path: &Path) -> Result<Option<String>> {
    if !fs.is_file(path) {
        return Ok(None);
    }
    let mut hasher = Hasher::new();
    hasher.update(&fs.read(path)?);
    Ok(Some(hasher.finalize().to_hex().to_string()))
}

/// Last-seen fingerprint per path, used to drop events that did not change
/// any content (editor touch, metadata-only saves).
#[derive(Debug, Default)]
pub struct Fingerprints {
    seen: HashMap<PathBuf, Option<String>>,
}

impl Fingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state of `path` without reporting a change.
    pub fn seed(&mut self, fs: &dyn FileSystem, path: &Path) {
        match fingerprint(fs, path) {
            Ok(fp) => {
                self.seen.insert(path.to_path_buf(), fp);
            }
            Err(e) => debug!(?path, error = %e, "could not fingerprint watched file"),
        }
    }

    /// Store `current` and report whether it differs from what was stored.
    /// A path seen for the first time counts as changed.
    pub fn update(&mut self, path: &Path, current: Option<String>) -> bool {
        match self.seen.insert(path.to_path_buf(), current.clone()) {
            Some(previous) => previous != current,
            None => true,
        }
    }
}
