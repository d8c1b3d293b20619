// src/clean.rs

//! Removal of generated artifacts.
//!
//! Each path is handled on its own: a missing path or a failed removal is
//! reported for that path and processing moves on to the next one.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::model::{Colors, Configuration};
use crate::fs::FileSystem;
use crate::layer::LayerId;
use crate::resolve::{TaskKind, resolve};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanStatus {
    /// Found and deleted.
    Removed,
    /// Found, but the deletion failed.
    RemoveFailed(String),
    /// Missing or not accessible.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub path: PathBuf,
    pub status: CleanStatus,
}

impl CleanReport {
    pub fn was_found(&self) -> bool {
        !matches!(self.status, CleanStatus::NotFound)
    }

    /// One report line for the terminal.
    pub fn render(&self, colors: &Colors) -> String {
        let path = self.path.display().to_string();
        match &self.status {
            CleanStatus::Removed => format!(
                "{} was found and {} be deleted.",
                colors.green(&path),
                colors.green("will")
            ),
            CleanStatus::RemoveFailed(reason) => format!(
                "{} was found but {} be deleted: {reason}",
                colors.red(&path),
                colors.red("could not")
            ),
            CleanStatus::NotFound => format!(
                "{} does {} exist or is {} accessible.",
                colors.red(&path),
                colors.red("not"),
                colors.red("not")
            ),
        }
    }
}

/// Generated paths removed by the `clean` task, in report order:
/// validator results, production, then each layer's compiled stylesheet.
///
/// Layers without a `styles` section contribute nothing.
pub fn removable_paths(config: &Configuration) -> Vec<PathBuf> {
    let folders = config.folders();
    let mut paths = vec![
        PathBuf::from(&folders.validator_results),
        PathBuf::from(&folders.production),
    ];

    for layer in [LayerId::Content, LayerId::Settings] {
        if let Ok(target) = resolve(TaskKind::CssTarget, layer, config) {
            paths.push(target);
        }
    }

    paths
}

/// Remove every path that exists, returning one report per input path.
pub fn clean(fs: &dyn FileSystem, paths: &[PathBuf]) -> Vec<CleanReport> {
    paths.iter().map(|path| clean_one(fs, path)).collect()
}

fn clean_one(fs: &dyn FileSystem, path: &Path) -> CleanReport {
    if !fs.exists(path) {
        debug!(?path, "nothing to clean");
        return CleanReport {
            path: path.to_path_buf(),
            status: CleanStatus::NotFound,
        };
    }

    let status = match fs.remove_all(path) {
        Ok(()) => {
            debug!(?path, "removed");
            CleanStatus::Removed
        }
        Err(e) => {
            warn!(?path, error = %e, "failed to remove generated path");
            CleanStatus::RemoveFailed(format!("{e:#}"))
        }
    };

    CleanReport {
        path: path.to_path_buf(),
        status,
    }
}
