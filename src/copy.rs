// src/copy.rs

//! Copying of files that no other task processes into the production folder.
//!
//! Everything below the development root is copied (dotfiles included),
//! except the stylesheet sources: those reach production through the
//! compiler.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::model::Configuration;
use crate::fs::FileSystem;
use crate::layer::LayerId;
use crate::resolve::{TaskKind, resolve};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub copied: usize,
    pub excluded: Vec<PathBuf>,
}

/// Stylesheet sources that are never copied verbatim.
pub fn excluded_sources(config: &Configuration) -> Vec<PathBuf> {
    [LayerId::Content, LayerId::Settings]
        .into_iter()
        .filter_map(|layer| resolve(TaskKind::CssSource, layer, config).ok())
        .collect()
}

/// Copy `development/**` into `production/`, preserving relative paths.
pub fn copy_unprocessed(fs: &dyn FileSystem, config: &Configuration) -> Result<CopySummary> {
    let root = PathBuf::from(&config.folders().development);
    let production = PathBuf::from(&config.folders().production);
    let excluded = excluded_sources(config);

    let mut summary = CopySummary::default();
    let mut stack = vec![root.clone()];

    while let Some(dir) = stack.pop() {
        let entries = fs
            .read_dir(&dir)
            .with_context(|| format!("listing development folder {:?}", dir))?;

        for path in entries {
            if fs.is_dir(&path) {
                stack.push(path);
                continue;
            }
            if is_excluded(&path, &excluded) {
                debug!(?path, "not copying stylesheet source");
                summary.excluded.push(path);
                continue;
            }

            let rel = path
                .strip_prefix(&root)
                .with_context(|| format!("{:?} is outside {:?}", path, root))?;
            let target = production.join(rel);
            fs.copy_file(&path, &target)
                .with_context(|| format!("copying {:?} to {:?}", path, target))?;
            debug!(from = ?path, to = ?target, "copied");
            summary.copied += 1;
        }
    }

    Ok(summary)
}

fn is_excluded(path: &Path, excluded: &[PathBuf]) -> bool {
    excluded.iter().any(|e| e.as_path() == path)
}
