// src/errors.rs

//! Crate-wide error type.
//!
//! Only fatal conditions live here. A task that cannot resolve its paths is
//! not an error for the run as a whole; see [`crate::resolve::UnresolvedLayer`].

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerbuildError {
    /// The configuration file is missing, malformed, or incomplete.
    #[error("failed to load configuration from {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    /// A task declaration would close a dependency cycle.
    #[error("cyclic task dependency: registering '{task}' would create a cycle through '{via}'")]
    CyclicTask { task: String, via: String },

    #[error("task '{0}' is already registered")]
    DuplicateTask(String),

    #[error("unknown task: {0}")]
    UnknownTask(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayerbuildError {
    pub(crate) fn config(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        LayerbuildError::ConfigLoad {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, LayerbuildError>;
