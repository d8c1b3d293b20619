// src/resolve/mod.rs

//! Path resolution for layer-dependent tasks.
//!
//! [`resolve`] is pure: the same `(kind, layer, configuration)` always gives
//! the same path. Callers recompute on every invocation because the layer may
//! have changed in between.

pub mod routes;

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

use crate::config::model::Configuration;
use crate::layer::LayerId;

pub use routes::{Leaf, Recipe, recipe_for, routed_layers};

/// Kind of path a task needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Html,
    CssSource,
    CssTarget,
    Js,
}

impl TaskKind {
    /// The built-in task that consumes this kind of path.
    pub fn task_name(self) -> &'static str {
        match self {
            TaskKind::Html => "validateHtml",
            TaskKind::CssSource => "compileCss",
            TaskKind::CssTarget => "validateCss",
            TaskKind::Js => "lintJs",
        }
    }
}

/// Why resolution failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No layer has been selected.
    LayerUnset,
    /// The selected layer has no route for this kind of path.
    NoRoute,
    /// The route exists but the layer descriptor lacks the entry.
    MissingEntry(String),
}

/// A layer-dependent task could not compute its paths.
///
/// Recoverable: the task is skipped and the run continues. `Display` renders
/// the remediation shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedLayer {
    pub task: String,
    pub layer: LayerId,
    pub reason: UnresolvedReason,
    /// Layers the task can run against with this configuration.
    pub valid_layers: Vec<LayerId>,
}

impl UnresolvedLayer {
    /// Re-attribute the failure to another task name.
    pub fn for_task(mut self, task: impl Into<String>) -> Self {
        self.task = task.into();
        self
    }

    /// Selector tasks that would make this task resolvable.
    pub fn selector_tasks(&self) -> Vec<&'static str> {
        self.valid_layers
            .iter()
            .filter_map(|l| l.selector_task())
            .collect()
    }

    /// Example command line that runs the task successfully.
    pub fn example_command(&self) -> Option<String> {
        self.selector_tasks()
            .first()
            .map(|selector| format!("layerbuild {selector} {}", self.task))
    }
}

impl fmt::Display for UnresolvedLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            UnresolvedReason::LayerUnset => write!(
                f,
                "The layer in which you're working has not been set, so '{}' cannot run.",
                self.task
            )?,
            UnresolvedReason::NoRoute => write!(
                f,
                "'{}' does not apply to the {} layer.",
                self.task, self.layer
            )?,
            UnresolvedReason::MissingEntry(key) => write!(
                f,
                "'{}' cannot run for the {} layer: {key} is not configured.",
                self.task, self.layer
            )?,
        }

        let selectors = self.selector_tasks();
        if selectors.is_empty() {
            return write!(f, " No layer in the configuration supports this task.");
        }

        write!(f, " Precede it with {} to set the layer.", join_alternatives(&selectors))?;
        if let Some(example) = self.example_command() {
            write!(f, " For example:\n\n    {example}")?;
        }
        Ok(())
    }
}

/// "a", "either a or b", "either a, b, or c".
fn join_alternatives(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [one] => one.to_string(),
        [a, b] => format!("either {a} or {b}"),
        [init @ .., last] => format!("either {}, or {last}", init.join(", ")),
    }
}

/// Resolve the concrete path of `kind` for `layer`.
pub fn resolve(
    kind: TaskKind,
    layer: LayerId,
    config: &Configuration,
) -> Result<PathBuf, UnresolvedLayer> {
    let unresolved = |reason| UnresolvedLayer {
        task: kind.task_name().to_string(),
        layer,
        reason,
        valid_layers: valid_layers(kind, config),
    };

    if !layer.is_set() {
        return Err(unresolved(UnresolvedReason::LayerUnset));
    }

    let recipe = recipe_for(kind, layer).ok_or_else(|| unresolved(UnresolvedReason::NoRoute))?;

    if recipe.is_cross_layer() {
        warn!(
            kind = ?kind,
            layer = %layer,
            folder = %recipe.folder,
            "path is composed from another layer's folder"
        );
    }

    recipe
        .compose(config)
        .map(PathBuf::from)
        .map_err(|key| unresolved(UnresolvedReason::MissingEntry(key)))
}

/// `development + layer-fragment`, the folder a layer is served from and
/// compiled into. `None` for `Unset`.
pub fn resolve_folder(layer: LayerId, config: &Configuration) -> Option<PathBuf> {
    config
        .layer_fragment(layer)
        .map(|fragment| PathBuf::from(format!("{}{}", config.folders().development, fragment)))
}

/// Layers for which `kind` resolves with this configuration.
pub fn valid_layers(kind: TaskKind, config: &Configuration) -> Vec<LayerId> {
    routed_layers(kind)
        .into_iter()
        .filter(|layer| {
            recipe_for(kind, *layer)
                .map(|r| r.compose(config).is_ok())
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternatives_read_naturally() {
        assert_eq!(join_alternatives(&["a"]), "a");
        assert_eq!(join_alternatives(&["a", "b"]), "either a or b");
        assert_eq!(join_alternatives(&["a", "b", "c"]), "either a, b, or c");
    }

    #[test]
    fn remediation_names_task_and_selectors() {
        let err = UnresolvedLayer {
            task: "compileCss".to_string(),
            layer: LayerId::Unset,
            reason: UnresolvedReason::LayerUnset,
            valid_layers: vec![LayerId::Content, LayerId::Settings],
        };

        let text = err.to_string();
        assert!(text.contains("'compileCss'"));
        assert!(text.contains("either setLayerToContent or setLayerToSettings"));
        assert!(text.contains("layerbuild setLayerToContent compileCss"));
        assert!(!text.contains("setLayerToBackend"));
    }
}
