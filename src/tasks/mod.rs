// src/tasks/mod.rs

//! Named tasks, their dependencies, and how they run.
//!
//! - [`registry`] stores task declarations and computes execution plans.
//! - [`builtin`] declares the tasks the CLI exposes.
//! - [`context`] is the explicit per-invocation state (layer, run memo).
//! - [`executor`] walks a plan and runs each step.

pub mod builtin;
pub mod context;
pub mod executor;
pub mod registry;

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::model::Configuration;
use crate::exec::ToolKind;
use crate::layer::LayerId;
use crate::resolve::{TaskKind, UnresolvedLayer, resolve, resolve_folder};

pub use context::RunContext;
pub use executor::Executor;
pub use registry::TaskRegistry;

/// Canonical task name type.
pub type TaskName = String;

/// Paths computed for exactly one task invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub source: PathBuf,
    pub destination: Option<PathBuf>,
    /// The file the tool is expected to write, when configuration names it.
    pub output: Option<PathBuf>,
}

/// Where a processing task writes its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    None,
    /// `development + layer-fragment`.
    LayerFolder,
    /// `folders.validator_results`.
    ValidatorResults,
}

/// What a task does once its dependencies have succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    SelectLayer(LayerId),
    /// Hand the resolved `kind` path to an external tool.
    Process {
        tool: ToolKind,
        kind: TaskKind,
        destination: Destination,
    },
    Clean,
    CopyUnprocessed,
    /// Lock the layer and hand over to a serve session.
    Serve(LayerId),
}

impl TaskAction {
    pub fn requires_layer(&self) -> bool {
        matches!(self, TaskAction::Process { .. })
    }

    /// Compute this action's paths for `layer`.
    ///
    /// `Ok(None)` for actions that do not work on layer paths.
    pub fn resolve(
        &self,
        task: &str,
        layer: LayerId,
        config: &Configuration,
    ) -> Result<Option<ResolvedPaths>, UnresolvedLayer> {
        let TaskAction::Process {
            tool,
            kind,
            destination,
        } = self
        else {
            return Ok(None);
        };

        let source = resolve(*kind, layer, config).map_err(|e| e.for_task(task))?;
        let dest = match destination {
            Destination::None => None,
            Destination::LayerFolder => resolve_folder(layer, config),
            Destination::ValidatorResults => {
                Some(PathBuf::from(&config.folders().validator_results))
            }
        };
        // The compiled stylesheet lands where `styles.target` says, which is
        // what validateCss and clean read.
        let output = match (tool, destination) {
            (ToolKind::CssCompiler, Destination::LayerFolder) => Some(
                resolve(TaskKind::CssTarget, layer, config).map_err(|e| e.for_task(task))?,
            ),
            _ => None,
        };

        Ok(Some(ResolvedPaths {
            source,
            destination: dest,
            output,
        }))
    }
}

/// Declaration of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: TaskName,
    /// Run, in this order, before the task itself.
    pub deps: Vec<TaskName>,
    pub action: TaskAction,
    pub summary: String,
}

impl TaskSpec {
    pub fn new(name: impl Into<TaskName>, action: TaskAction) -> Self {
        Self {
            name: name.into(),
            deps: Vec::new(),
            action,
            summary: String::new(),
        }
    }

    pub fn after(mut self, dep: impl Into<TaskName>) -> Self {
        self.deps.push(dep.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn requires_layer(&self) -> bool {
        self.action.requires_layer()
    }
}

/// Why a task did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// The tool ran and reported problems.
    Tool {
        tool: ToolKind,
        exit_code: Option<i32>,
        output: String,
    },
    TimedOut { tool: ToolKind, after: Duration },
    /// A dependency did not succeed, so this task never ran.
    Blocked { dependency: TaskName },
    /// The work could not be carried out (tool not startable, copy error).
    Io(String),
    /// A serve task ran while another layer was active.
    LayerMismatch { expected: LayerId, active: LayerId },
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskFailure::Tool {
                tool,
                exit_code,
                output,
            } => {
                match exit_code {
                    Some(code) => write!(f, "{tool} reported errors (exit code {code})")?,
                    None => write!(f, "{tool} reported errors")?,
                }
                if !output.trim().is_empty() {
                    write!(f, ":\n{output}")?;
                }
                Ok(())
            }
            TaskFailure::TimedOut { tool, after } => {
                write!(f, "{tool} did not finish within {}s", after.as_secs_f64())
            }
            TaskFailure::Blocked { dependency } => {
                write!(f, "not run because '{dependency}' did not succeed")
            }
            TaskFailure::Io(reason) => f.write_str(reason),
            TaskFailure::LayerMismatch { expected, active } => write!(
                f,
                "expected the {expected} layer to be active, found {active}"
            ),
        }
    }
}

/// Outcome of one task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    Success,
    /// The task needed a layer it could not resolve; nothing was run.
    Skipped(UnresolvedLayer),
    Failed(TaskFailure),
}

impl TaskResult {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskResult::Success)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, TaskResult::Skipped(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TaskResult::Failed(_))
    }
}
