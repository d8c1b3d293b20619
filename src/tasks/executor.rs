// src/tasks/executor.rs

//! Runs a task plan against a [`RunContext`].
//!
//! Steps run one at a time in plan order. The first step that does not
//! succeed ends the run; everything the user needs to know about it
//! (remediation for a skipped step, tool output for a failed one) is printed
//! to stdout with the configured colors.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clean::{clean, removable_paths};
use crate::copy::copy_unprocessed;
use crate::errors::Result;
use crate::exec::{ToolBackend, ToolInvocation, ToolVerdict};
use crate::fs::FileSystem;
use crate::resolve::UnresolvedLayer;

use super::context::RunContext;
use super::registry::TaskRegistry;
use super::{ResolvedPaths, TaskAction, TaskFailure, TaskName, TaskResult, TaskSpec};

pub struct Executor<B: ToolBackend> {
    registry: Arc<TaskRegistry>,
    backend: B,
    fs: Arc<dyn FileSystem>,
}

impl<B: ToolBackend> Executor<B> {
    pub fn new(registry: Arc<TaskRegistry>, backend: B, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            registry,
            backend,
            fs,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Run `name` and its dependencies.
    ///
    /// `Err` is reserved for problems with the task graph itself (unknown
    /// names); everything that happens while running steps is reported
    /// through the returned [`TaskResult`].
    pub async fn run(&mut self, name: &str, ctx: &mut RunContext) -> Result<TaskResult> {
        let plan = self.registry.plan(name)?;
        let registry = Arc::clone(&self.registry);
        let target = registry.get(name)?;
        debug!(task = %target.name, ?plan, run = ctx.run_id(), "running plan");

        for step in &plan {
            let spec = registry.get(step)?;
            let memoized = is_memoized(&spec.action);

            if memoized && ctx.already_succeeded(&spec.name) {
                debug!(task = %spec.name, layer = %ctx.layer(), "already succeeded in this run");
                continue;
            }

            match self.run_step(spec, ctx).await {
                TaskResult::Success => {
                    if memoized {
                        ctx.mark_succeeded(&spec.name);
                    }
                }
                TaskResult::Skipped(unresolved) => {
                    let unresolved = if spec.name == target.name {
                        unresolved
                    } else {
                        // Prefer the requested task's own guidance when it
                        // could not have run either.
                        let config = Arc::clone(ctx.config());
                        match target.action.resolve(&target.name, ctx.layer(), &config) {
                            Err(own) => own,
                            Ok(_) => unresolved,
                        }
                    };
                    report_skipped(ctx, &unresolved);
                    return Ok(TaskResult::Skipped(unresolved));
                }
                TaskResult::Failed(failure) => {
                    report_failed(ctx, &spec.name, &failure);
                    if spec.name == target.name {
                        return Ok(TaskResult::Failed(failure));
                    }
                    let blocked = TaskFailure::Blocked {
                        dependency: spec.name.clone(),
                    };
                    report_failed(ctx, &target.name, &blocked);
                    return Ok(TaskResult::Failed(blocked));
                }
            }
        }

        info!(task = %target.name, layer = %ctx.layer(), "task finished");
        Ok(TaskResult::Success)
    }

    async fn run_step(&mut self, spec: &TaskSpec, ctx: &mut RunContext) -> TaskResult {
        let config = Arc::clone(ctx.config());

        match spec.action {
            TaskAction::SelectLayer(layer) => {
                ctx.selector_mut().select(layer);
                TaskResult::Success
            }

            TaskAction::Process { tool, .. } => {
                let paths = match spec.action.resolve(&spec.name, ctx.layer(), &config) {
                    Ok(Some(paths)) => paths,
                    Ok(None) => return TaskResult::Success,
                    Err(unresolved) => return TaskResult::Skipped(unresolved),
                };

                info!(
                    task = %spec.name,
                    layer = %ctx.layer(),
                    source = ?paths.source,
                    destination = ?paths.destination,
                    output = ?paths.output,
                    "running {tool}"
                );

                let invocation = ToolInvocation {
                    task: spec.name.clone(),
                    tool,
                    paths,
                };
                match self.backend.invoke(invocation).await {
                    Ok(ToolVerdict::Passed) => TaskResult::Success,
                    Ok(ToolVerdict::Failed { exit_code, output }) => {
                        TaskResult::Failed(TaskFailure::Tool {
                            tool,
                            exit_code,
                            output,
                        })
                    }
                    Ok(ToolVerdict::TimedOut { after }) => {
                        TaskResult::Failed(TaskFailure::TimedOut { tool, after })
                    }
                    Err(e) => {
                        warn!(task = %spec.name, error = %e, "tool could not be started");
                        TaskResult::Failed(TaskFailure::Io(e.to_string()))
                    }
                }
            }

            TaskAction::Clean => {
                let reports = clean(self.fs.as_ref(), &removable_paths(&config));
                for report in &reports {
                    println!("{}", report.render(config.colors()));
                }
                TaskResult::Success
            }

            TaskAction::CopyUnprocessed => match copy_unprocessed(self.fs.as_ref(), &config) {
                Ok(summary) => {
                    println!(
                        "Copied {} to {}.",
                        config.colors().green(&format!("{} file(s)", summary.copied)),
                        config.folders().production
                    );
                    TaskResult::Success
                }
                Err(e) => TaskResult::Failed(TaskFailure::Io(format!("{e:#}"))),
            },

            TaskAction::Serve(layer) => {
                let active = ctx.layer();
                if active != layer {
                    return TaskResult::Failed(TaskFailure::LayerMismatch {
                        expected: layer,
                        active,
                    });
                }
                ctx.selector_mut().freeze();
                debug!(%layer, "layer frozen for serving");
                TaskResult::Success
            }
        }
    }
}

/// Selection and serving must take effect every time they are requested.
fn is_memoized(action: &TaskAction) -> bool {
    !matches!(action, TaskAction::SelectLayer(_) | TaskAction::Serve(_))
}

fn report_skipped(ctx: &RunContext, unresolved: &UnresolvedLayer) {
    warn!(task = %unresolved.task, layer = %unresolved.layer, "task skipped");
    println!("{}", ctx.config().colors().red(&unresolved.to_string()));
}

fn report_failed(ctx: &RunContext, task: &str, failure: &TaskFailure) {
    warn!(%task, "task failed");
    println!("{}: {failure}", ctx.config().colors().red(task));
}

/// One step of a plan as it would run, for `--dry-run`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    pub task: TaskName,
    pub paths: std::result::Result<Option<ResolvedPaths>, UnresolvedLayer>,
}

/// Walk the plan for `name` without running anything.
///
/// Layer selections are applied to `ctx` so later steps resolve against the
/// layer they would see in a real run.
pub fn preview(
    registry: &TaskRegistry,
    name: &str,
    ctx: &mut RunContext,
) -> Result<Vec<PlannedStep>> {
    let config = Arc::clone(ctx.config());
    let mut steps = Vec::new();

    for step in registry.plan(name)? {
        let spec = registry.get(&step)?;
        if let TaskAction::SelectLayer(layer) = spec.action {
            ctx.selector_mut().select(layer);
        }
        steps.push(PlannedStep {
            paths: spec.action.resolve(&spec.name, ctx.layer(), &config),
            task: step,
        });
    }

    Ok(steps)
}

impl PlannedStep {
    /// Destination if one resolved, for display.
    pub fn destination(&self) -> Option<&PathBuf> {
        match &self.paths {
            Ok(Some(paths)) => paths.destination.as_ref(),
            _ => None,
        }
    }

    pub fn output(&self) -> Option<&PathBuf> {
        match &self.paths {
            Ok(Some(paths)) => paths.output.as_ref(),
            _ => None,
        }
    }
}
