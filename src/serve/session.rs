// src/serve/session.rs

use std::fmt;
use std::future::Future;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::exec::ToolBackend;
use crate::layer::LayerId;
use crate::tasks::{Executor, RunContext, TaskResult};
use crate::watch::{WatchCoordinator, WatchHandle, WatchTrigger};

use super::bindings_for;
use super::reload::ReloadHub;

/// What a session did before it ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub runs: usize,
    pub reloads: usize,
    pub failures: usize,
}

/// Re-runs bound tasks on change, one at a time, for a frozen layer.
pub struct ServeSession<B: ToolBackend> {
    layer: LayerId,
    executor: Executor<B>,
    ctx: RunContext,
    handles: Vec<WatchHandle>,
    triggers: mpsc::UnboundedReceiver<WatchTrigger>,
    hub: ReloadHub,
}

impl<B: ToolBackend> fmt::Debug for ServeSession<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServeSession")
            .field("layer", &self.layer)
            .field("handles", &self.handles)
            .finish_non_exhaustive()
    }
}

impl<B: ToolBackend> ServeSession<B> {
    /// Session with no bindings yet; triggers arrive on `triggers`.
    pub fn new(
        layer: LayerId,
        executor: Executor<B>,
        mut ctx: RunContext,
        triggers: mpsc::UnboundedReceiver<WatchTrigger>,
        hub: ReloadHub,
    ) -> Self {
        ctx.selector_mut().freeze();
        Self {
            layer,
            executor,
            ctx,
            handles: Vec::new(),
            triggers,
            hub,
        }
    }

    /// Bind every watched file of the layer through `coordinator`.
    pub fn start(
        layer: LayerId,
        executor: Executor<B>,
        ctx: RunContext,
        coordinator: &mut WatchCoordinator,
        triggers: mpsc::UnboundedReceiver<WatchTrigger>,
        hub: ReloadHub,
    ) -> anyhow::Result<Self> {
        let bindings = bindings_for(layer, ctx.config());
        let mut session = Self::new(layer, executor, ctx, triggers, hub);

        for binding in bindings {
            let handle = coordinator.watch(&binding.pattern, binding.task)?;
            session.handles.push(handle);
        }

        info!(%layer, bindings = session.handles.len(), "serving; press Ctrl+C to stop");
        Ok(session)
    }

    pub fn handles(&self) -> &[WatchHandle] {
        &self.handles
    }

    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Process triggers until `shutdown` completes or every sender is gone.
    ///
    /// Triggers that queue up while a run is in progress are coalesced: each
    /// task runs once per batch, in the order it was first triggered.
    pub async fn run<F>(mut self, shutdown: F) -> anyhow::Result<SessionSummary>
    where
        F: Future<Output = ()>,
    {
        let mut summary = SessionSummary::default();
        tokio::pin!(shutdown);

        loop {
            let first = tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!("shutdown requested; ending serve session");
                    break;
                }
                trigger = self.triggers.recv() => match trigger {
                    Some(trigger) => trigger,
                    None => {
                        debug!("trigger channel closed");
                        break;
                    }
                },
            };

            let mut batch = vec![first];
            while let Ok(more) = self.triggers.try_recv() {
                batch.push(more);
            }

            for trigger in coalesce(batch) {
                self.handle_trigger(trigger, &mut summary).await;
            }
        }

        for handle in &mut self.handles {
            handle.stop();
        }
        info!(
            runs = summary.runs,
            reloads = summary.reloads,
            failures = summary.failures,
            "serve session ended"
        );
        Ok(summary)
    }

    async fn handle_trigger(&mut self, trigger: WatchTrigger, summary: &mut SessionSummary) {
        let run_id = self.ctx.start_new_run();
        info!(
            task = %trigger.task,
            path = ?trigger.path,
            reason = ?trigger.reason,
            run = run_id,
            "change detected"
        );

        summary.runs += 1;
        match self.executor.run(&trigger.task, &mut self.ctx).await {
            Ok(TaskResult::Success) => {
                self.hub.notify(&trigger.task, run_id);
                summary.reloads += 1;
            }
            Ok(_) => summary.failures += 1,
            Err(e) => {
                warn!(task = %trigger.task, error = %e, "cannot run triggered task");
                summary.failures += 1;
            }
        }
    }
}

/// First trigger per task, in arrival order.
fn coalesce(batch: Vec<WatchTrigger>) -> Vec<WatchTrigger> {
    let mut kept: Vec<WatchTrigger> = Vec::with_capacity(batch.len());
    for trigger in batch {
        if kept.iter().any(|k| k.task == trigger.task) {
            debug!(task = %trigger.task, "coalescing queued trigger");
            continue;
        }
        kept.push(trigger);
    }
    kept
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::watch::TriggerReason;

    fn trigger(task: &str, path: &str) -> WatchTrigger {
        WatchTrigger {
            binding: 1,
            task: task.to_string(),
            path: PathBuf::from(path),
            reason: TriggerReason::Changed,
        }
    }

    #[test]
    fn coalescing_keeps_first_trigger_per_task() {
        let kept = coalesce(vec![
            trigger("compileCss", "a.scss"),
            trigger("lintJs", "main.js"),
            trigger("compileCss", "b.scss"),
        ]);
        let tasks: Vec<_> = kept.iter().map(|t| t.task.as_str()).collect();
        assert_eq!(tasks, vec!["compileCss", "lintJs"]);
        assert_eq!(kept[0].path, PathBuf::from("a.scss"));
    }
}
