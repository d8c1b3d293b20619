// src/lib.rs

pub mod clean;
pub mod cli;
pub mod config;
pub mod copy;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod layer;
pub mod logging;
pub mod resolve;
pub mod serve;
pub mod tasks;
pub mod watch;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::load_from_path;
use crate::config::model::Configuration;
use crate::exec::CommandBackend;
use crate::fs::{FileSystem, RealFileSystem};
use crate::layer::LayerId;
use crate::serve::reload::{spawn_command_observer, spawn_log_observer};
use crate::serve::{ReloadHub, ServeSession, SessionSummary};
use crate::tasks::executor::preview;
use crate::tasks::{Executor, RunContext, TaskName, TaskRegistry, TaskResult};
use crate::watch::WatchCoordinator;

/// Outcome of one invocation, used for the exit code.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Requested tasks that ran, in order.
    pub results: Vec<(TaskName, TaskResult)>,
    pub session: Option<SessionSummary>,
}

impl RunSummary {
    /// `1` if anything failed, `2` if every requested task that needs a layer
    /// was skipped, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.results.iter().any(|(_, r)| r.is_failed()) {
            return 1;
        }

        let mut layered = self
            .results
            .iter()
            .filter(|(name, _)| !is_selector(name))
            .peekable();
        if layered.peek().is_some() && layered.all(|(_, r)| r.is_skipped()) {
            return 2;
        }
        0
    }
}

fn is_selector(name: &str) -> bool {
    LayerId::SELECTABLE
        .iter()
        .any(|l| l.selector_task() == Some(name))
}

/// High-level entry point used by `main.rs`.
///
/// Runs the requested tasks in order within one context. A failed task ends
/// the invocation; a skipped task does not. A successful serve task hands
/// over to a serve session that lasts until Ctrl+C.
pub async fn run(args: CliArgs) -> Result<RunSummary> {
    let config = Arc::new(load_from_path(&args.config)?);
    let registry = Arc::new(TaskRegistry::builtin()?);

    let names = args
        .tasks
        .iter()
        .map(|t| registry.canonical_name(t).map(str::to_string))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut ctx = RunContext::new(Arc::clone(&config));

    if args.dry_run {
        print_dry_run(&registry, &names, &mut ctx)?;
        return Ok(RunSummary::default());
    }

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let backend = CommandBackend::from_config(&config);
    let mut executor = Executor::new(Arc::clone(&registry), backend, Arc::clone(&fs));

    let mut summary = RunSummary::default();
    let mut serve = None;
    ctx.start_new_run();

    for (i, name) in names.iter().enumerate() {
        let result = executor.run(name, &mut ctx).await?;
        let failed = result.is_failed();
        if result.is_success() {
            serve = registry.serve_layer(name);
        }
        summary.results.push((name.clone(), result));

        if failed {
            break;
        }
        if serve.is_some() {
            let ignored = &names[i + 1..];
            if !ignored.is_empty() {
                warn!(?ignored, "tasks after a serve task are not run");
            }
            break;
        }
    }

    if let Some(layer) = serve {
        let session = serve_layer(layer, &config, executor, ctx, fs).await?;
        summary.session = Some(session);
    }

    Ok(summary)
}

async fn serve_layer(
    layer: LayerId,
    config: &Configuration,
    executor: Executor<CommandBackend>,
    ctx: RunContext,
    fs: Arc<dyn FileSystem>,
) -> Result<SessionSummary> {
    let root = watch_root()?;
    let (mut coordinator, triggers) = WatchCoordinator::new(root, config.watch().use_hash, fs);

    let hub = ReloadHub::default();
    let _log_observer = spawn_log_observer(hub.subscribe());
    let _command_observer = config.tools().reload.clone().map(|command| {
        let timeout = match config.tools().timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        spawn_command_observer(hub.subscribe(), command, timeout)
    });

    let session = ServeSession::start(layer, executor, ctx, &mut coordinator, triggers, hub)?;
    session.run(shutdown_signal()).await
}

/// Watch patterns are relative to the working directory, like the config folders.
fn watch_root() -> Result<PathBuf> {
    std::env::current_dir().context("determining the directory to watch")
}

/// Completes on Ctrl+C. If the handler cannot be installed, never completes.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Print each plan with resolved paths; nothing runs.
fn print_dry_run(registry: &TaskRegistry, names: &[TaskName], ctx: &mut RunContext) -> Result<()> {
    println!("layerbuild dry-run");

    for name in names {
        println!();
        println!("{name}:");
        for step in preview(registry, name, ctx)? {
            let spec = registry.get(&step.task)?;
            match &step.paths {
                Ok(Some(paths)) => {
                    println!("  - {} (layer {})", step.task, ctx.layer());
                    println!("      source: {}", paths.source.display());
                    if let Some(dest) = step.destination() {
                        println!("      destination: {}", dest.display());
                    }
                    if let Some(output) = step.output() {
                        println!("      output: {}", output.display());
                    }
                }
                Ok(None) if spec.summary.is_empty() => println!("  - {}", step.task),
                Ok(None) => println!("  - {}: {}", step.task, spec.summary),
                Err(unresolved) => {
                    println!("  - {} (would be skipped)", step.task);
                    println!("      {unresolved}");
                }
            }
        }
    }

    info!(layer = %ctx.layer(), "dry-run complete (nothing executed)");
    debug!(tasks = ?names, "dry-run plans printed");
    Ok(())
}
