// src/watch/coordinator.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::fs::FileSystem;
use crate::tasks::TaskName;
use crate::watch::hash::{Fingerprints, fingerprint};
use crate::watch::patterns::{WatchPattern, relative_str};

pub type BindingId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    Changed,
    Removed,
}

/// A watched path changed; `task` should run again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTrigger {
    pub binding: BindingId,
    pub task: TaskName,
    pub path: PathBuf,
    pub reason: TriggerReason,
}

/// Turns notify events for one binding into triggers.
///
/// Kept apart from the watcher so it can be driven with synthetic events.
pub(crate) struct BindingFilter {
    id: BindingId,
    task: TaskName,
    pattern: WatchPattern,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    fingerprints: Option<Mutex<Fingerprints>>,
}

impl BindingFilter {
    pub(crate) fn process(&self, event: &Event) -> Vec<WatchTrigger> {
        let reason = match event.kind {
            EventKind::Create(_) => TriggerReason::Changed,
            EventKind::Modify(ModifyKind::Metadata(_)) => return Vec::new(),
            EventKind::Modify(_) => TriggerReason::Changed,
            EventKind::Remove(_) => TriggerReason::Removed,
            _ => return Vec::new(),
        };

        let mut triggers = Vec::new();
        for path in &event.paths {
            let Some(rel) = relative_str(&self.root, path) else {
                debug!(?path, root = ?self.root, "event outside the project root");
                continue;
            };
            if !self.pattern.matches(&rel) {
                continue;
            }
            if !self.content_changed(path) {
                debug!(path = %rel, "content unchanged; not triggering");
                continue;
            }

            debug!(task = %self.task, path = %rel, ?reason, "watched path changed");
            triggers.push(WatchTrigger {
                binding: self.id,
                task: self.task.clone(),
                path: PathBuf::from(rel),
                reason,
            });
        }
        triggers
    }

    fn content_changed(&self, path: &Path) -> bool {
        let Some(prints) = &self.fingerprints else {
            return true;
        };
        let current = match fingerprint(self.fs.as_ref(), path) {
            Ok(fp) => fp,
            Err(e) => {
                debug!(?path, error = %e, "could not fingerprint; assuming changed");
                return true;
            }
        };
        prints
            .lock()
            .map(|mut prints| prints.update(path, current))
            .unwrap_or(true)
    }
}

/// Keeps one binding's watcher alive. Dropping the handle stops watching.
pub struct WatchHandle {
    id: BindingId,
    pattern: String,
    task: TaskName,
    watcher: Option<RecommendedWatcher>,
}

impl fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchHandle")
            .field("id", &self.id)
            .field("pattern", &self.pattern)
            .field("task", &self.task)
            .field("active", &self.is_active())
            .finish()
    }
}

impl WatchHandle {
    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn task(&self) -> &str {
        &self.task
    }

    pub fn is_active(&self) -> bool {
        self.watcher.is_some()
    }

    /// Stop watching. Idempotent.
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            debug!(binding = self.id, pattern = %self.pattern, "watch stopped");
        }
    }
}

/// Creates watch bindings and funnels all of their triggers into one channel.
pub struct WatchCoordinator {
    root: PathBuf,
    use_hash: bool,
    fs: Arc<dyn FileSystem>,
    tx: mpsc::UnboundedSender<WatchTrigger>,
    next_id: BindingId,
}

impl fmt::Debug for WatchCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchCoordinator")
            .field("root", &self.root)
            .field("use_hash", &self.use_hash)
            .finish_non_exhaustive()
    }
}

impl WatchCoordinator {
    /// `root` is the directory patterns are relative to.
    pub fn new(
        root: impl Into<PathBuf>,
        use_hash: bool,
        fs: Arc<dyn FileSystem>,
    ) -> (Self, mpsc::UnboundedReceiver<WatchTrigger>) {
        let root = root.into();
        // Canonicalize once so event paths can be stripped directly.
        let root = root.canonicalize().unwrap_or(root);
        let (tx, rx) = mpsc::unbounded_channel();
        let coordinator = Self {
            root,
            use_hash,
            fs,
            tx,
            next_id: 1,
        };
        (coordinator, rx)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn filter_for(&mut self, pattern: &str, task: &str) -> Result<BindingFilter> {
        // Absolute patterns (absolute development folder) are rebased onto the root.
        let pattern = if Path::new(pattern).is_absolute() {
            relative_str(&self.root, Path::new(pattern))
                .with_context(|| format!("{pattern} is outside {:?}", self.root))?
        } else {
            pattern.to_string()
        };
        let pattern = WatchPattern::compile(&pattern)?;
        let id = self.next_id;
        self.next_id += 1;

        let fingerprints = self.use_hash.then(|| {
            let mut prints = Fingerprints::new();
            if pattern.is_literal() {
                prints.seed(self.fs.as_ref(), &self.root.join(pattern.as_str()));
            }
            Mutex::new(prints)
        });

        Ok(BindingFilter {
            id,
            task: task.to_string(),
            pattern,
            root: self.root.clone(),
            fs: Arc::clone(&self.fs),
            fingerprints,
        })
    }

    /// Re-run `task` whenever a file matching `pattern` changes.
    pub fn watch(&mut self, pattern: &str, task: &str) -> Result<WatchHandle> {
        let filter = self.filter_for(pattern, task)?;
        let id = filter.id;
        let dir = self.root.join(filter.pattern.watch_dir());
        let mode = if filter.pattern.is_recursive() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        let pattern = filter.pattern.as_str().to_string();

        let tx = self.tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for trigger in filter.process(&event) {
                        if tx.send(trigger).is_err() {
                            debug!("trigger receiver dropped");
                        }
                    }
                }
                Err(err) => warn!(error = %err, "file watch error"),
            },
            Config::default(),
        )
        .context("creating file watcher")?;

        watcher
            .watch(&dir, mode)
            .with_context(|| format!("watching {:?} for {pattern}", dir))?;

        info!(binding = id, %pattern, %task, dir = ?dir, "watching");
        Ok(WatchHandle {
            id,
            pattern,
            task: task.to_string(),
            watcher: Some(watcher),
        })
    }
}
