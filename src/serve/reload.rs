// src/serve/reload.rs

//! Fan-out of "reload now" signals.
//!
//! The hub does not know how a browser is reloaded; observers subscribe and
//! act on each [`ReloadSignal`].

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::exec::{ToolVerdict, run_shell};
use crate::tasks::TaskName;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadSignal {
    /// Task whose success caused the reload.
    pub task: TaskName,
    pub run_id: u64,
}

#[derive(Debug, Clone)]
pub struct ReloadHub {
    tx: broadcast::Sender<ReloadSignal>,
}

impl ReloadHub {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReloadSignal> {
        self.tx.subscribe()
    }

    /// Broadcast a signal; returns how many observers received it.
    pub fn notify(&self, task: &str, run_id: u64) -> usize {
        let signal = ReloadSignal {
            task: task.to_string(),
            run_id,
        };
        match self.tx.send(signal) {
            Ok(n) => n,
            Err(_) => {
                debug!(%task, "reload requested with no observers");
                0
            }
        }
    }
}

impl Default for ReloadHub {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Log every reload.
pub fn spawn_log_observer(mut rx: broadcast::Receiver<ReloadSignal>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(signal) => info!(task = %signal.task, run = signal.run_id, "reload"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped, "log observer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Run `command` for every reload, e.g. a live-reload server's trigger.
pub fn spawn_command_observer(
    mut rx: broadcast::Receiver<ReloadSignal>,
    command: String,
    timeout: Option<Duration>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let signal = match rx.recv().await {
                Ok(signal) => signal,
                // Only the latest state matters for a reload.
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            };

            match run_shell(&command, timeout).await {
                Ok(ToolVerdict::Passed) => {
                    debug!(task = %signal.task, cmd = %command, "reload command finished")
                }
                Ok(verdict) => warn!(cmd = %command, ?verdict, "reload command failed"),
                Err(e) => warn!(cmd = %command, error = %e, "reload command could not run"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn every_subscriber_sees_each_signal() {
        let hub = ReloadHub::new(4);
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.notify("compileCss", 3), 2);

        let expected = ReloadSignal {
            task: "compileCss".to_string(),
            run_id: 3,
        };
        assert_eq!(a.recv().await.unwrap(), expected);
        assert_eq!(b.recv().await.unwrap(), expected);
    }

    #[test]
    fn notify_without_observers_is_not_an_error() {
        let hub = ReloadHub::default();
        assert_eq!(hub.notify("lintJs", 1), 0);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn command_observer_runs_per_signal() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("reloaded");
        let hub = ReloadHub::new(4);
        let observer = spawn_command_observer(
            hub.subscribe(),
            format!("echo x >> '{}'", marker.display()),
            None,
        );

        hub.notify("lintJs", 1);
        drop(hub);
        observer.await.unwrap();

        assert_eq!(std::fs::read_to_string(&marker).unwrap(), "x\n");
    }
}
