// src/exec/command.rs

//! Shell-command tool backend.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, anyhow};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::model::{Configuration, ToolsSection};
use crate::errors::Result;

use super::backend::{ToolBackend, ToolInvocation, ToolVerdict};
use super::template::render;

/// Runs each tool as a shell command rendered from the `tools` templates.
#[derive(Debug, Clone)]
pub struct CommandBackend {
    tools: ToolsSection,
    timeout: Option<Duration>,
}

impl CommandBackend {
    pub fn new(tools: ToolsSection) -> Self {
        let timeout = match tools.timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };
        Self { tools, timeout }
    }

    pub fn from_config(config: &Configuration) -> Self {
        Self::new(config.tools().clone())
    }

    /// Render the command line for an invocation.
    pub fn command_line(&self, invocation: &ToolInvocation) -> Result<String> {
        let paths = &invocation.paths;
        let mut vars = vec![("source", paths.source.display().to_string())];

        if let Some(dest) = &paths.destination {
            vars.push(("dest", dest.display().to_string()));
            let output = match &paths.output {
                Some(output) => output.display().to_string(),
                None => output_path(&paths.source, dest),
            };
            vars.push(("output", output));
        }

        let template = self.tools.template(invocation.tool);
        render(template, &vars).map_err(|e| {
            anyhow!("rendering {} command for task '{}': {e}", invocation.tool, invocation.task)
                .into()
        })
    }
}

/// `dest/<source stem>.css`, for tools whose output is not configured.
fn output_path(source: &Path, dest: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    dest.join(format!("{stem}.css")).display().to_string()
}

impl ToolBackend for CommandBackend {
    fn invoke(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolVerdict>> + Send + '_>> {
        Box::pin(async move {
            let line = self.command_line(&invocation)?;

            if let Some(dest) = &invocation.paths.destination {
                tokio::fs::create_dir_all(dest)
                    .await
                    .with_context(|| format!("creating destination folder {dest:?}"))?;
            }
            if let Some(parent) = invocation.paths.output.as_deref().and_then(Path::parent) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("creating output folder {parent:?}"))?;
            }

            info!(
                task = %invocation.task,
                tool = %invocation.tool,
                cmd = %line,
                "running tool"
            );
            run_shell(&line, self.timeout).await
        })
    }
}

/// Run `line` through the platform shell and turn its exit into a verdict.
///
/// Output from both streams is collected so failures can be shown verbatim.
/// When `timeout` elapses the process is killed and `TimedOut` is returned.
pub async fn run_shell(line: &str, timeout: Option<Duration>) -> Result<ToolVerdict> {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(line);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(line);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for command '{line}'"))?;

    let stdout = child.stdout.take().map(|s| collect_lines(s, "stdout"));
    let stderr = child.stderr.take().map(|s| collect_lines(s, "stderr"));

    let status = match timeout {
        Some(limit) => {
            let waited = tokio::time::timeout(limit, child.wait()).await;
            match waited {
                Ok(status) => status,
                Err(_) => {
                    warn!(cmd = %line, ?limit, "tool exceeded its time limit; killing it");
                    if let Err(e) = child.kill().await {
                        warn!(error = %e, "failed to kill timed-out tool");
                    }
                    return Ok(ToolVerdict::TimedOut { after: limit });
                }
            }
        }
        None => child.wait().await,
    }
    .with_context(|| format!("waiting for command '{line}'"))?;

    let mut output = join_lines(stdout).await;
    output.extend(join_lines(stderr).await);

    let code = status.code();
    debug!(cmd = %line, exit_code = ?code, success = status.success(), "tool exited");

    if status.success() {
        Ok(ToolVerdict::Passed)
    } else {
        Ok(ToolVerdict::Failed {
            exit_code: code,
            output: output.join("\n"),
        })
    }
}

fn collect_lines<R>(stream: R, label: &'static str) -> JoinHandle<Vec<String>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(stream).lines();
        let mut collected = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!("{label}: {line}");
            collected.push(line);
        }
        collected
    })
}

async fn join_lines(handle: Option<JoinHandle<Vec<String>>>) -> Vec<String> {
    match handle {
        Some(h) => h.await.unwrap_or_default(),
        None => Vec::new(),
    }
}
