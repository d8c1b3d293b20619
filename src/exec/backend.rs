// src/exec/backend.rs

//! Pluggable tool backend abstraction.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;
use crate::tasks::{ResolvedPaths, TaskName};

/// The external processors a task can hand its paths to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    HtmlValidator,
    CssCompiler,
    CssValidator,
    JsLinter,
}

impl ToolKind {
    pub const ALL: [ToolKind; 4] = [
        ToolKind::HtmlValidator,
        ToolKind::CssCompiler,
        ToolKind::CssValidator,
        ToolKind::JsLinter,
    ];

    /// Key of this tool's template in the `tools` config section.
    pub fn config_key(self) -> &'static str {
        match self {
            ToolKind::HtmlValidator => "html_validator",
            ToolKind::CssCompiler => "css_compiler",
            ToolKind::CssValidator => "css_validator",
            ToolKind::JsLinter => "js_linter",
        }
    }

    /// Placeholders the template may use. Only tools that write somewhere
    /// get a destination.
    pub fn placeholders(self) -> &'static [&'static str] {
        match self {
            ToolKind::HtmlValidator | ToolKind::JsLinter => &["source"],
            ToolKind::CssCompiler | ToolKind::CssValidator => &["source", "dest", "output"],
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ToolKind::HtmlValidator => "HTML validator",
            ToolKind::CssCompiler => "CSS compiler",
            ToolKind::CssValidator => "CSS validator",
            ToolKind::JsLinter => "JS linter",
        };
        f.write_str(label)
    }
}

/// One request to run a tool on resolved paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub task: TaskName,
    pub tool: ToolKind,
    pub paths: ResolvedPaths,
}

/// What the tool reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolVerdict {
    Passed,
    /// The tool ran and reported problems; `output` is passed on verbatim.
    Failed {
        exit_code: Option<i32>,
        output: String,
    },
    /// The watchdog killed the tool.
    TimedOut { after: Duration },
}

impl ToolVerdict {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolVerdict::Passed)
    }
}

/// Trait abstracting how tools are run.
///
/// Production code uses [`super::CommandBackend`]; tests provide an
/// implementation that records invocations and returns scripted verdicts.
/// An `Err` means the tool could not be started at all.
pub trait ToolBackend: Send {
    fn invoke(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolVerdict>> + Send + '_>>;
}
