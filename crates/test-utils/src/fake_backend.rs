use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use layerbuild::errors::Result;
use layerbuild::exec::{ToolBackend, ToolInvocation, ToolKind, ToolVerdict};

/// A fake tool backend that:
/// - records every invocation (shared, so tests can inspect it after the
///   backend has been moved into an executor)
/// - answers with a scripted verdict per tool, `Passed` by default.
#[derive(Clone, Default)]
pub struct FakeToolBackend {
    invocations: Arc<Mutex<Vec<ToolInvocation>>>,
    verdicts: Arc<Mutex<HashMap<ToolKind, ToolVerdict>>>,
}

impl FakeToolBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every later invocation of `tool` with `verdict`.
    pub fn respond(&self, tool: ToolKind, verdict: ToolVerdict) {
        self.verdicts.lock().unwrap().insert(tool, verdict);
    }

    pub fn fail(&self, tool: ToolKind, output: &str) {
        self.respond(
            tool,
            ToolVerdict::Failed {
                exit_code: Some(1),
                output: output.to_string(),
            },
        );
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// Task names in invocation order.
    pub fn tasks(&self) -> Vec<String> {
        self.invocations()
            .into_iter()
            .map(|i| i.task)
            .collect()
    }

    pub fn clear(&self) {
        self.invocations.lock().unwrap().clear();
    }
}

impl ToolBackend for FakeToolBackend {
    fn invoke(
        &mut self,
        invocation: ToolInvocation,
    ) -> Pin<Box<dyn Future<Output = Result<ToolVerdict>> + Send + '_>> {
        let verdict = self
            .verdicts
            .lock()
            .unwrap()
            .get(&invocation.tool)
            .cloned()
            .unwrap_or(ToolVerdict::Passed);
        self.invocations.lock().unwrap().push(invocation);

        Box::pin(async move { Ok(verdict) })
    }
}
