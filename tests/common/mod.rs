#![allow(dead_code)]

use std::sync::Arc;

pub use layerbuild_test_utils::{ConfigurationBuilder, FakeToolBackend, init_tracing, with_timeout};

use layerbuild::config::Configuration;
use layerbuild::fs::FileSystem;
use layerbuild::tasks::{Executor, RunContext, TaskRegistry};

/// Built-in executor over a fake backend and the given filesystem, plus a
/// fresh context for `config`.
pub fn executor_with(
    config: Configuration,
    fs: Arc<dyn FileSystem>,
) -> (Executor<FakeToolBackend>, FakeToolBackend, RunContext) {
    let registry = Arc::new(TaskRegistry::builtin().expect("built-in registry"));
    let backend = FakeToolBackend::new();
    let executor = Executor::new(registry, backend.clone(), fs);
    let mut ctx = RunContext::new(Arc::new(config));
    ctx.start_new_run();
    (executor, backend, ctx)
}
