// src/tasks/context.rs

use std::collections::HashSet;
use std::sync::Arc;

use crate::config::model::Configuration;
use crate::layer::{LayerId, LayerSelector};

use super::TaskName;

/// Explicit state of one CLI invocation, threaded through every task.
///
/// A "run" is one CLI invocation or one watch trigger. Within a run, a task
/// that already succeeded for the current layer is not repeated;
/// [`RunContext::start_new_run`] clears that memo.
#[derive(Debug)]
pub struct RunContext {
    config: Arc<Configuration>,
    layer: LayerSelector,
    run_id: u64,
    succeeded: HashSet<(TaskName, LayerId)>,
}

impl RunContext {
    pub fn new(config: Arc<Configuration>) -> Self {
        Self {
            config,
            layer: LayerSelector::new(),
            run_id: 0,
            succeeded: HashSet::new(),
        }
    }

    pub fn config(&self) -> &Arc<Configuration> {
        &self.config
    }

    pub fn layer(&self) -> LayerId {
        self.layer.current()
    }

    pub fn selector(&self) -> &LayerSelector {
        &self.layer
    }

    pub fn selector_mut(&mut self) -> &mut LayerSelector {
        &mut self.layer
    }

    /// Forget what succeeded so far and return the new run id.
    pub fn start_new_run(&mut self) -> u64 {
        self.run_id += 1;
        self.succeeded.clear();
        self.run_id
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub(crate) fn already_succeeded(&self, task: &str) -> bool {
        self.succeeded
            .contains(&(task.to_string(), self.layer.current()))
    }

    pub(crate) fn mark_succeeded(&mut self, task: &str) {
        self.succeeded
            .insert((task.to_string(), self.layer.current()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_str;

    const MINIMAL: &str = r#"{
        "colors": {},
        "folders": {
            "development": "dev/",
            "production": "prod/",
            "validator_results": "results/",
            "layers": { "content": "c/", "settings": "s/", "backend": "b/" }
        },
        "content_layer": { "controllers": { "main": "main.js" } },
        "settings_layer": { "controllers": { "main": "main.js" } },
        "backend_layer": { "controllers": { "main": "main.js" } }
    }"#;

    #[test]
    fn memo_is_per_layer_and_per_run() {
        let config = Arc::new(parse_str(MINIMAL, false).unwrap());
        let mut ctx = RunContext::new(config);
        assert_eq!(ctx.start_new_run(), 1);

        ctx.selector_mut().select(LayerId::Content);
        ctx.mark_succeeded("compileCss");
        assert!(ctx.already_succeeded("compileCss"));

        ctx.selector_mut().select(LayerId::Settings);
        assert!(!ctx.already_succeeded("compileCss"));

        ctx.selector_mut().select(LayerId::Content);
        assert_eq!(ctx.start_new_run(), 2);
        assert!(!ctx.already_succeeded("compileCss"));
        assert_eq!(ctx.layer(), LayerId::Content);
    }
}
