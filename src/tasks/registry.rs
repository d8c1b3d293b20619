// src/tasks/registry.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::debug;

use crate::errors::{LayerbuildError, Result};
use crate::layer::LayerId;

use super::{TaskAction, TaskName, TaskSpec};

/// Immutable-once-registered task declarations.
///
/// Dependencies may name tasks that are registered later; they are checked
/// when a plan is built. A declaration that would close a cycle is rejected
/// and leaves the registry unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, TaskSpec>,
    /// Lower-cased names and aliases -> canonical name.
    index: HashMap<String, TaskName>,
}

impl TaskRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: TaskSpec) -> Result<()> {
        let lookup_key = spec.name.to_lowercase();
        if self.tasks.contains_key(&spec.name) || self.index.contains_key(&lookup_key) {
            return Err(LayerbuildError::DuplicateTask(spec.name));
        }

        self.check_acyclic_with(&spec)?;

        debug!(task = %spec.name, deps = ?spec.deps, "task registered");
        self.index.insert(lookup_key, spec.name.clone());
        self.tasks.insert(spec.name.clone(), spec);
        Ok(())
    }

    /// Make `alias` (matched case-insensitively) resolve to `target`.
    pub fn alias(&mut self, alias: &str, target: &str) -> Result<()> {
        if !self.tasks.contains_key(target) {
            return Err(LayerbuildError::UnknownTask(target.to_string()));
        }
        let key = alias.to_lowercase();
        match self.index.get(&key) {
            Some(existing) if existing != target => {
                Err(LayerbuildError::DuplicateTask(alias.to_string()))
            }
            _ => {
                self.index.insert(key, target.to_string());
                Ok(())
            }
        }
    }

    /// Edge direction: dep -> task. A topological sort fails on a cycle.
    fn check_acyclic_with(&self, spec: &TaskSpec) -> Result<()> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

        for existing in self.tasks.values().chain(std::iter::once(spec)) {
            graph.add_node(existing.name.as_str());
            for dep in &existing.deps {
                graph.add_edge(dep.as_str(), existing.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(LayerbuildError::CyclicTask {
                task: spec.name.clone(),
                via: cycle.node_id().to_string(),
            }),
        }
    }

    /// Canonical name for `name`, matched exactly, then case-insensitively
    /// against names and aliases.
    pub fn canonical_name(&self, name: &str) -> Result<&str> {
        if let Some((canonical, _)) = self.tasks.get_key_value(name) {
            return Ok(canonical.as_str());
        }
        self.index
            .get(&name.to_lowercase())
            .map(|s| s.as_str())
            .ok_or_else(|| LayerbuildError::UnknownTask(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&TaskSpec> {
        let canonical = self.canonical_name(name)?;
        self.tasks
            .get(canonical)
            .ok_or_else(|| LayerbuildError::UnknownTask(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|s| s.as_str())
    }

    pub fn specs(&self) -> impl Iterator<Item = &TaskSpec> {
        self.tasks.values()
    }

    /// Layer served by `name`, if it is a serve task.
    pub fn serve_layer(&self, name: &str) -> Option<LayerId> {
        match self.get(name).ok()?.action {
            TaskAction::Serve(layer) => Some(layer),
            _ => None,
        }
    }

    /// Depth-first execution order: each dependency (in declared order, each
    /// at most once) before its dependents, ending with `name` itself.
    pub fn plan(&self, name: &str) -> Result<Vec<TaskName>> {
        let root = self.canonical_name(name)?.to_string();
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.visit(&root, &mut seen, &mut order)?;
        Ok(order)
    }

    fn visit(&self, name: &str, seen: &mut HashSet<TaskName>, order: &mut Vec<TaskName>) -> Result<()> {
        if !seen.insert(name.to_string()) {
            return Ok(());
        }
        let spec = self
            .tasks
            .get(name)
            .ok_or_else(|| LayerbuildError::UnknownTask(name.to_string()))?;
        for dep in &spec.deps {
            self.visit(dep, seen, order)?;
        }
        order.push(spec.name.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::TaskAction;

    fn spec(name: &str, deps: &[&str]) -> TaskSpec {
        deps.iter()
            .fold(TaskSpec::new(name, TaskAction::Clean), |s, d| s.after(*d))
    }

    #[test]
    fn plan_is_depth_first_and_deduplicated() {
        let mut registry = TaskRegistry::new();
        registry.register(spec("select", &[])).unwrap();
        registry.register(spec("compile", &["select"])).unwrap();
        registry.register(spec("lint", &["select"])).unwrap();
        registry.register(spec("serve", &["select", "compile", "lint"])).unwrap();

        assert_eq!(
            registry.plan("serve").unwrap(),
            vec!["select", "compile", "lint", "serve"]
        );
    }

    #[test]
    fn forward_references_are_checked_at_plan_time() {
        let mut registry = TaskRegistry::new();
        registry.register(spec("validate", &["compile"])).unwrap();

        match registry.plan("validate") {
            Err(LayerbuildError::UnknownTask(name)) => assert_eq!(name, "compile"),
            other => panic!("expected UnknownTask, got {other:?}"),
        }

        registry.register(spec("compile", &[])).unwrap();
        assert_eq!(registry.plan("validate").unwrap(), vec!["compile", "validate"]);
    }

    #[test]
    fn closing_a_cycle_is_rejected_and_registry_unchanged() {
        let mut registry = TaskRegistry::new();
        registry.register(spec("a", &["b"])).unwrap();

        let err = registry.register(spec("b", &["a"])).unwrap_err();
        assert!(matches!(err, LayerbuildError::CyclicTask { ref task, .. } if task == "b"));
        assert!(registry.get("b").is_err());
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut registry = TaskRegistry::new();
        let err = registry.register(spec("loop", &["loop"])).unwrap_err();
        assert!(matches!(err, LayerbuildError::CyclicTask { .. }));
    }

    #[test]
    fn names_match_case_insensitively_and_through_aliases() {
        let mut registry = TaskRegistry::new();
        registry.register(spec("validateCss", &[])).unwrap();
        registry.alias("checkStyles", "validateCss").unwrap();

        assert_eq!(registry.canonical_name("validateCSS").unwrap(), "validateCss");
        assert_eq!(registry.canonical_name("CHECKSTYLES").unwrap(), "validateCss");
        assert!(matches!(
            registry.register(spec("VALIDATECSS", &[])),
            Err(LayerbuildError::DuplicateTask(_))
        ));
    }
}
