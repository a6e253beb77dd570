//! Concurrent registry of node implementations.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::info;

use crate::descriptor::NodeDescriptor;
use crate::error::RegistryError;
use crate::node::Node;

/// Type-erased, concurrent registry for discovering and invoking nodes by
/// name.
///
/// Backed by [`DashMap`] rather than a plain `HashMap` behind a lock: many
/// executions read this registry concurrently while it is essentially
/// static after startup, so per-key locking beats a single registry-wide
/// one.
#[derive(Default)]
pub struct NodeRegistry {
    nodes: DashMap<String, Arc<dyn Node>>,
}

impl NodeRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node. Errors if a node with the same name is already
    /// registered; call [`Self::unregister`] first to replace one
    /// deliberately.
    pub fn register(&self, node: Arc<dyn Node>) -> Result<(), RegistryError> {
        let name = node.descriptor().name.clone();
        match self.nodes.entry(name) {
            dashmap::mapref::entry::Entry::Occupied(entry) => {
                Err(RegistryError::DuplicateName(entry.key().clone()))
            }
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                info!(node = %entry.key(), "registered node");
                entry.insert(node);
                Ok(())
            }
        }
    }

    /// Look up a node by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Node>> {
        self.nodes.get(name).map(|entry| entry.clone())
    }

    /// Check whether a node with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    /// Descriptors for every registered node.
    #[must_use]
    pub fn list(&self) -> Vec<NodeDescriptor> {
        self.nodes.iter().map(|entry| entry.descriptor().clone()).collect()
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no nodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Remove a node by name. Returns the removed node, if any.
    pub fn unregister(&self, name: &str) -> Option<Arc<dyn Node>> {
        self.nodes.remove(name).map(|(_, node)| node)
    }
}

impl std::fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("count", &self.nodes.len())
            .field("names", &self.nodes.iter().map(|e| e.key().clone()).collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flowscript_core::{Edge, ExecutionId};
    use flowscript_execution::{ExecutionContext, ExecutionError};
    use flowscript_state::StateManager;
    use serde_json::{json, Value};

    struct Dummy(NodeDescriptor);

    #[async_trait]
    impl Node for Dummy {
        fn descriptor(&self) -> &NodeDescriptor {
            &self.0
        }

        async fn execute(
            &self,
            _config: &Value,
            _ctx: &ExecutionContext,
        ) -> Result<Edge, ExecutionError> {
            Ok(Edge::bare("next"))
        }
    }

    fn make(name: &str) -> Arc<dyn Node> {
        Arc::new(Dummy(NodeDescriptor::action(name)))
    }

    fn context() -> ExecutionContext {
        ExecutionContext::new(ExecutionId::v4(), Arc::new(StateManager::new(json!({}))))
    }

    #[test]
    fn empty_registry() {
        let registry = NodeRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get("anything").is_none());
    }

    #[test]
    fn register_and_get() {
        let registry = NodeRegistry::new();
        registry.register(make("sendEmail")).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("sendEmail"));
        assert!(registry.get("sendEmail").is_some());
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let registry = NodeRegistry::new();
        registry.register(make("x")).unwrap();
        let err = registry.register(make("x")).unwrap_err();
        assert!(matches!(err, RegistryError::DuplicateName(name) if name == "x"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn re_register_after_unregister_succeeds() {
        let registry = NodeRegistry::new();
        registry.register(make("x")).unwrap();
        registry.unregister("x");
        registry.register(make("x")).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_removes_and_is_idempotent_on_absence() {
        let registry = NodeRegistry::new();
        registry.register(make("temp")).unwrap();
        assert!(registry.unregister("temp").is_some());
        assert!(registry.is_empty());
        assert!(registry.unregister("temp").is_none());
    }

    #[test]
    fn list_returns_descriptors() {
        let registry = NodeRegistry::new();
        registry.register(make("a")).unwrap();
        registry.register(make("b")).unwrap();
        let mut names: Vec<String> = registry.list().into_iter().map(|d| d.name).collect();
        names.sort();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn resolved_node_executes() {
        let registry = NodeRegistry::new();
        registry.register(make("noop")).unwrap();
        let node = registry.get("noop").unwrap();
        let ctx = context();
        let edge = node.execute(&json!({}), &ctx).await.unwrap();
        assert_eq!(edge.name(), "next");
    }

    #[test]
    fn debug_format_reports_count() {
        let registry = NodeRegistry::new();
        registry.register(make("a")).unwrap();
        let debug = format!("{registry:?}");
        assert!(debug.contains("count: 1"));
    }
}
