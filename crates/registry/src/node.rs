//! The trait every node implementation satisfies.

use async_trait::async_trait;
use flowscript_core::Edge;
use flowscript_execution::{ExecutionContext, ExecutionError};
use serde_json::Value;

use crate::descriptor::NodeDescriptor;

/// A single unit of work invocable from a workflow's flow tree.
///
/// `execute` receives the node's config object with templates already
/// resolved, and returns the [`Edge`] the interpreter routes on next. A
/// node that wants the execution to pause returns an edge whose data
/// carries whatever the Human-Pause Controller needs — the controller
/// itself, not this trait, owns the pause/resume mechanics.
#[async_trait]
pub trait Node: Send + Sync {
    /// Static metadata about this node.
    fn descriptor(&self) -> &NodeDescriptor;

    /// Run the node against its resolved config, producing an edge.
    async fn execute(
        &self,
        config: &Value,
        ctx: &ExecutionContext,
    ) -> Result<Edge, ExecutionError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowscript_core::ExecutionId;
    use flowscript_state::StateManager;
    use serde_json::json;
    use std::sync::Arc;

    struct Echo(NodeDescriptor);

    #[async_trait]
    impl Node for Echo {
        fn descriptor(&self) -> &NodeDescriptor {
            &self.0
        }

        async fn execute(
            &self,
            config: &Value,
            _ctx: &ExecutionContext,
        ) -> Result<Edge, ExecutionError> {
            Ok(Edge::immediate("next", config.clone()))
        }
    }

    #[tokio::test]
    async fn node_executes_and_returns_an_edge() {
        let node = Echo(NodeDescriptor::action("echo"));
        let ctx = ExecutionContext::new(ExecutionId::v4(), Arc::new(StateManager::new(json!({}))));
        let edge = node.execute(&json!({"a": 1}), &ctx).await.unwrap();
        assert_eq!(edge.name(), "next");
        assert_eq!(edge.data(), json!({"a": 1}));
    }
}
