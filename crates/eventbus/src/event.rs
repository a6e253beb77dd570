//! The events published to an execution's subscribers.

use flowscript_core::NodeId;
use serde_json::Value;

/// Something that happened during an execution, delivered to every live
/// subscriber of that execution.
#[derive(Debug, Clone)]
pub enum Event {
    /// The execution began.
    ExecutionStarted,
    /// The interpreter entered a node invocation.
    NodeEntered {
        /// The node entered.
        node_id: NodeId,
    },
    /// A node invocation produced an edge.
    NodeExited {
        /// The node that exited.
        node_id: NodeId,
        /// The edge name it produced.
        edge: String,
    },
    /// The state document was written to.
    StateChanged {
        /// The path that was written.
        path: String,
        /// The value now at that path.
        new_value: Value,
    },
    /// The execution suspended at a human-pause node.
    Paused {
        /// The node that paused.
        node_id: NodeId,
        /// The schema describing the data a resume call should supply.
        form_schema: Option<Value>,
    },
    /// A pause was resolved and the execution resumed.
    Resumed {
        /// The node that had paused.
        node_id: NodeId,
    },
    /// The execution completed successfully.
    ExecutionCompleted {
        /// The final state document.
        final_state: Value,
    },
    /// The execution failed.
    ExecutionFailed {
        /// Short machine-readable category of the failure.
        error_kind: String,
        /// Human-readable detail.
        message: String,
    },
    /// The execution was cancelled.
    ExecutionCancelled,
    /// A subscriber fell too far behind to keep up with publication and was
    /// dropped. Delivered to the subscribers that are still keeping up, so
    /// observers can tell their view of the execution may be incomplete.
    SubscriberDropped,
    /// A `{{expr}}` token in a node's config did not resolve against the
    /// current bindings or state. Soft: the token is left in place and the
    /// node still runs.
    TemplateMiss {
        /// The node whose config contained the token.
        node_id: NodeId,
        /// The unresolved expression, without the surrounding `{{ }}`.
        expression: String,
    },
}
