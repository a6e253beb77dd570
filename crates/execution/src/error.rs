//! Execution-local error types: everything that can go wrong while a single
//! execution is running, as opposed to lookup failures at the manager level
//! (`flowscript_manager::ManagerError`) or workflow parsing failures
//! (`flowscript_workflow::WorkflowError`).

use flowscript_core::NodeId;
use thiserror::Error;

use crate::status::ExecutionStatus;

/// Errors raised while running a single execution.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// A state transition is not valid for the current status.
    #[error("invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: ExecutionStatus,
        /// Attempted target status.
        to: ExecutionStatus,
    },

    /// A flow element referenced a node name that isn't registered.
    #[error("node `{name}` referenced at `{node_id}` is not registered")]
    UnknownNode {
        /// The flow element that referenced the missing node.
        node_id: NodeId,
        /// The unresolved node name.
        name: String,
    },

    /// A node's config object failed validation against its descriptor.
    #[error("node config invalid at `{node_id}`: {reason}")]
    ConfigInvalid {
        /// The node whose config was rejected.
        node_id: NodeId,
        /// Why it was rejected.
        reason: String,
    },

    /// A node invocation produced an error rather than an edge.
    #[error("node `{node_id}` failed: {cause}")]
    NodeFailed {
        /// The node that failed.
        node_id: NodeId,
        /// The node's reported failure.
        cause: String,
    },

    /// A branch's condition produced an edge with no matching arm and no
    /// catch-all.
    #[error("edge `{edge}` at `{node_id}` matched no branch arm and no catch-all was defined")]
    UnroutedEdge {
        /// The branch element where routing failed.
        node_id: NodeId,
        /// The edge name that had nowhere to go.
        edge: String,
    },

    /// Reading or writing the state document failed.
    #[error(transparent)]
    State(#[from] flowscript_state::StateError),

    /// A resume call targeted an execution that is not currently paused.
    #[error("execution is not paused")]
    NotPaused,

    /// A resume call referenced a pause that doesn't exist (wrong node id,
    /// or it was already cleared).
    #[error("no pending pause at `{0}`")]
    UnknownPause(NodeId),

    /// A resume call targeted a pause that was already resolved — the
    /// second of two concurrent resume calls observes this.
    #[error("pause at `{0}` was already resumed")]
    AlreadyResumed(NodeId),

    /// The execution's cancellation token was triggered.
    #[error("execution cancelled")]
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_transition_display_names_both_states() {
        let err = ExecutionError::InvalidTransition {
            from: ExecutionStatus::Completed,
            to: ExecutionStatus::Running,
        };
        assert_eq!(err.to_string(), "invalid transition from completed to running");
    }

    #[test]
    fn unrouted_edge_display() {
        let err = ExecutionError::UnroutedEdge {
            node_id: NodeId::root(),
            edge: "maybe".into(),
        };
        assert!(err.to_string().contains("maybe"));
    }

    #[test]
    fn state_error_converts_via_from() {
        let state_err = flowscript_state::StateError::InvalidPath {
            path: "x".into(),
        };
        let err: ExecutionError = state_err.into();
        assert!(matches!(err, ExecutionError::State(_)));
    }
}
