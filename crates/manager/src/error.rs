//! Errors surfaced by the [`crate::ExecutionManager`]'s public API.

use flowscript_core::{ExecutionId, NodeId, WorkflowId};
use flowscript_execution::ExecutionError;
use flowscript_workflow::WorkflowError;
use thiserror::Error;

/// Failure from one of the manager's entry points: `start`, `status`,
/// `resume`, `cancel`, `list`, `subscribe`.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// `start` or `load_workflow` referenced a workflow that isn't loaded.
    #[error("workflow `{0}` is not loaded")]
    UnknownWorkflow(WorkflowId),

    /// `status`, `resume`, `cancel`, or `subscribe` referenced an execution
    /// that was never started (or has been forgotten).
    #[error("execution `{0}` is not known")]
    UnknownExecution(ExecutionId),

    /// A workflow definition failed to parse.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// `resume` targeted an execution that is not currently paused.
    #[error("execution `{0}` is not paused")]
    NotPaused(ExecutionId),

    /// `resume` targeted a node with no pause installed, even though the
    /// execution as a whole is paused (stale or mistyped node id).
    #[error("no pending pause at node `{0}`")]
    UnknownPause(NodeId),

    /// Propagated from the execution layer: a resume, transition, or
    /// dispatch failure surfaced while servicing the call.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}
