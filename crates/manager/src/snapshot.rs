//! Point-in-time views the manager hands back from `status` and `list`.

use chrono::{DateTime, Utc};
use flowscript_core::{ExecutionId, NodeId, WorkflowId};
use flowscript_execution::ExecutionStatus;
use serde::Serialize;
use serde_json::Value;

/// A snapshot of one execution's tracked state, safe to hand to a caller
/// without exposing the live [`flowscript_execution::ExecutionRecord`].
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSnapshot {
    /// This execution's identifier.
    pub execution_id: ExecutionId,
    /// The workflow this execution is running.
    pub workflow_id: WorkflowId,
    /// Current status.
    pub status: ExecutionStatus,
    /// The node the interpreter is currently at, if any.
    pub current_node: Option<NodeId>,
    /// Nodes with an outstanding pause, if the execution is paused.
    pub pending_pause_nodes: Vec<NodeId>,
    /// When the execution started.
    pub start_time: DateTime<Utc>,
    /// When the execution reached a terminal state, if it has.
    pub end_time: Option<DateTime<Utc>>,
    /// The execution's current state document.
    pub state: Value,
}

/// Filter applied by [`crate::ExecutionManager::list`].
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Only include executions of this workflow.
    pub workflow_id: Option<WorkflowId>,
    /// Only include executions in this status.
    pub status: Option<ExecutionStatus>,
}

impl ListFilter {
    /// No filtering: every tracked execution matches.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter to a single workflow.
    #[must_use]
    pub fn for_workflow(workflow_id: WorkflowId) -> Self {
        Self { workflow_id: Some(workflow_id), status: None }
    }

    /// Filter to a single status.
    #[must_use]
    pub fn with_status(status: ExecutionStatus) -> Self {
        Self { workflow_id: None, status: Some(status) }
    }

    fn matches(&self, snapshot: &ExecutionSnapshot) -> bool {
        self.workflow_id.is_none_or(|id| id == snapshot.workflow_id)
            && self.status.is_none_or(|status| status == snapshot.status)
    }
}

pub(crate) fn apply(filter: &ListFilter, snapshots: Vec<ExecutionSnapshot>) -> Vec<ExecutionSnapshot> {
    snapshots.into_iter().filter(|snapshot| filter.matches(snapshot)).collect()
}
