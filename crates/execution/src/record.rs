//! The persisted-shape record of a single execution.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use flowscript_core::{ExecutionId, NodeId, WorkflowId};
use flowscript_state::StateManager;
use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;
use crate::journal::JournalEntry;
use crate::pause::PendingPause;
use crate::status::ExecutionStatus;
use crate::transition;

/// Everything the Execution Manager tracks about one execution: status,
/// current position, outstanding pauses, and the audit journal. Cheap to
/// clone-share via [`Arc`] between the task running the interpreter and
/// whatever is inspecting or resuming it.
pub struct ExecutionRecord {
    /// This execution's identifier.
    pub execution_id: ExecutionId,
    /// The workflow this execution is running.
    pub workflow_id: WorkflowId,
    /// The execution's state document.
    pub state: Arc<StateManager>,
    /// Cooperative cancellation shared with the running [`crate::ExecutionContext`],
    /// so a caller holding only this record can cancel the execution without
    /// reaching into the interpreter task.
    pub cancellation: CancellationToken,
    status: RwLock<ExecutionStatus>,
    current_node: RwLock<Option<NodeId>>,
    start_time: DateTime<Utc>,
    end_time: RwLock<Option<DateTime<Utc>>>,
    pending_pauses: DashMap<NodeId, Arc<PendingPause>>,
    journal: RwLock<Vec<JournalEntry>>,
}

impl ExecutionRecord {
    /// Start a new execution record in the `Running` state.
    #[must_use]
    pub fn start(execution_id: ExecutionId, workflow_id: WorkflowId, state: Arc<StateManager>) -> Self {
        let start_time = Utc::now();
        let record = Self {
            execution_id,
            workflow_id,
            state,
            cancellation: CancellationToken::new(),
            status: RwLock::new(ExecutionStatus::Running),
            current_node: RwLock::new(None),
            start_time,
            end_time: RwLock::new(None),
            pending_pauses: DashMap::new(),
            journal: RwLock::new(Vec::new()),
        };
        record.record(JournalEntry::ExecutionStarted { timestamp: start_time });
        record
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> ExecutionStatus {
        *self.status.read()
    }

    /// The node the interpreter is currently at, if any.
    #[must_use]
    pub fn current_node(&self) -> Option<NodeId> {
        self.current_node.read().clone()
    }

    /// Update the node the interpreter is currently at.
    pub fn set_current_node(&self, node_id: NodeId) {
        *self.current_node.write() = Some(node_id);
    }

    /// When this execution started.
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// When this execution reached a terminal state, if it has.
    #[must_use]
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        *self.end_time.read()
    }

    /// Move to a new status, validating the transition and, if the new
    /// status is terminal, stamping `end_time`.
    pub fn transition_to(&self, to: ExecutionStatus) -> Result<(), ExecutionError> {
        let from = self.status();
        transition::validate(from, to)?;
        *self.status.write() = to;
        if to.is_terminal() {
            let now = Utc::now();
            *self.end_time.write() = Some(now);
            self.record(JournalEntry::Finished {
                timestamp: now,
                status: to,
            });
        }
        Ok(())
    }

    /// Append an entry to the audit journal.
    pub fn record(&self, entry: JournalEntry) {
        self.journal.write().push(entry);
    }

    /// A snapshot of the audit journal so far.
    #[must_use]
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.journal.read().clone()
    }

    /// Install a pending pause, keyed by the node it paused at.
    pub fn install_pause(&self, pause: Arc<PendingPause>) {
        self.pending_pauses.insert(pause.node_id().clone(), pause);
    }

    /// Look up a pending pause without removing it.
    #[must_use]
    pub fn get_pause(&self, node_id: &NodeId) -> Option<Arc<PendingPause>> {
        self.pending_pauses.get(node_id).map(|entry| entry.clone())
    }

    /// Remove a pending pause once it has been resolved.
    pub fn remove_pause(&self, node_id: &NodeId) -> Option<Arc<PendingPause>> {
        self.pending_pauses.remove(node_id).map(|(_, pause)| pause)
    }

    /// Every node currently paused, across the whole execution (relevant
    /// when a loop body contains a human-pause node and several iterations
    /// are conceptually "at" it over time — in practice at most one is
    /// outstanding at once, since the interpreter is single-threaded per
    /// execution).
    #[must_use]
    pub fn pending_pause_nodes(&self) -> Vec<NodeId> {
        self.pending_pauses.iter().map(|entry| entry.key().clone()).collect()
    }
}
