//! The pause/resume continuation installed by the Human-Pause Controller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use flowscript_core::NodeId;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::ExecutionError;

/// What the paused node resumes with.
#[derive(Debug)]
pub struct ResumeOutcome {
    /// Name of the edge to resume on (defaults to `"submitted"` if the
    /// caller didn't specify one).
    pub edge: String,
    /// Data attached to the resume edge.
    pub data: Value,
}

/// A pause installed while a human-pause node waits for an external resume
/// call.
///
/// Resolution is single-shot: the first `resolve` call wins and fulfills
/// the oneshot continuation; every subsequent call observes
/// [`ExecutionError::AlreadyResumed`], mirroring an idempotency-key
/// check-and-mark guard.
pub struct PendingPause {
    node_id: NodeId,
    /// Schema describing the data a resume call should supply, surfaced to
    /// whatever is waiting on the `paused` event.
    pub form_schema: Option<Value>,
    /// When this pause expires, if it has a timeout.
    pub expires_at: Option<DateTime<Utc>>,
    /// The edge name a successful resume continues on, taken from the
    /// node's descriptor at pause time so a later `resume(id, nodeId, data)`
    /// call doesn't need registry access to know it.
    resume_edge: String,
    resolved: AtomicBool,
    sender: Mutex<Option<oneshot::Sender<ResumeOutcome>>>,
}

impl PendingPause {
    /// Create a pause and the receiver the interpreter should await.
    #[must_use]
    pub fn new(
        node_id: NodeId,
        form_schema: Option<Value>,
        expires_at: Option<DateTime<Utc>>,
        resume_edge: impl Into<String>,
    ) -> (Self, oneshot::Receiver<ResumeOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                node_id,
                form_schema,
                expires_at,
                resume_edge: resume_edge.into(),
                resolved: AtomicBool::new(false),
                sender: Mutex::new(Some(sender)),
            },
            receiver,
        )
    }

    /// The node this pause is installed at.
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// The edge name a successful resume continues on.
    #[must_use]
    pub fn resume_edge(&self) -> &str {
        &self.resume_edge
    }

    /// Whether this pause has already been resolved, by a resume or a
    /// timeout.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Resolve the pause, waking the interpreter with `outcome`.
    ///
    /// Returns [`ExecutionError::AlreadyResumed`] if this pause was already
    /// resolved by an earlier call.
    pub fn resolve(&self, outcome: ResumeOutcome) -> Result<(), ExecutionError> {
        if self
            .resolved
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(ExecutionError::AlreadyResumed(self.node_id.clone()));
        }
        let sender = self
            .sender
            .lock()
            .expect("pause sender mutex poisoned")
            .take()
            .expect("resolved flag guarantees sender is taken exactly once");
        // The receiver may already be gone if the interpreter task was
        // dropped (e.g. the execution was cancelled); that's not this
        // call's problem to report.
        let _ = sender.send(outcome);
        Ok(())
    }
}
