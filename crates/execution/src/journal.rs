//! Execution journal: an in-process, append-only audit log.
//!
//! Every entry mirrors something the Event Bus also publishes, but the
//! journal stays attached to the [`crate::ExecutionRecord`] so it can be
//! inspected after the fact, independent of whether anyone was subscribed
//! at the time. It is not a durability guarantee — nothing here survives a
//! process restart.

use chrono::{DateTime, Utc};
use flowscript_core::NodeId;
use serde::{Deserialize, Serialize};

use crate::status::ExecutionStatus;

/// One recorded moment in an execution's lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum JournalEntry {
    /// The execution began.
    ExecutionStarted {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
    },
    /// The interpreter entered a node invocation.
    NodeEntered {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The node entered.
        node_id: NodeId,
    },
    /// A node invocation produced an edge.
    NodeExited {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The node that exited.
        node_id: NodeId,
        /// The edge name it produced.
        edge: String,
    },
    /// The state document was written to.
    StateChanged {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The path that was written.
        path: String,
    },
    /// The execution suspended at a human-pause node.
    Paused {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The node that paused.
        node_id: NodeId,
    },
    /// A pause was resolved and the execution resumed.
    Resumed {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The node that had paused.
        node_id: NodeId,
        /// The edge the resume call supplied.
        edge: String,
    },
    /// The execution reached a terminal state.
    Finished {
        /// When the event occurred.
        timestamp: DateTime<Utc>,
        /// The terminal status reached.
        status: ExecutionStatus,
    },
}

impl JournalEntry {
    /// When this entry was recorded.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ExecutionStarted { timestamp }
            | Self::NodeEntered { timestamp, .. }
            | Self::NodeExited { timestamp, .. }
            | Self::StateChanged { timestamp, .. }
            | Self::Paused { timestamp, .. }
            | Self::Resumed { timestamp, .. }
            | Self::Finished { timestamp, .. } => *timestamp,
        }
    }

    /// The node this entry concerns, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NodeEntered { node_id, .. }
            | Self::NodeExited { node_id, .. }
            | Self::Paused { node_id, .. }
            | Self::Resumed { node_id, .. } => Some(node_id),
            Self::ExecutionStarted { .. } | Self::StateChanged { .. } | Self::Finished { .. } => {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn execution_started_has_no_node() {
        let entry = JournalEntry::ExecutionStarted { timestamp: ts() };
        assert!(entry.node_id().is_none());
        assert_eq!(entry.timestamp(), ts());
    }

    #[test]
    fn node_entered_carries_node_id() {
        let entry = JournalEntry::NodeEntered {
            timestamp: ts(),
            node_id: NodeId::root(),
        };
        assert_eq!(entry.node_id(), Some(&NodeId::root()));
    }

    #[test]
    fn json_roundtrip_preserves_tag() {
        let entry = JournalEntry::NodeExited {
            timestamp: ts(),
            node_id: NodeId::root(),
            edge: "approved".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"event\":\"node_exited\""));
        let back: JournalEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.timestamp(), entry.timestamp());
        assert_eq!(back.node_id(), entry.node_id());
    }

    #[test]
    fn finished_entry_has_no_node() {
        let entry = JournalEntry::Finished {
            timestamp: ts(),
            status: ExecutionStatus::Completed,
        };
        assert!(entry.node_id().is_none());
    }
}
