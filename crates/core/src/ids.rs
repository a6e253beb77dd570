//! Identifiers for FlowScript entities.
//!
//! `ExecutionId` and `WorkflowId` are random UUIDs using
//! [`domain-key`](https://crates.io/crates/domain-key)'s `Uuid<D>` wrapper,
//! giving compile-time type safety between the two. `NodeId` is not a UUID:
//! it names a *position* inside a workflow's flow-element tree (assigned
//! once, at load time, by the crate that compiles the tree), so the same
//! workflow run always reaches the same node under the same id, and a
//! pending pause keyed by `(ExecutionId, NodeId)` can be looked up again
//! after a resume call as long as the workflow definition is unchanged.

use std::fmt;
use std::str::FromStr;

use domain_key::define_uuid;
use serde::{Deserialize, Serialize};

define_uuid!(ExecutionIdDomain => ExecutionId);
define_uuid!(WorkflowIdDomain => WorkflowId);

/// Position of a node invocation within a workflow's flow-element tree.
///
/// Assigned once when the workflow is compiled from JSON into its
/// flow-element tree, as a dotted path of child indices (e.g.
/// `"0.1.branch:approved.0"`). Stable for the lifetime of a given workflow
/// definition, which is what lets a pending pause keyed by
/// `(ExecutionId, NodeId)` be looked up again after a resume call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// The path identifying the root of a workflow's flow tree.
    #[must_use]
    pub fn root() -> Self {
        Self(String::from("$"))
    }

    /// Derive a child id by appending a path segment.
    #[must_use]
    pub fn child(&self, segment: impl fmt::Display) -> Self {
        Self(format!("{}.{}", self.0, segment))
    }

    /// Borrow the raw path string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NodeId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_owned()))
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
