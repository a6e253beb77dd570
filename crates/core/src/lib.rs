#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Core
//!
//! Identifiers and the smallest shared value types for the FlowScript
//! workflow engine. Every other `flowscript-*` crate depends on this one;
//! it depends on nothing else in the workspace.
//!
//! - [`ExecutionId`] / [`WorkflowId`] — strongly-typed UUIDs.
//! - [`NodeId`] — a stable path into a workflow's flow-element tree.
//! - [`Edge`] — the named, lazily-computed outcome of a node invocation.

mod edge;
mod ids;

pub use edge::Edge;
pub use ids::{ExecutionId, NodeId, WorkflowId};
