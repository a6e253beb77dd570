#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Workflow
//!
//! Workflow definitions: the flow-element tree, its JSON grammar, and an
//! in-memory store for loaded definitions.
//!
//! - [`FlowElement`] — node invocation / branch / loop / sequence, compiled
//!   once from raw JSON into a tagged tree with stable node ids.
//! - [`WorkflowDefinition`] — a parsed definition plus its metadata.
//! - [`WorkflowStorage`] — a concurrent map of loaded definitions.

mod definition;
mod error;
mod flow;
mod storage;

pub use definition::WorkflowDefinition;
pub use error::WorkflowError;
pub use flow::FlowElement;
pub use storage::WorkflowStorage;
