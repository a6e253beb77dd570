#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Registry
//!
//! The [`Node`] trait and the concurrent [`NodeRegistry`] that resolves
//! workflow node invocations (by name) to implementations.

mod descriptor;
mod error;
mod node;
mod registry;

pub use descriptor::{NodeDescriptor, NodeKind};
pub use error::RegistryError;
pub use node::Node;
pub use registry::NodeRegistry;
