//! Errors from the node registry.

use thiserror::Error;

/// Failure registering a node.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A node with this name is already registered. Re-registration under
    /// the same name is only allowed after explicitly removing the
    /// existing one first.
    #[error("a node named `{0}` is already registered")]
    DuplicateName(String),
}
