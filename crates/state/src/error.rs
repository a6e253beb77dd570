//! Errors raised by the state document.

use thiserror::Error;

/// Failure reading or writing the state document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The path string could not be parsed, or addresses something that
    /// doesn't exist and can't be created (e.g. an out-of-bounds array
    /// index, or a missing intermediate array).
    #[error("invalid state path: `{path}`")]
    InvalidPath {
        /// The offending path.
        path: String,
    },

    /// A path segment expected one JSON type but found another (e.g.
    /// indexing into a string, or a key access on an array).
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// The path at which the mismatch occurred.
        path: String,
        /// Description of what was expected.
        expected: &'static str,
        /// Description of what was actually there.
        found: &'static str,
    },
}
