//! Errors produced while parsing and validating a workflow definition.

use thiserror::Error;

/// Failure while turning raw JSON into a [`crate::WorkflowDefinition`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The top-level document is not a JSON object.
    #[error("workflow definition must be a JSON object")]
    NotAnObject,

    /// A required field is missing.
    #[error("workflow definition is missing required field `{0}`")]
    MissingField(&'static str),

    /// A field is present but has the wrong JSON type.
    #[error("field `{field}` must be {expected}")]
    WrongFieldType {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the expected shape.
        expected: &'static str,
    },

    /// The `id` field is not a valid UUID.
    #[error("workflow `id` is not a valid UUID: {0}")]
    InvalidId(serde_json::Error),

    /// A value at the given path is shaped like none of the four flow
    /// element forms (node invocation, `branch`, `loop`, sequence).
    #[error("flow element at `{path}` is not a node invocation, branch, loop, or sequence")]
    UnrecognizedElement {
        /// Path of the offending element, in [`flowscript_core::NodeId`] form.
        path: String,
    },

    /// A node invocation's config value was not a JSON object.
    #[error("node invocation at `{path}` must map to a config object")]
    InvalidNodeConfig {
        /// Path of the offending element.
        path: String,
    },

    /// A `branch` wrapper's value was not a two-element `[condition, branchMap]` array.
    #[error("branch at `{path}` must be a two-element array of [condition, branchMap]")]
    InvalidBranchShape {
        /// Path of the offending element.
        path: String,
    },

    /// A branch map had no arms and no catch-all.
    #[error("branch at `{path}` has an empty branch map")]
    EmptyBranchMap {
        /// Path of the offending element.
        path: String,
    },

    /// A `loop` wrapper's value was not a two-element `[controller, body]` array.
    #[error("loop at `{path}` must be a two-element array of [controller, body]")]
    InvalidLoopShape {
        /// Path of the offending element.
        path: String,
    },

    /// A loop's controller element was not a bare node invocation.
    #[error("loop controller at `{path}` must be a node invocation")]
    InvalidLoopController {
        /// Path of the offending element.
        path: String,
    },
}
