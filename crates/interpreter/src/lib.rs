#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Interpreter
//!
//! Walks a compiled [`flowscript_workflow::FlowElement`] tree, dispatching
//! node invocations through the node registry, resolving `{{ }}` templates
//! before each call, driving the two built-in loop controllers, and
//! suspending on pause edges until an external resume call (or a timeout)
//! fulfills the continuation.

mod interpreter;
mod loops;

pub use interpreter::{Interpreter, PAUSE_EDGE, SENTINEL_EDGE, TIMEOUT_EDGE};
pub use loops::{FOR_EACH, WHILE_CONDITION};
