#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Execution
//!
//! Everything scoped to a single execution: its status state machine, its
//! runtime context, its pause/resume continuations, its audit journal, and
//! the record the Execution Manager holds for it.
//!
//! - [`ExecutionStatus`] / [`transition`] — the five-state machine and its
//!   legal transitions.
//! - [`ExecutionContext`] — the non-serializable runtime context threaded
//!   through node invocations.
//! - [`PendingPause`] / [`ResumeOutcome`] — the Human-Pause Controller's
//!   continuation, with idempotent resolution.
//! - [`JournalEntry`] — one entry in an execution's audit log.
//! - [`ExecutionRecord`] — status, current node, pauses, and journal for
//!   one execution.
//! - [`ExecutionError`] — the execution-local error taxonomy.

mod context;
mod error;
mod journal;
mod pause;
mod record;
mod status;
pub mod transition;

pub use context::ExecutionContext;
pub use error::ExecutionError;
pub use journal::JournalEntry;
pub use pause::{PendingPause, ResumeOutcome};
pub use record::ExecutionRecord;
pub use status::ExecutionStatus;
