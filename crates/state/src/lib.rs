#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript State
//!
//! The per-execution state document: a JSON value addressed by dotted,
//! bracket-indexed paths, with change notification for listeners.
//!
//! - [`StateManager`] — `get`/`set`/`update`/`snapshot`/`subscribe`.
//! - [`StateChange`] — a notification delivered to subscribers.
//! - [`StateError`] — `InvalidPath` / `TypeMismatch`.

mod error;
mod manager;
mod path;

pub use error::StateError;
pub use manager::{StateChange, StateManager};
