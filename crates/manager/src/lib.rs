#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Manager
//!
//! The engine's single public entry point: loads workflow definitions,
//! starts executions, tracks their status, resumes paused ones, cancels
//! running ones, lists them, and lets callers subscribe to their events.
//!
//! - [`ExecutionManager`] — the service object; construct one with
//!   [`EngineConfig`] and keep it (already `Arc`-wrapped) for the process's
//!   lifetime.
//! - [`EngineConfig`] — the handful of engine-wide tunables, with
//!   `FLOWSCRIPT_*` environment overrides.
//! - [`init_tracing`] — an opt-in convenience for embedders with no tracing
//!   subscriber of their own yet.
//! - [`ExecutionSnapshot`] / [`ListFilter`] — the read-only views `status`
//!   and `list` hand back.
//! - [`ManagerError`] — this crate's error taxonomy.

mod config;
mod error;
mod manager;
mod snapshot;
mod tracing_init;

pub use config::EngineConfig;
pub use error::ManagerError;
pub use manager::ExecutionManager;
pub use snapshot::{ExecutionSnapshot, ListFilter};
pub use tracing_init::init_tracing;
