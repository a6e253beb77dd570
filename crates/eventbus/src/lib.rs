#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # FlowScript Event Bus
//!
//! Per-execution publish/subscribe fan-out of lifecycle [`Event`]s, used by
//! observers (UIs, audit logs, webhooks) to watch a running execution
//! without being on the critical path of running it.

mod bus;
mod event;

pub use bus::{EventBus, Subscription, DEFAULT_SUBSCRIBER_BUFFER};
pub use event::Event;
