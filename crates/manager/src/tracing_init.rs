//! Minimal tracing setup for embedders that don't already have their own.

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber driven by `RUST_LOG` (defaulting to `info`
/// when unset). Safe to call more than once per process; later calls are a
/// no-op.
///
/// This intentionally doesn't reproduce a full observability stack — no
/// structured JSON output, no OTLP exporter, no log rotation. Embedders
/// wanting those should install their own `tracing_subscriber::Registry`
/// before starting the manager instead of calling this.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
