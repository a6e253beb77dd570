//! Engine-wide configuration, independent of any single execution.

use flowscript_eventbus::DEFAULT_SUBSCRIBER_BUFFER;

/// Environment variable overriding [`EngineConfig::event_buffer_capacity`].
pub const EVENT_BUFFER_ENV: &str = "FLOWSCRIPT_EVENT_BUFFER_CAPACITY";
/// Environment variable overriding [`EngineConfig::default_pause_timeout_ms`].
pub const PAUSE_TIMEOUT_ENV: &str = "FLOWSCRIPT_DEFAULT_PAUSE_TIMEOUT_MS";
/// Environment variable overriding [`EngineConfig::max_concurrent_executions`].
pub const MAX_CONCURRENT_ENV: &str = "FLOWSCRIPT_MAX_CONCURRENT_EXECUTIONS";

/// Tunables for one [`crate::ExecutionManager`] instance.
///
/// Deliberately small next to a full configuration framework: three knobs,
/// each with an environment override, read once at startup.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-subscriber channel capacity on the event bus.
    pub event_buffer_capacity: usize,
    /// Timeout applied to a pause edge that doesn't carry its own `timeoutMs`.
    /// `None` means such pauses never time out on their own.
    pub default_pause_timeout_ms: Option<u64>,
    /// Upper bound on executions running at once. `None` means unbounded.
    pub max_concurrent_executions: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            event_buffer_capacity: DEFAULT_SUBSCRIBER_BUFFER,
            default_pause_timeout_ms: None,
            max_concurrent_executions: None,
        }
    }
}

impl EngineConfig {
    /// Start from [`Default::default`] and apply any `FLOWSCRIPT_*`
    /// environment variables that are set and parse.
    ///
    /// An unset variable keeps the default; a set-but-unparseable one is
    /// ignored with a logged warning rather than failing startup.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`] but sourcing values from an arbitrary lookup
    /// rather than the process environment. Kept internal: it exists so
    /// tests can exercise the override/parse logic without touching real
    /// environment variables (mutating those from edition 2024 onward
    /// requires `unsafe`, which this workspace forbids outright).
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = parse_env(EVENT_BUFFER_ENV, &lookup) {
            config.event_buffer_capacity = value;
        }
        if let Some(value) = parse_env(PAUSE_TIMEOUT_ENV, &lookup) {
            config.default_pause_timeout_ms = Some(value);
        }
        if let Some(value) = parse_env(MAX_CONCURRENT_ENV, &lookup) {
            config.max_concurrent_executions = Some(value);
        }
        config
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, lookup: impl Fn(&str) -> Option<String>) -> Option<T> {
    match lookup(name) {
        Some(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%name, %raw, "ignoring unparseable environment override");
                None
            }
        },
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults_have_no_timeout_and_default_buffer() {
        let config = EngineConfig::default();
        assert_eq!(config.event_buffer_capacity, DEFAULT_SUBSCRIBER_BUFFER);
        assert!(config.default_pause_timeout_ms.is_none());
        assert!(config.max_concurrent_executions.is_none());
    }

    #[test]
    fn from_env_reads_valid_overrides() {
        let vars: HashMap<&str, &str> =
            HashMap::from([(EVENT_BUFFER_ENV, "64"), (PAUSE_TIMEOUT_ENV, "5000")]);
        let config = EngineConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned()));
        assert_eq!(config.event_buffer_capacity, 64);
        assert_eq!(config.default_pause_timeout_ms, Some(5000));
    }

    #[test]
    fn from_env_ignores_garbage() {
        let vars: HashMap<&str, &str> = HashMap::from([(EVENT_BUFFER_ENV, "not-a-number")]);
        let config = EngineConfig::from_lookup(|name| vars.get(name).map(|v| (*v).to_owned()));
        assert_eq!(config.event_buffer_capacity, DEFAULT_SUBSCRIBER_BUFFER);
    }
}
