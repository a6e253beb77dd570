//! The named, lazily-computed outcome of a node invocation.

use std::fmt;
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde_json::Value;

type DataFactory = Box<dyn FnOnce() -> Value + Send>;

/// The outcome of one node invocation: a name the interpreter routes on, and
/// data the node may attach to it.
///
/// The data is lazy: constructed only the first time something actually
/// reads it, so branches that never touch a given arm's edge data never pay
/// for building it, and side-effectful factories are never fired
/// speculatively. Reading is idempotent — the first call invokes the
/// factory and caches the result; later calls return the cached value.
pub struct Edge {
    name: String,
    factory: Mutex<Option<DataFactory>>,
    cached: OnceLock<Value>,
}

impl Edge {
    /// Create an edge whose data is computed lazily by `factory`.
    pub fn new(name: impl Into<String>, factory: impl FnOnce() -> Value + Send + 'static) -> Self {
        Self {
            name: name.into(),
            factory: Mutex::new(Some(Box::new(factory))),
            cached: OnceLock::new(),
        }
    }

    /// Create an edge carrying no data (`data()` resolves to `Value::Null`).
    #[must_use]
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, || Value::Null)
    }

    /// Create an edge whose data is already available.
    ///
    /// Still lazy in the sense that no further work happens on read, but the
    /// value was already computed eagerly by the caller — use [`Edge::new`]
    /// to defer the computation itself.
    #[must_use]
    pub fn immediate(name: impl Into<String>, value: Value) -> Self {
        Self::new(name, move || value)
    }

    /// The edge's name, used by the interpreter to choose the next element.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolve and return the edge's data, computing it on first access.
    pub fn data(&self) -> Value {
        if let Some(v) = self.cached.get() {
            return v.clone();
        }
        let factory = self.factory.lock().take();
        let value = match factory {
            Some(f) => f(),
            // Another caller already took the factory and is computing (or
            // has computed) the value; spin until it lands in the cache.
            None => loop {
                if let Some(v) = self.cached.get() {
                    break v.clone();
                }
                std::hint::spin_loop();
            },
        };
        let _ = self.cached.set(value.clone());
        value
    }

    /// Returns `true` if the data factory has already been invoked.
    #[must_use]
    pub fn is_data_resolved(&self) -> bool {
        self.cached.get().is_some()
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("name", &self.name)
            .field("data_resolved", &self.is_data_resolved())
            .finish()
    }
}
