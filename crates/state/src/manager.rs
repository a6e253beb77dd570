//! The State Manager: a path-addressed JSON document with change notification.

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use crate::error::StateError;
use crate::path::{self, Segment};

/// Capacity of the change-notification broadcast channel. Generous because
/// a lagging subscriber only misses intermediate values, never the final
/// one — `recv` surfaces a `Lagged` error the caller can treat as "reread
/// the snapshot".
const CHANGE_CHANNEL_CAPACITY: usize = 256;

/// One write to the state document, delivered to subscribers after the
/// write is visible to subsequent reads.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChange {
    /// Path that was written.
    pub path: String,
    /// The value now at that path.
    pub value: Value,
}

/// A JSON document addressable by dotted/bracketed paths, with
/// broadcast-style change notification.
///
/// One `StateManager` belongs to a single execution. Reads and writes take
/// a short-lived lock; the lock is released before subscribers are
/// notified, so a subscriber never observes a change before a concurrent
/// `get` of the same path would.
#[derive(Debug)]
pub struct StateManager {
    document: RwLock<Value>,
    changes: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a state manager seeded with the given initial document.
    #[must_use]
    pub fn new(initial: Value) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            document: RwLock::new(initial),
            changes,
        }
    }

    /// Read the value at `path`. An empty path returns the whole document.
    pub fn get(&self, path: &str) -> Result<Value, StateError> {
        let segments = path::parse(path)?;
        let document = self.document.read();
        navigate(&document, &segments, path).cloned()
    }

    /// Write `value` at `path`, creating missing object keys along the way.
    /// An array index equal to the array's current length appends; any
    /// other index past the end, or into a non-container, is an error
    /// rather than silently extending it.
    pub fn set(&self, path: &str, value: Value) -> Result<(), StateError> {
        let segments = path::parse(path)?;
        {
            let mut document = self.document.write();
            write_at(&mut document, &segments, value.clone(), path)?;
        }
        trace!(path, "state write");
        // Independent of whether anyone is listening; `send` only errors
        // when the channel has zero receivers, which is a normal state for
        // an execution nobody is watching.
        let _ = self.changes.send(StateChange {
            path: path.to_owned(),
            value,
        });
        Ok(())
    }

    /// Read-modify-write `path` atomically with respect to other callers of
    /// `set`/`update` on this manager.
    pub fn update(
        &self,
        path: &str,
        f: impl FnOnce(&Value) -> Value,
    ) -> Result<Value, StateError> {
        let segments = path::parse(path)?;
        let new_value = {
            let mut document = self.document.write();
            let current = navigate(&document, &segments, path)?.clone();
            let updated = f(&current);
            write_at(&mut document, &segments, updated.clone(), path)?;
            updated
        };
        let _ = self.changes.send(StateChange {
            path: path.to_owned(),
            value: new_value.clone(),
        });
        Ok(new_value)
    }

    /// A full, consistent copy of the document at this instant.
    #[must_use]
    pub fn snapshot(&self) -> Value {
        self.document.read().clone()
    }

    /// Subscribe to every subsequent write. The subscriber starts receiving
    /// from the point of subscription; it does not see history.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }
}

fn navigate<'a>(
    root: &'a Value,
    segments: &[Segment],
    path: &str,
) -> Result<&'a Value, StateError> {
    let mut current = root;
    for segment in segments {
        current = match (segment, current) {
            (Segment::Key(key), Value::Object(map)) => {
                map.get(key).ok_or_else(|| StateError::InvalidPath {
                    path: path.to_owned(),
                })?
            }
            (Segment::Key(_), other) => {
                return Err(StateError::TypeMismatch {
                    path: path.to_owned(),
                    expected: "an object",
                    found: type_name(other),
                });
            }
            (Segment::Index(index), Value::Array(items)) => {
                items.get(*index).ok_or_else(|| StateError::InvalidPath {
                    path: path.to_owned(),
                })?
            }
            (Segment::Index(_), other) => {
                return Err(StateError::TypeMismatch {
                    path: path.to_owned(),
                    expected: "an array",
                    found: type_name(other),
                });
            }
        };
    }
    Ok(current)
}

fn write_at(
    root: &mut Value,
    segments: &[Segment],
    value: Value,
    path: &str,
) -> Result<(), StateError> {
    let Some((last, ancestors)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for segment in ancestors {
        current = match segment {
            Segment::Key(key) => {
                if current.is_null() {
                    *current = Value::Object(serde_json::Map::new());
                }
                let Value::Object(map) = current else {
                    return Err(StateError::TypeMismatch {
                        path: path.to_owned(),
                        expected: "an object",
                        found: type_name(current),
                    });
                };
                map.entry(key.clone())
                    .or_insert_with(|| Value::Object(serde_json::Map::new()))
            }
            Segment::Index(index) => {
                let Value::Array(items) = current else {
                    return Err(StateError::TypeMismatch {
                        path: path.to_owned(),
                        expected: "an array",
                        found: type_name(current),
                    });
                };
                index_for_write(items, *index, path)?
            }
        };
    }

    match last {
        Segment::Key(key) => {
            if current.is_null() {
                *current = Value::Object(serde_json::Map::new());
            }
            let Value::Object(map) = current else {
                return Err(StateError::TypeMismatch {
                    path: path.to_owned(),
                    expected: "an object",
                    found: type_name(current),
                });
            };
            map.insert(key.clone(), value);
        }
        Segment::Index(index) => {
            let Value::Array(items) = current else {
                return Err(StateError::TypeMismatch {
                    path: path.to_owned(),
                    expected: "an array",
                    found: type_name(current),
                });
            };
            *index_for_write(items, *index, path)? = value;
        }
    }
    Ok(())
}

/// A mutable slot at `index`, pushing a new `null` element first if `index`
/// is exactly the array's current length (an append). Any other index past
/// the end is out of bounds.
fn index_for_write<'a>(
    items: &'a mut Vec<Value>,
    index: usize,
    path: &str,
) -> Result<&'a mut Value, StateError> {
    if index == items.len() {
        items.push(Value::Null);
    }
    items.get_mut(index).ok_or_else(|| StateError::InvalidPath {
        path: path.to_owned(),
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
