//! Resolving one dotted expression path against loop bindings or state.

use std::collections::HashMap;

use flowscript_state::StateManager;
use serde_json::Value;

/// Resolve `expression` (the trimmed text between `{{` and `}}`) against the
/// given loop-local bindings, innermost scope first, falling back to the
/// execution's state document when no binding's root matches. A leading
/// `state.` (or a bare `state`) is merely stripped before addressing the
/// document — it never gates whether the document is consulted, since a
/// bare path with no matching binding (e.g. `request.amount`) addresses
/// the state document the same as `state.request.amount` would.
///
/// Returns `None` on any failure to resolve — unknown binding, unknown
/// state path, or a path segment that doesn't apply to the value found —
/// callers treat a miss as a signal, never a hard error.
pub fn resolve(
    expression: &str,
    bindings: &[&HashMap<String, Value>],
    state: &StateManager,
) -> Option<Value> {
    let expression = expression.trim();
    if let Some(state_path) = expression.strip_prefix("state.") {
        return state.get(state_path).ok();
    }
    if expression == "state" {
        return state.get("").ok();
    }

    let mut segments = expression.split('.');
    let root = segments.next()?;
    for scope in bindings {
        if let Some(value) = scope.get(root) {
            return segments.try_fold(value.clone(), |current, segment| {
                get_segment(&current, segment)
            });
        }
    }
    state.get(expression).ok()
}

fn get_segment(value: &Value, segment: &str) -> Option<Value> {
    match value {
        Value::Object(map) => map.get(segment).cloned(),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i).cloned()),
        _ => None,
    }
}
