//! The two built-in loop controllers: `whileCondition` and `forEach`.
//!
//! These are not dispatched through the node registry like ordinary nodes —
//! they need a mutable borrow of the context to push and pop loop bindings
//! between iterations, which the `Node` trait's `&ExecutionContext` can't
//! give them. They're still full citizens of the flow-element grammar (a
//! loop's `controller` position only accepts one of these two names), just
//! built into the interpreter rather than the registry.

use std::collections::HashMap;

use flowscript_core::NodeId;
use flowscript_execution::ExecutionError;
use serde_json::Value;

/// Name a loop controller must use to get `whileCondition` semantics.
pub const WHILE_CONDITION: &str = "whileCondition";
/// Name a loop controller must use to get `forEach` semantics.
pub const FOR_EACH: &str = "forEach";

/// Evaluate a `whileCondition` controller's `condition` field against an
/// already template-resolved config.
///
/// A string left unresolved by the template step (still `{{...}}`) is
/// treated as falsy, same as any other non-empty string would be truthy —
/// the resolver already reports a `TemplateMiss` event for that case.
pub fn evaluate_while_condition(config: &Value, node_id: &NodeId) -> Result<bool, ExecutionError> {
    let condition = config.get("condition").ok_or_else(|| ExecutionError::ConfigInvalid {
        node_id: node_id.clone(),
        reason: "whileCondition requires a `condition` field".to_owned(),
    })?;
    Ok(is_truthy(condition))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Resolve a `forEach` controller's `items` field (already template-resolved)
/// into the array to iterate, and the binding name its `as` field declares.
pub fn for_each_plan<'a>(
    config: &'a Value,
    node_id: &NodeId,
) -> Result<(&'a [Value], &'a str), ExecutionError> {
    let items = config
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| ExecutionError::ConfigInvalid {
            node_id: node_id.clone(),
            reason: "forEach requires an `items` array".to_owned(),
        })?;
    let as_name = config
        .get("as")
        .and_then(Value::as_str)
        .ok_or_else(|| ExecutionError::ConfigInvalid {
            node_id: node_id.clone(),
            reason: "forEach requires an `as` binding name".to_owned(),
        })?;
    Ok((items, as_name))
}

/// Bindings for a single `forEach` iteration: `as -> item`, `as + "Index" -> i`.
#[must_use]
pub fn for_each_bindings(as_name: &str, index: usize, item: &Value) -> HashMap<String, Value> {
    HashMap::from([
        (as_name.to_owned(), item.clone()),
        (format!("{as_name}Index"), Value::from(index)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truthy_values() {
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(1)));
        assert!(is_truthy(&json!("x")));
        assert!(is_truthy(&json!([1])));
        assert!(is_truthy(&json!({"a": 1})));
    }

    #[test]
    fn falsy_values() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
    }

    #[test]
    fn while_condition_requires_condition_field() {
        let err = evaluate_while_condition(&json!({}), &NodeId::root()).unwrap_err();
        assert!(matches!(err, ExecutionError::ConfigInvalid { .. }));
    }

    #[test]
    fn while_condition_reads_truthiness() {
        assert!(evaluate_while_condition(&json!({"condition": true}), &NodeId::root()).unwrap());
        assert!(!evaluate_while_condition(&json!({"condition": false}), &NodeId::root()).unwrap());
    }

    #[test]
    fn for_each_plan_extracts_items_and_binding_name() {
        let (items, as_name) =
            for_each_plan(&json!({"items": ["a", "b"], "as": "x"}), &NodeId::root()).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(as_name, "x");
    }

    #[test]
    fn for_each_plan_rejects_missing_items() {
        let err = for_each_plan(&json!({"as": "x"}), &NodeId::root()).unwrap_err();
        assert!(matches!(err, ExecutionError::ConfigInvalid { .. }));
    }

    #[test]
    fn for_each_bindings_sets_item_and_index() {
        let bindings = for_each_bindings("x", 2, &json!("c"));
        assert_eq!(bindings.get("x"), Some(&json!("c")));
        assert_eq!(bindings.get("xIndex"), Some(&json!(2)));
    }
}
