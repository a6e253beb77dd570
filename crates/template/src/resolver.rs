//! Recursive `{{ }}` resolution over a node's config object.

use std::collections::HashMap;

use flowscript_state::StateManager;
use serde_json::Value;
use tracing::debug;

use crate::lookup::resolve;

/// A `{{expression}}` token whose path did not resolve. The literal token
/// text is left in place in the output; this is reported as a signal to the
/// caller (typically surfaced as an event), never as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMiss {
    /// The expression text, exactly as written inside `{{ }}`.
    pub expression: String,
}

/// Resolve every template token in `config`, recursively, against loop
/// bindings (innermost scope first) and the execution's state document.
///
/// A string that is *exactly* one token (ignoring surrounding whitespace)
/// resolves to the token's native JSON type. A string containing a token
/// alongside other text resolves by substituting the token's stringified
/// value in place.
pub fn resolve_config(
    config: &Value,
    bindings: &[&HashMap<String, Value>],
    state: &StateManager,
) -> (Value, Vec<TemplateMiss>) {
    let mut misses = Vec::new();
    let resolved = resolve_value(config, bindings, state, &mut misses);
    (resolved, misses)
}

fn resolve_value(
    value: &Value,
    bindings: &[&HashMap<String, Value>],
    state: &StateManager,
    misses: &mut Vec<TemplateMiss>,
) -> Value {
    match value {
        Value::String(s) => resolve_string(s, bindings, state, misses),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| resolve_value(item, bindings, state, misses))
                .collect(),
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), resolve_value(value, bindings, state, misses)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn resolve_string(
    s: &str,
    bindings: &[&HashMap<String, Value>],
    state: &StateManager,
    misses: &mut Vec<TemplateMiss>,
) -> Value {
    let tokens = find_tokens(s);
    if tokens.is_empty() {
        return Value::String(s.to_owned());
    }

    if tokens.len() == 1 {
        let (range, expression) = &tokens[0];
        if s.trim() == &s[range.clone()] {
            return match resolve(expression, bindings, state) {
                Some(value) => value,
                None => {
                    debug!(expression, "template expression did not resolve");
                    misses.push(TemplateMiss {
                        expression: (*expression).to_owned(),
                    });
                    Value::String(s.to_owned())
                }
            };
        }
    }

    let mut out = String::with_capacity(s.len());
    let mut cursor = 0;
    for (range, expression) in tokens {
        out.push_str(&s[cursor..range.start]);
        match resolve(expression, bindings, state) {
            Some(value) => out.push_str(&stringify(&value)),
            None => {
                debug!(expression, "template expression did not resolve");
                misses.push(TemplateMiss {
                    expression: expression.to_owned(),
                });
                out.push_str(&s[range.clone()]);
            }
        }
        cursor = range.end;
    }
    out.push_str(&s[cursor..]);
    Value::String(out)
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Find every `{{ ... }}` occurrence, returning the byte range of the whole
/// token (braces included) alongside the trimmed expression text.
fn find_tokens(s: &str) -> Vec<(std::ops::Range<usize>, &str)> {
    let mut tokens = Vec::new();
    let mut search_from = 0;
    while let Some(start) = s[search_from..].find("{{") {
        let start = search_from + start;
        let Some(end) = s[start + 2..].find("}}") else {
            break;
        };
        let end = start + 2 + end;
        let expression = s[start + 2..end].trim();
        tokens.push((start..end + 2, expression));
        search_from = end + 2;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn no_bindings() -> Vec<&'static HashMap<String, Value>> {
        Vec::new()
    }

    #[test]
    fn plain_string_passes_through() {
        let state = StateManager::new(json!({}));
        let (resolved, misses) = resolve_config(&json!("hello"), &no_bindings(), &state);
        assert_eq!(resolved, json!("hello"));
        assert!(misses.is_empty());
    }

    #[test]
    fn whole_string_token_resolves_to_native_type() {
        let state = StateManager::new(json!({"amount": 42}));
        let (resolved, misses) = resolve_config(&json!("{{state.amount}}"), &no_bindings(), &state);
        assert_eq!(resolved, json!(42));
        assert!(misses.is_empty());
    }

    #[test]
    fn embedded_token_substitutes_stringified_value() {
        let state = StateManager::new(json!({"name": "Ada"}));
        let (resolved, misses) =
            resolve_config(&json!("hello {{state.name}}!"), &no_bindings(), &state);
        assert_eq!(resolved, json!("hello Ada!"));
        assert!(misses.is_empty());
    }

    #[test]
    fn missing_path_leaves_token_unchanged_and_reports_a_miss() {
        let state = StateManager::new(json!({}));
        let (resolved, misses) =
            resolve_config(&json!("{{state.missing}}"), &no_bindings(), &state);
        assert_eq!(resolved, json!("{{state.missing}}"));
        assert_eq!(
            misses,
            vec![TemplateMiss {
                expression: "state.missing".to_owned()
            }]
        );
    }

    #[test]
    fn recurses_into_nested_objects_and_arrays() {
        let state = StateManager::new(json!({"id": 7}));
        let config = json!({
            "headers": {"x-id": "{{state.id}}"},
            "tags": ["static", "{{state.id}}"],
        });
        let (resolved, misses) = resolve_config(&config, &no_bindings(), &state);
        assert_eq!(
            resolved,
            json!({
                "headers": {"x-id": 7},
                "tags": ["static", "7"],
            })
        );
        assert!(misses.is_empty());
    }

    #[test]
    fn resolves_loop_binding_over_state() {
        let state = StateManager::new(json!({}));
        let scope = HashMap::from([("item".to_owned(), json!({"sku": "X1"}))]);
        let bindings: Vec<&HashMap<String, Value>> = vec![&scope];
        let (resolved, misses) = resolve_config(&json!("{{item.sku}}"), &bindings, &state);
        assert_eq!(resolved, json!("X1"));
        assert!(misses.is_empty());
    }

    #[test]
    fn multiple_tokens_in_one_string() {
        let state = StateManager::new(json!({"a": 1, "b": 2}));
        let (resolved, _) =
            resolve_config(&json!("{{state.a}}-{{state.b}}"), &no_bindings(), &state);
        assert_eq!(resolved, json!("1-2"));
    }
}
