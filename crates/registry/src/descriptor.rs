//! Static metadata describing a registered node.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What a node does for the interpreter's purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Ordinary side-effecting work (HTTP calls, data transforms, etc.).
    Action,
    /// Suspends the execution until a human supplies a resume edge — the
    /// node the Human-Pause Controller drives.
    Human,
    /// Flow control built into the engine itself (`whileCondition`,
    /// `forEach`), usable only as a loop's controller.
    Control,
}

/// Static description of a node, independent of any particular invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescriptor {
    /// Name the node is registered under; matches the key used in a
    /// workflow's node-invocation JSON.
    pub name: String,
    /// What kind of node this is.
    pub kind: NodeKind,
    /// Minimal config validation: the config object's required top-level
    /// keys. `None` means no validation is performed.
    pub required_config_keys: Option<Vec<String>>,
    /// For [`NodeKind::Human`] nodes, the edge name a resume continues on.
    /// Defaults to `"submitted"` when unset; irrelevant for other kinds.
    pub resume_edge: Option<String>,
}

impl NodeDescriptor {
    /// Describe an action node with no config validation.
    #[must_use]
    pub fn action(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Action,
            required_config_keys: None,
            resume_edge: None,
        }
    }

    /// Describe a human-pause node.
    #[must_use]
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Human,
            required_config_keys: None,
            resume_edge: None,
        }
    }

    /// Describe a built-in loop controller.
    #[must_use]
    pub fn control(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Control,
            required_config_keys: None,
            resume_edge: None,
        }
    }

    /// Require the given top-level keys to be present in the config object.
    #[must_use]
    pub fn requiring(mut self, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.required_config_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Set the edge name a resume of this (human) node continues on.
    #[must_use]
    pub fn resuming_with(mut self, edge: impl Into<String>) -> Self {
        self.resume_edge = Some(edge.into());
        self
    }

    /// The edge name a resume of this node continues on, defaulting to
    /// `"submitted"`.
    #[must_use]
    pub fn resume_edge(&self) -> &str {
        self.resume_edge.as_deref().unwrap_or("submitted")
    }

    /// Validate a config object's shape against `required_config_keys`.
    ///
    /// This is intentionally shallow — a present-key check, not a JSON
    /// Schema validator — matching the template resolver's equally minimal
    /// scope.
    pub fn validate_config(&self, config: &Value) -> Result<(), String> {
        let Some(required) = &self.required_config_keys else {
            return Ok(());
        };
        let Value::Object(fields) = config else {
            return Err("config must be a JSON object".to_owned());
        };
        for key in required {
            if !fields.contains_key(key) {
                return Err(format!("missing required config key `{key}`"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn no_required_keys_always_validates() {
        let descriptor = NodeDescriptor::action("noop");
        assert!(descriptor.validate_config(&json!({})).is_ok());
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let descriptor = NodeDescriptor::action("sendEmail").requiring(["to"]);
        let err = descriptor.validate_config(&json!({})).unwrap_err();
        assert!(err.contains("to"));
    }

    #[test]
    fn present_required_keys_validate() {
        let descriptor = NodeDescriptor::action("sendEmail").requiring(["to", "subject"]);
        assert!(descriptor
            .validate_config(&json!({"to": "a@b.com", "subject": "hi"}))
            .is_ok());
    }

    #[test]
    fn non_object_config_is_rejected_when_keys_are_required() {
        let descriptor = NodeDescriptor::action("x").requiring(["a"]);
        assert!(descriptor.validate_config(&json!("not an object")).is_err());
    }

    #[test]
    fn kind_constructors_set_expected_kind() {
        assert_eq!(NodeDescriptor::action("a").kind, NodeKind::Action);
        assert_eq!(NodeDescriptor::human("b").kind, NodeKind::Human);
        assert_eq!(NodeDescriptor::control("c").kind, NodeKind::Control);
    }
}
