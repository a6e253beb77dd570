//! Parsing a complete workflow definition from JSON.

use flowscript_core::{NodeId, WorkflowId};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::WorkflowError;
use crate::flow::FlowElement;

/// A parsed, compiled workflow: metadata plus the flow tree the interpreter
/// runs against.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowDefinition {
    /// Unique identifier. Generated if the JSON document omits `id`.
    pub id: WorkflowId,
    /// Human-readable name.
    pub name: String,
    /// Optional human-readable description.
    pub description: Option<String>,
    /// Optional free-form version string.
    pub version: Option<String>,
    /// The document the State Manager initializes an execution's state from.
    pub initial_state: Value,
    /// The compiled flow tree.
    pub flow: FlowElement,
    /// Top-level JSON keys this crate doesn't interpret, preserved verbatim.
    pub metadata: Map<String, Value>,
}

const KNOWN_FIELDS: &[&str] = &["id", "name", "description", "version", "initialState", "nodes"];

impl WorkflowDefinition {
    /// Parse and compile a workflow definition from a raw JSON document.
    pub fn from_json(raw: &Value) -> Result<Self, WorkflowError> {
        let Value::Object(fields) = raw else {
            return Err(WorkflowError::NotAnObject);
        };

        let id = match fields.get("id") {
            Some(value) => {
                serde_json::from_value(value.clone()).map_err(WorkflowError::InvalidId)?
            }
            None => WorkflowId::v4(),
        };

        let name = match fields.get("name") {
            Some(Value::String(name)) => name.clone(),
            Some(_) => {
                return Err(WorkflowError::WrongFieldType {
                    field: "name",
                    expected: "a string",
                });
            }
            None => return Err(WorkflowError::MissingField("name")),
        };

        let description = match fields.get("description") {
            Some(Value::String(value)) => Some(value.clone()),
            Some(Value::Null) | None => None,
            Some(_) => {
                return Err(WorkflowError::WrongFieldType {
                    field: "description",
                    expected: "a string",
                });
            }
        };

        let version = match fields.get("version") {
            Some(Value::String(value)) => Some(value.clone()),
            Some(Value::Null) | None => None,
            Some(_) => {
                return Err(WorkflowError::WrongFieldType {
                    field: "version",
                    expected: "a string",
                });
            }
        };

        let initial_state = fields
            .get("initialState")
            .cloned()
            .ok_or(WorkflowError::MissingField("initialState"))?;

        let nodes = fields
            .get("nodes")
            .ok_or(WorkflowError::MissingField("nodes"))?;
        let flow = FlowElement::compile(nodes, NodeId::root())?;

        let metadata = fields
            .iter()
            .filter(|(key, _)| !KNOWN_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        Ok(Self {
            id,
            name,
            description,
            version,
            initial_state,
            flow,
            metadata,
        })
    }
}
