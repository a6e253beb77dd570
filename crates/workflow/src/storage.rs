//! In-memory registry of loaded workflow definitions.

use std::sync::Arc;

use dashmap::DashMap;
use flowscript_core::WorkflowId;
use serde_json::Value;
use tracing::info;

use crate::definition::WorkflowDefinition;
use crate::error::WorkflowError;

/// Holds parsed workflow definitions, keyed by [`WorkflowId`].
#[derive(Debug, Default)]
pub struct WorkflowStorage {
    definitions: DashMap<WorkflowId, Arc<WorkflowDefinition>>,
}

impl WorkflowStorage {
    /// Create an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and store a workflow definition from raw JSON, returning its id.
    pub fn load(&self, raw: &Value) -> Result<WorkflowId, WorkflowError> {
        let definition = WorkflowDefinition::from_json(raw)?;
        let id = definition.id;
        info!(workflow_id = %id, name = %definition.name, "loaded workflow definition");
        self.definitions.insert(id, Arc::new(definition));
        Ok(id)
    }

    /// Look up a previously loaded definition.
    #[must_use]
    pub fn get(&self, id: &WorkflowId) -> Option<Arc<WorkflowDefinition>> {
        self.definitions.get(id).map(|entry| entry.clone())
    }

    /// Whether a definition with this id is stored.
    #[must_use]
    pub fn contains(&self, id: &WorkflowId) -> bool {
        self.definitions.contains_key(id)
    }

    /// List every stored definition.
    #[must_use]
    pub fn list(&self) -> Vec<Arc<WorkflowDefinition>> {
        self.definitions.iter().map(|entry| entry.clone()).collect()
    }

    /// Remove a stored definition, returning it if present.
    pub fn remove(&self, id: &WorkflowId) -> Option<Arc<WorkflowDefinition>> {
        self.definitions.remove(id).map(|(_, definition)| definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "name": "approval-flow",
            "initialState": {},
            "nodes": {"checkAmount": {}},
        })
    }

    #[test]
    fn load_then_get_roundtrips() {
        let storage = WorkflowStorage::new();
        let id = storage.load(&sample()).unwrap();
        let definition = storage.get(&id).unwrap();
        assert_eq!(definition.name, "approval-flow");
    }

    #[test]
    fn get_unknown_id_is_none() {
        let storage = WorkflowStorage::new();
        assert!(storage.get(&WorkflowId::v4()).is_none());
    }

    #[test]
    fn list_reflects_loaded_definitions() {
        let storage = WorkflowStorage::new();
        storage.load(&sample()).unwrap();
        storage.load(&sample()).unwrap();
        assert_eq!(storage.list().len(), 2);
    }

    #[test]
    fn remove_drops_the_entry() {
        let storage = WorkflowStorage::new();
        let id = storage.load(&sample()).unwrap();
        assert!(storage.remove(&id).is_some());
        assert!(storage.get(&id).is_none());
    }

    #[test]
    fn invalid_definition_is_not_stored() {
        let storage = WorkflowStorage::new();
        let bad = json!({"name": "broken", "initialState": {}});
        assert!(storage.load(&bad).is_err());
        assert!(storage.list().is_empty());
    }
}
