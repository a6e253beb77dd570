//! Runtime context threaded through a single node invocation.

use std::collections::HashMap;
use std::sync::Arc;

use flowscript_core::ExecutionId;
use flowscript_state::StateManager;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::ExecutionError;

/// Runtime context for one execution. Not serializable — it holds the
/// state document handle, the loop-binding stack, and a cancellation
/// token. Persisted/inspectable state lives on
/// [`crate::ExecutionRecord`] instead.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Identifier of the execution this context belongs to.
    pub execution_id: ExecutionId,
    /// Shared handle to the execution's state document.
    pub state: Arc<StateManager>,
    /// Loop-local variable bindings, outermost first. A nested loop's
    /// bindings are pushed on top; resolution walks this from the back so
    /// the innermost loop shadows outer ones with the same binding name.
    bindings: Vec<HashMap<String, Value>>,
    /// Cooperative cancellation for this execution.
    pub cancellation: CancellationToken,
}

impl ExecutionContext {
    /// Create a context for a freshly started execution.
    #[must_use]
    pub fn new(execution_id: ExecutionId, state: Arc<StateManager>) -> Self {
        Self {
            execution_id,
            state,
            bindings: Vec::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Enter a loop iteration, pushing its bindings as the new innermost
    /// scope. Returns a guard that pops the scope on drop.
    pub fn push_bindings(&mut self, bindings: HashMap<String, Value>) {
        self.bindings.push(bindings);
    }

    /// Leave the innermost loop's scope.
    pub fn pop_bindings(&mut self) {
        self.bindings.pop();
    }

    /// Binding scopes ordered innermost-first, as the template resolver
    /// expects.
    #[must_use]
    pub fn bindings_innermost_first(&self) -> Vec<&HashMap<String, Value>> {
        self.bindings.iter().rev().collect()
    }

    /// Returns an error if cancellation has been requested.
    pub fn check_cancelled(&self) -> Result<(), ExecutionError> {
        if self.cancellation.is_cancelled() {
            Err(ExecutionError::Cancelled)
        } else {
            Ok(())
        }
    }
}
