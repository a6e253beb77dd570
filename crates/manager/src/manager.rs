//! The Execution Manager: starts, tracks, resumes, cancels, and lists
//! workflow executions, one background task per execution.

use std::sync::Arc;

use dashmap::DashMap;
use flowscript_core::{ExecutionId, NodeId, WorkflowId};
use flowscript_eventbus::{Event, EventBus, Subscription};
use flowscript_execution::{
    ExecutionContext, ExecutionError, ExecutionRecord, ExecutionStatus, ResumeOutcome,
};
use flowscript_interpreter::Interpreter;
use flowscript_registry::NodeRegistry;
use flowscript_state::StateManager;
use flowscript_workflow::{WorkflowDefinition, WorkflowStorage};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::EngineConfig;
use crate::error::ManagerError;
use crate::snapshot::{self, ExecutionSnapshot, ListFilter};

/// Ties workflow storage, the node registry, the event bus, and the
/// interpreter together into the engine's one public entry point.
///
/// Each [`ExecutionManager::start`] call spawns a single `tokio` task that
/// walks the flow tree from root to a terminal status; there is no
/// per-level fan-out like a DAG engine would use, because a FlowScript
/// execution is one logical thread of control. Many executions run
/// concurrently simply because many tasks are spawned, not because any one
/// of them is internally parallel.
pub struct ExecutionManager {
    workflows: WorkflowStorage,
    registry: NodeRegistry,
    events: EventBus,
    records: DashMap<ExecutionId, Arc<ExecutionRecord>>,
    config: EngineConfig,
}

impl ExecutionManager {
    /// Create a manager, already wrapped in the `Arc` every `start` call
    /// needs in order to spawn a task that outlives the call itself.
    #[must_use]
    pub fn new(config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            workflows: WorkflowStorage::new(),
            registry: NodeRegistry::new(),
            events: EventBus::with_buffer_size(config.event_buffer_capacity),
            records: DashMap::new(),
            config,
        })
    }

    /// The node registry nodes should be registered on before any workflow
    /// referencing them is started.
    #[must_use]
    pub fn node_registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// Parse and store a workflow definition, returning its id.
    pub fn load_workflow(&self, raw: &Value) -> Result<WorkflowId, ManagerError> {
        Ok(self.workflows.load(raw)?)
    }

    /// Start a new execution of a loaded workflow, returning immediately
    /// with its id; the flow tree runs to completion on a spawned task.
    ///
    /// `input` is shallow-merged over the workflow's `initialState`: a key
    /// present in both wins from `input`, so callers can override defaults
    /// without restating the whole document.
    ///
    /// Takes `Arc<Self>` by value because the spawned task needs to keep
    /// the manager alive for as long as the execution runs; callers that
    /// still need their handle afterward pass `manager.clone()`.
    pub fn start(self: Arc<Self>, workflow_id: WorkflowId, input: Value) -> Result<ExecutionId, ManagerError> {
        let definition = self.workflows.get(&workflow_id).ok_or(ManagerError::UnknownWorkflow(workflow_id))?;

        let execution_id = ExecutionId::v4();
        let state = Arc::new(StateManager::new(merge_input(&definition.initial_state, &input)));
        let record = Arc::new(ExecutionRecord::start(execution_id, workflow_id, state.clone()));
        self.records.insert(execution_id, record.clone());
        self.events.publish(execution_id, Event::ExecutionStarted);
        info!(%execution_id, %workflow_id, "execution started");

        tokio::spawn(async move {
            self.run_to_completion(definition, execution_id, state, record).await;
        });

        Ok(execution_id)
    }

    async fn run_to_completion(
        self: Arc<Self>,
        definition: Arc<WorkflowDefinition>,
        execution_id: ExecutionId,
        state: Arc<StateManager>,
        record: Arc<ExecutionRecord>,
    ) {
        let mut ctx = ExecutionContext::new(execution_id, state);
        ctx.cancellation = record.cancellation.clone();

        let interpreter = Interpreter::new(&self.registry, &self.events);
        let outcome = interpreter.run(&definition.flow, &mut ctx, &record).await;

        let (final_status, event) = match outcome {
            Ok(_edge) => (ExecutionStatus::Completed, Event::ExecutionCompleted { final_state: ctx.state.snapshot() }),
            Err(ExecutionError::Cancelled) => (ExecutionStatus::Cancelled, Event::ExecutionCancelled),
            Err(other) => (
                ExecutionStatus::Failed,
                Event::ExecutionFailed { error_kind: error_kind(&other).to_owned(), message: other.to_string() },
            ),
        };

        if let Err(err) = record.transition_to(final_status) {
            warn!(%execution_id, %err, "final status transition was rejected, leaving prior status in place");
        }
        self.events.publish(execution_id, event);
        self.events.retire(execution_id);
    }

    /// A snapshot of one execution's tracked state.
    pub fn status(&self, execution_id: ExecutionId) -> Result<ExecutionSnapshot, ManagerError> {
        let record = self.records.get(&execution_id).ok_or(ManagerError::UnknownExecution(execution_id))?;
        Ok(to_snapshot(&record))
    }

    /// Resume a paused execution's pending pause at `node_id` with `data`.
    ///
    /// The edge the execution continues on was fixed at pause time (the
    /// paused node's descriptor's resume edge, `"submitted"` by default),
    /// not chosen by the caller.
    pub fn resume(&self, execution_id: ExecutionId, node_id: &NodeId, data: Value) -> Result<(), ManagerError> {
        let record = self.records.get(&execution_id).ok_or(ManagerError::UnknownExecution(execution_id))?;
        if record.status() != ExecutionStatus::Paused {
            return Err(ManagerError::NotPaused(execution_id));
        }
        let pause = record.get_pause(node_id).ok_or_else(|| ManagerError::UnknownPause(node_id.clone()))?;
        let edge = pause.resume_edge().to_owned();
        pause.resolve(ResumeOutcome { edge, data })?;
        Ok(())
    }

    /// Request cooperative cancellation of a running or paused execution.
    ///
    /// Returns once the cancellation token is flagged; the spawned task
    /// observes it at its next check point and transitions to `Cancelled`
    /// asynchronously.
    pub fn cancel(&self, execution_id: ExecutionId) -> Result<(), ManagerError> {
        let record = self.records.get(&execution_id).ok_or(ManagerError::UnknownExecution(execution_id))?;
        record.cancellation.cancel();
        Ok(())
    }

    /// Snapshots of every tracked execution matching `filter`.
    #[must_use]
    pub fn list(&self, filter: &ListFilter) -> Vec<ExecutionSnapshot> {
        let snapshots = self.records.iter().map(|entry| to_snapshot(entry.value())).collect();
        snapshot::apply(filter, snapshots)
    }

    /// Subscribe to lifecycle events for one execution.
    pub fn subscribe(&self, execution_id: ExecutionId) -> Result<Subscription, ManagerError> {
        if !self.records.contains_key(&execution_id) {
            return Err(ManagerError::UnknownExecution(execution_id));
        }
        Ok(self.events.subscribe(execution_id))
    }
}

fn to_snapshot(record: &ExecutionRecord) -> ExecutionSnapshot {
    ExecutionSnapshot {
        execution_id: record.execution_id,
        workflow_id: record.workflow_id,
        status: record.status(),
        current_node: record.current_node(),
        pending_pause_nodes: record.pending_pause_nodes(),
        start_time: record.start_time(),
        end_time: record.end_time(),
        state: record.state.snapshot(),
    }
}

fn merge_input(initial_state: &Value, input: &Value) -> Value {
    let (Value::Object(base), Value::Object(overlay)) = (initial_state, input) else {
        return if input.is_null() { initial_state.clone() } else { input.clone() };
    };
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    Value::Object(merged)
}

fn error_kind(err: &ExecutionError) -> &'static str {
    match err {
        ExecutionError::NodeFailed { .. } => "node_failed",
        ExecutionError::UnknownNode { .. } => "unknown_node",
        ExecutionError::UnroutedEdge { .. } => "unrouted_edge",
        ExecutionError::ConfigInvalid { .. } => "config_invalid",
        ExecutionError::InvalidTransition { .. } => "invalid_transition",
        ExecutionError::State(_) => "state_error",
        ExecutionError::NotPaused => "not_paused",
        ExecutionError::UnknownPause(_) => "unknown_pause",
        ExecutionError::AlreadyResumed(_) => "already_resumed",
        ExecutionError::Cancelled => "cancelled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flowscript_core::Edge;
    use flowscript_registry::{Node, NodeDescriptor};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::time::Duration;

    struct NextNode(NodeDescriptor);

    #[async_trait]
    impl Node for NextNode {
        fn descriptor(&self) -> &NodeDescriptor {
            &self.0
        }

        async fn execute(&self, _config: &Value, _ctx: &ExecutionContext) -> Result<Edge, ExecutionError> {
            Ok(Edge::bare("next"))
        }
    }

    struct PauseNode(NodeDescriptor);

    #[async_trait]
    impl Node for PauseNode {
        fn descriptor(&self) -> &NodeDescriptor {
            &self.0
        }

        async fn execute(&self, _config: &Value, _ctx: &ExecutionContext) -> Result<Edge, ExecutionError> {
            Ok(Edge::bare("pause"))
        }
    }

    struct SpinForever(NodeDescriptor);

    #[async_trait]
    impl Node for SpinForever {
        fn descriptor(&self) -> &NodeDescriptor {
            &self.0
        }

        async fn execute(&self, _config: &Value, ctx: &ExecutionContext) -> Result<Edge, ExecutionError> {
            loop {
                ctx.check_cancelled()?;
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        }
    }

    fn single_node_workflow(name: &str) -> Value {
        json!({
            "name": "single-node",
            "initialState": {"seen": false},
            "nodes": {name: {}},
        })
    }

    fn manager() -> Arc<ExecutionManager> {
        ExecutionManager::new(EngineConfig::default())
    }

    #[tokio::test]
    async fn start_runs_to_completion() {
        let manager = manager();
        manager.node_registry().register(Arc::new(NextNode(NodeDescriptor::action("step")))).unwrap();
        let workflow_id = manager.load_workflow(&single_node_workflow("step")).unwrap();
        let execution_id = manager.clone().start(workflow_id, json!({})).unwrap();

        let mut sub = manager.subscribe(execution_id).unwrap();
        loop {
            match sub.recv().await {
                Some(Event::ExecutionCompleted { .. }) => break,
                Some(_) => continue,
                None => panic!("bus closed before completion"),
            }
        }

        let snapshot = manager.status(execution_id).unwrap();
        assert_eq!(snapshot.status, ExecutionStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_workflow_is_reported_synchronously() {
        let manager = manager();
        let err = manager.clone().start(WorkflowId::v4(), json!({})).unwrap_err();
        assert!(matches!(err, ManagerError::UnknownWorkflow(_)));
    }

    #[tokio::test]
    async fn resume_before_paused_is_rejected() {
        let manager = manager();
        manager.node_registry().register(Arc::new(NextNode(NodeDescriptor::action("step")))).unwrap();
        let workflow_id = manager.load_workflow(&single_node_workflow("step")).unwrap();
        let execution_id = manager.clone().start(workflow_id, json!({})).unwrap();
        let err = manager.resume(execution_id, &NodeId::root().child(0), json!({})).unwrap_err();
        assert!(matches!(err, ManagerError::NotPaused(_)) || matches!(err, ManagerError::UnknownPause(_)));
    }

    #[tokio::test]
    async fn pause_then_resume_completes_the_execution() {
        let manager = manager();
        manager.node_registry().register(Arc::new(PauseNode(NodeDescriptor::human("approve")))).unwrap();
        let workflow_id = manager.load_workflow(&single_node_workflow("approve")).unwrap();
        let execution_id = manager.clone().start(workflow_id, json!({})).unwrap();

        let paused_node = loop {
            let snapshot = manager.status(execution_id).unwrap();
            if let Some(node_id) = snapshot.pending_pause_nodes.first() {
                break node_id.clone();
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        };

        manager.resume(execution_id, &paused_node, json!({"ok": true})).unwrap();

        loop {
            let snapshot = manager.status(execution_id).unwrap();
            if snapshot.status.is_terminal() {
                assert_eq!(snapshot.status, ExecutionStatus::Completed);
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn cancel_transitions_a_running_execution_to_cancelled() {
        let manager = manager();
        manager.node_registry().register(Arc::new(SpinForever(NodeDescriptor::action("spin")))).unwrap();
        let workflow_id = manager.load_workflow(&single_node_workflow("spin")).unwrap();
        let execution_id = manager.clone().start(workflow_id, json!({})).unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        manager.cancel(execution_id).unwrap();

        loop {
            let snapshot = manager.status(execution_id).unwrap();
            if snapshot.status.is_terminal() {
                assert_eq!(snapshot.status, ExecutionStatus::Cancelled);
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    #[tokio::test]
    async fn list_filters_by_workflow_and_status() {
        let manager = manager();
        manager.node_registry().register(Arc::new(NextNode(NodeDescriptor::action("step")))).unwrap();
        let workflow_a = manager.load_workflow(&single_node_workflow("step")).unwrap();
        let workflow_b = manager.load_workflow(&single_node_workflow("step")).unwrap();
        let exec_a = manager.clone().start(workflow_a, json!({})).unwrap();
        let _exec_b = manager.clone().start(workflow_b, json!({})).unwrap();

        loop {
            if manager.status(exec_a).unwrap().status.is_terminal() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let only_a = manager.list(&ListFilter::for_workflow(workflow_a));
        assert_eq!(only_a.len(), 1);
        assert_eq!(only_a[0].execution_id, exec_a);
    }

    #[tokio::test]
    async fn subscribe_to_unknown_execution_is_an_error() {
        let manager = manager();
        let err = manager.subscribe(ExecutionId::v4()).unwrap_err();
        assert!(matches!(err, ManagerError::UnknownExecution(_)));
    }

    #[test]
    fn merge_input_overlays_but_keeps_untouched_defaults() {
        let merged = merge_input(&json!({"amount": 0, "currency": "usd"}), &json!({"amount": 500}));
        assert_eq!(merged, json!({"amount": 500, "currency": "usd"}));
    }
}
