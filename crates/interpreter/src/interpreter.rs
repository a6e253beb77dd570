//! The tree-walking interpreter.

use std::time::Duration;

use chrono::Utc;
use flowscript_core::{Edge, ExecutionId, NodeId};
use flowscript_eventbus::{Event, EventBus};
use flowscript_execution::{
    ExecutionContext, ExecutionError, ExecutionRecord, ExecutionStatus, JournalEntry, PendingPause,
    ResumeOutcome,
};
use flowscript_registry::NodeRegistry;
use flowscript_state::StateChange;
use flowscript_template::resolve_config;
use flowscript_workflow::FlowElement;
use futures::future::BoxFuture;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::loops::{evaluate_while_condition, for_each_bindings, for_each_plan, FOR_EACH, WHILE_CONDITION};

/// The reserved edge name a node returns to suspend the execution.
pub const PAUSE_EDGE: &str = "pause";
/// The reserved edge name a pause resolves to when its timeout elapses and
/// nothing resumed it.
pub const TIMEOUT_EDGE: &str = "timeout";
/// The terminal edge of an empty sequence.
pub const SENTINEL_EDGE: &str = "next";

/// Runs a compiled flow tree against one execution's context and record,
/// dispatching node invocations through a [`NodeRegistry`] and publishing
/// lifecycle events to an [`EventBus`] as it goes.
pub struct Interpreter<'a> {
    registry: &'a NodeRegistry,
    events: &'a EventBus,
}

impl<'a> Interpreter<'a> {
    /// Build an interpreter over the given registry and event bus.
    #[must_use]
    pub fn new(registry: &'a NodeRegistry, events: &'a EventBus) -> Self {
        Self { registry, events }
    }

    /// Run a flow element to completion, returning its terminal edge.
    ///
    /// Boxed because the flow tree recurses through `Sequence`/`Branch`/
    /// `Loop` and an `async fn` can't describe a self-referential future of
    /// unbounded size.
    pub fn run<'f>(
        &'f self,
        element: &'f FlowElement,
        ctx: &'f mut ExecutionContext,
        record: &'f ExecutionRecord,
    ) -> BoxFuture<'f, Result<Edge, ExecutionError>> {
        Box::pin(async move {
            ctx.check_cancelled()?;
            match element {
                FlowElement::Node { id, node, config } => {
                    self.run_node(id, node, config, ctx, record).await
                }
                FlowElement::Sequence { elements, .. } => {
                    self.run_sequence(elements, ctx, record).await
                }
                FlowElement::Branch {
                    id,
                    condition,
                    arms,
                    catch_all,
                } => {
                    self.run_branch(id, condition, arms, catch_all.as_deref(), ctx, record)
                        .await
                }
                FlowElement::Loop {
                    controller, body, ..
                } => self.run_loop(controller, body, ctx, record).await,
            }
        })
    }

    async fn run_sequence(
        &self,
        elements: &[FlowElement],
        ctx: &mut ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        let mut last = None;
        for element in elements {
            last = Some(self.run(element, ctx, record).await?);
        }
        Ok(last.unwrap_or_else(|| Edge::bare(SENTINEL_EDGE)))
    }

    async fn run_branch(
        &self,
        id: &NodeId,
        condition: &FlowElement,
        arms: &std::collections::BTreeMap<String, FlowElement>,
        catch_all: Option<&FlowElement>,
        ctx: &mut ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        let edge = self.run(condition, ctx, record).await?;
        let name = edge.name().to_owned();
        match arms.get(&name).or(catch_all) {
            Some(arm) => self.run(arm, ctx, record).await,
            None => Err(ExecutionError::UnroutedEdge {
                node_id: id.clone(),
                edge: name,
            }),
        }
    }

    async fn run_loop(
        &self,
        controller: &FlowElement,
        body: &FlowElement,
        ctx: &mut ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        let FlowElement::Node {
            id: controller_id,
            node: controller_name,
            config: controller_config,
        } = controller
        else {
            unreachable!("FlowElement::compile only accepts a node invocation as a loop controller")
        };

        match controller_name.as_str() {
            WHILE_CONDITION => self.run_while_loop(controller_id, controller_config, body, ctx, record).await,
            FOR_EACH => self.run_for_each_loop(controller_id, controller_config, body, ctx, record).await,
            other => Err(ExecutionError::UnknownNode {
                node_id: controller_id.clone(),
                name: other.to_owned(),
            }),
        }
    }

    async fn run_while_loop(
        &self,
        controller_id: &NodeId,
        controller_config: &Value,
        body: &FlowElement,
        ctx: &mut ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        loop {
            ctx.check_cancelled()?;
            let (resolved, misses) =
                resolve_config(controller_config, &ctx.bindings_innermost_first(), &ctx.state);
            self.report_misses(controller_id, ctx, misses);
            if !evaluate_while_condition(&resolved, controller_id)? {
                return Ok(Edge::bare("exit"));
            }
            self.run(body, ctx, record).await?;
        }
    }

    async fn run_for_each_loop(
        &self,
        controller_id: &NodeId,
        controller_config: &Value,
        body: &FlowElement,
        ctx: &mut ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        ctx.check_cancelled()?;
        let (resolved, misses) =
            resolve_config(controller_config, &ctx.bindings_innermost_first(), &ctx.state);
        self.report_misses(controller_id, ctx, misses);
        let (items, as_name) = for_each_plan(&resolved, controller_id)?;
        let items = items.to_vec();
        let as_name = as_name.to_owned();

        for (index, item) in items.iter().enumerate() {
            ctx.check_cancelled()?;
            ctx.push_bindings(for_each_bindings(&as_name, index, item));
            let outcome = self.run(body, ctx, record).await;
            ctx.pop_bindings();
            outcome?;
        }
        Ok(Edge::bare("exit"))
    }

    async fn run_node(
        &self,
        id: &NodeId,
        node: &str,
        config: &Value,
        ctx: &mut ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        let instance = self.registry.get(node).ok_or_else(|| ExecutionError::UnknownNode {
            node_id: id.clone(),
            name: node.to_owned(),
        })?;

        instance
            .descriptor()
            .validate_config(config)
            .map_err(|reason| ExecutionError::ConfigInvalid {
                node_id: id.clone(),
                reason,
            })?;

        let (resolved_config, misses) =
            resolve_config(config, &ctx.bindings_innermost_first(), &ctx.state);
        self.report_misses(id, ctx, misses);

        record.set_current_node(id.clone());
        record.record(JournalEntry::NodeEntered {
            timestamp: Utc::now(),
            node_id: id.clone(),
        });
        self.events.publish(ctx.execution_id, Event::NodeEntered { node_id: id.clone() });

        let mut state_rx = ctx.state.subscribe();

        let edge = instance
            .execute(&resolved_config, ctx)
            .await
            .map_err(|cause| ExecutionError::NodeFailed {
                node_id: id.clone(),
                cause: cause.to_string(),
            })?;
        ctx.check_cancelled()?;

        self.drain_state_changes(&mut state_rx, ctx.execution_id, record);

        if edge.name() == PAUSE_EDGE {
            let resume_edge = instance.descriptor().resume_edge().to_owned();
            return self.handle_pause(id, edge, &resume_edge, ctx, record).await;
        }

        record.record(JournalEntry::NodeExited {
            timestamp: Utc::now(),
            node_id: id.clone(),
            edge: edge.name().to_owned(),
        });
        self.events.publish(
            ctx.execution_id,
            Event::NodeExited {
                node_id: id.clone(),
                edge: edge.name().to_owned(),
            },
        );
        Ok(edge)
    }

    async fn handle_pause(
        &self,
        id: &NodeId,
        edge: Edge,
        resume_edge: &str,
        ctx: &ExecutionContext,
        record: &ExecutionRecord,
    ) -> Result<Edge, ExecutionError> {
        let data = edge.data();
        let form_schema = data.get("formSchema").cloned();
        let timeout_ms = data.get("timeoutMs").and_then(Value::as_u64);
        let expires_at = timeout_ms.map(|ms| Utc::now() + chrono::Duration::milliseconds(ms as i64));

        let (pause, receiver) =
            PendingPause::new(id.clone(), form_schema.clone(), expires_at, resume_edge);
        let pause = Arc::new(pause);
        record.install_pause(pause.clone());
        record.transition_to(ExecutionStatus::Paused)?;
        record.record(JournalEntry::Paused {
            timestamp: Utc::now(),
            node_id: id.clone(),
        });
        self.events.publish(ctx.execution_id, Event::Paused { node_id: id.clone(), form_schema });
        info!(node_id = %id, "execution paused");

        let outcome = match timeout_ms {
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), receiver).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => return Err(ExecutionError::Cancelled),
                Err(_elapsed) => {
                    let timeout_outcome = ResumeOutcome {
                        edge: TIMEOUT_EDGE.to_owned(),
                        data: Value::Null,
                    };
                    // Best effort: if a resume raced in right as the timer
                    // fired, it already took the pause and this is a no-op.
                    let _ = pause.resolve(ResumeOutcome {
                        edge: TIMEOUT_EDGE.to_owned(),
                        data: Value::Null,
                    });
                    timeout_outcome
                }
            },
            None => receiver.await.map_err(|_| ExecutionError::Cancelled)?,
        };

        record.remove_pause(id);
        record.transition_to(ExecutionStatus::Running)?;
        record.record(JournalEntry::Resumed {
            timestamp: Utc::now(),
            node_id: id.clone(),
            edge: outcome.edge.clone(),
        });
        self.events.publish(ctx.execution_id, Event::Resumed { node_id: id.clone() });

        record.record(JournalEntry::NodeExited {
            timestamp: Utc::now(),
            node_id: id.clone(),
            edge: outcome.edge.clone(),
        });
        self.events.publish(
            ctx.execution_id,
            Event::NodeExited { node_id: id.clone(), edge: outcome.edge.clone() },
        );

        Ok(Edge::immediate(outcome.edge, outcome.data))
    }

    /// Publish and journal every state write the node just made, in the
    /// order they happened, so the per-subscriber stream shows `node-entered`,
    /// then each `state-changed`, then `node-exited` for that node.
    fn drain_state_changes(
        &self,
        state_rx: &mut broadcast::Receiver<StateChange>,
        execution_id: ExecutionId,
        record: &ExecutionRecord,
    ) {
        loop {
            match state_rx.try_recv() {
                Ok(change) => {
                    record.record(JournalEntry::StateChanged {
                        timestamp: Utc::now(),
                        path: change.path.clone(),
                    });
                    self.events.publish(
                        execution_id,
                        Event::StateChanged { path: change.path, new_value: change.value },
                    );
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
    }

    fn report_misses(&self, node_id: &NodeId, ctx: &ExecutionContext, misses: Vec<flowscript_template::TemplateMiss>) {
        for miss in misses {
            warn!(node_id = %node_id, expression = %miss.expression, "template expression did not resolve");
            self.events.publish(
                ctx.execution_id,
                Event::TemplateMiss { node_id: node_id.clone(), expression: miss.expression },
            );
        }
    }
}
