//! The compiled flow-element tree.
//!
//! A workflow's `nodes` field is raw JSON using four interchangeable shapes:
//! a single-entry object is a node invocation, a bare array is a sequence,
//! and `{"branch": [...]}` / `{"loop": [...]}` wrap the two tuple forms. The
//! wrapper keys resolve what would otherwise be a genuine ambiguity between
//! a two-element sequence and a branch/loop tuple (both are JSON arrays of
//! length two) — see `DESIGN.md` for the reasoning. [`FlowElement::compile`]
//! walks this raw shape once, at load time, and produces the tagged tree the
//! interpreter actually runs against, assigning every element a stable
//! [`NodeId`] along the way.

use std::collections::BTreeMap;

use flowscript_core::NodeId;
use serde::Serialize;
use serde_json::Value;

use crate::error::WorkflowError;

/// One element of a workflow's flow tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FlowElement {
    /// Invoke a single registered node with a config object.
    Node {
        /// This element's position in the tree.
        id: NodeId,
        /// Name the node is registered under.
        node: String,
        /// Config object passed to the node, template strings unresolved.
        config: Value,
    },
    /// Evaluate `condition`, then run the arm whose key matches the
    /// resulting edge name (or `catch_all` if no arm matches).
    Branch {
        /// This element's position in the tree.
        id: NodeId,
        /// The element producing the edge the branch dispatches on.
        condition: Box<FlowElement>,
        /// Edge name to arm element, exact match.
        arms: BTreeMap<String, FlowElement>,
        /// Arm run when no entry in `arms` matches the edge name.
        catch_all: Option<Box<FlowElement>>,
    },
    /// Run `controller`, then `body` while the controller keeps emitting its
    /// continuation edge, per the two built-in loop controllers.
    Loop {
        /// This element's position in the tree.
        id: NodeId,
        /// A node invocation (`whileCondition` or `forEach`) deciding
        /// whether the loop continues.
        controller: Box<FlowElement>,
        /// Element run on each iteration the controller allows.
        body: Box<FlowElement>,
    },
    /// Run each element in order.
    Sequence {
        /// This element's position in the tree.
        id: NodeId,
        /// Elements run in array order.
        elements: Vec<FlowElement>,
    },
}

const CATCH_ALL_KEY: &str = "*";

impl FlowElement {
    /// This element's position in the flow tree.
    #[must_use]
    pub fn id(&self) -> &NodeId {
        match self {
            Self::Node { id, .. }
            | Self::Branch { id, .. }
            | Self::Loop { id, .. }
            | Self::Sequence { id, .. } => id,
        }
    }

    /// Compile a raw JSON `nodes` value into a tagged flow tree, assigning
    /// `id` to the root and deriving every descendant's id from it.
    pub fn compile(raw: &Value, id: NodeId) -> Result<Self, WorkflowError> {
        match raw {
            Value::Array(elements) => {
                let elements = elements
                    .iter()
                    .enumerate()
                    .map(|(index, element)| Self::compile(element, id.child(index)))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Self::Sequence { id, elements })
            }
            Value::Object(map) if map.len() == 1 => {
                let (key, value) = map.iter().next().expect("len() == 1");
                match key.as_str() {
                    "branch" => Self::compile_branch(value, id),
                    "loop" => Self::compile_loop(value, id),
                    node_name => {
                        let Value::Object(_) = value else {
                            return Err(WorkflowError::InvalidNodeConfig {
                                path: id.to_string(),
                            });
                        };
                        Ok(Self::Node {
                            id,
                            node: node_name.to_owned(),
                            config: value.clone(),
                        })
                    }
                }
            }
            _ => Err(WorkflowError::UnrecognizedElement {
                path: id.to_string(),
            }),
        }
    }

    fn compile_branch(value: &Value, id: NodeId) -> Result<Self, WorkflowError> {
        let Value::Array(tuple) = value else {
            return Err(WorkflowError::InvalidBranchShape {
                path: id.to_string(),
            });
        };
        let [condition_raw, map_raw] = tuple.as_slice() else {
            return Err(WorkflowError::InvalidBranchShape {
                path: id.to_string(),
            });
        };
        let Value::Object(branch_map) = map_raw else {
            return Err(WorkflowError::InvalidBranchShape {
                path: id.to_string(),
            });
        };
        if branch_map.is_empty() {
            return Err(WorkflowError::EmptyBranchMap {
                path: id.to_string(),
            });
        }

        let condition = Box::new(Self::compile(condition_raw, id.child("condition"))?);

        let mut arms = BTreeMap::new();
        let mut catch_all = None;
        for (edge_name, arm_raw) in branch_map {
            let arm = Self::compile(arm_raw, id.child(format!("branch:{edge_name}")))?;
            if edge_name == CATCH_ALL_KEY {
                catch_all = Some(Box::new(arm));
            } else {
                arms.insert(edge_name.clone(), arm);
            }
        }

        Ok(Self::Branch {
            id,
            condition,
            arms,
            catch_all,
        })
    }

    fn compile_loop(value: &Value, id: NodeId) -> Result<Self, WorkflowError> {
        let Value::Array(tuple) = value else {
            return Err(WorkflowError::InvalidLoopShape {
                path: id.to_string(),
            });
        };
        let [controller_raw, body_raw] = tuple.as_slice() else {
            return Err(WorkflowError::InvalidLoopShape {
                path: id.to_string(),
            });
        };

        let controller = Self::compile(controller_raw, id.child("loop:controller"))?;
        if !matches!(controller, Self::Node { .. }) {
            return Err(WorkflowError::InvalidLoopController {
                path: id.to_string(),
            });
        }

        let body = Self::compile(body_raw, id.child("loop:body"))?;

        Ok(Self::Loop {
            id,
            controller: Box::new(controller),
            body: Box::new(body),
        })
    }
}
