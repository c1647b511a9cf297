//! A deterministic reference interpreter for the execution contract.
//!
//! A live request is a set of tokens. Automatic nodes (START, CONDITION,
//! PARALLEL_START, PARALLEL_JOIN) are resolved synchronously; APPROVAL nodes
//! park their token until [`Instance::decide`] is called. Conditions are
//! evaluated once, against the context captured when the instance was
//! created.

mod event;
mod token;

pub use event::ExecutionEvent;
pub use token::{ForkFrame, Token};

use crate::config::ExecutionConfig;
use crate::context::RequestContext;
use crate::error::RoutingError;
use crate::model::{Edge, Node, NodeKind, WorkflowDefinition};
use crate::registry::{ApproverSpec, resolve_approver};
use crate::routing::select_edge;
use crate::trace::TraceFormatter;
use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// An id-indexed, read-only view of a definition prepared for execution.
#[derive(Debug, Clone)]
pub struct ExecutionGraph {
    nodes: AHashMap<String, Node>,
    /// Outgoing edges in insertion order.
    outgoing: AHashMap<String, Vec<Edge>>,
    start_id: String,
}

impl ExecutionGraph {
    /// Fails when the definition cannot be entered at all: no single START,
    /// or an edge pointing at a missing node.
    pub fn new(definition: &WorkflowDefinition) -> Result<Self, RoutingError> {
        let starts: Vec<&Node> = definition.nodes_of_kind(NodeKind::Start).collect();
        let start_id = match starts.as_slice() {
            [] => return Err(RoutingError::MissingStart),
            [start] => start.id.clone(),
            many => return Err(RoutingError::MultipleStarts(many.len())),
        };

        let nodes: AHashMap<String, Node> = definition
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.clone()))
            .collect();

        let mut outgoing: AHashMap<String, Vec<Edge>> = AHashMap::new();
        for edge in &definition.edges {
            for endpoint in [&edge.from_node_id, &edge.to_node_id] {
                if !nodes.contains_key(endpoint) {
                    return Err(RoutingError::DanglingEdge {
                        edge_id: edge.id.clone(),
                        node_id: endpoint.clone(),
                    });
                }
            }
            outgoing
                .entry(edge.from_node_id.clone())
                .or_default()
                .push(edge.clone());
        }

        Ok(Self {
            nodes,
            outgoing,
            start_id,
        })
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)
    }

    pub fn outgoing(&self, node_id: &str) -> Vec<&Edge> {
        self.outgoing
            .get(node_id)
            .map(|edges| edges.iter().collect())
            .unwrap_or_default()
    }

    /// The only way out of a non-branching node.
    fn single_edge(&self, node_id: &str) -> Result<&Edge, RoutingError> {
        match self.outgoing.get(node_id).map(Vec::as_slice) {
            Some([edge]) => Ok(edge),
            None | Some([]) => Err(RoutingError::DeadEnd {
                node_id: node_id.to_string(),
            }),
            Some(edges) => Err(RoutingError::AmbiguousTransition {
                node_id: node_id.to_string(),
                count: edges.len(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceStatus {
    Running,
    Completed,
    Rejected { node_id: String },
    Failed { reason: String },
}

impl InstanceStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, InstanceStatus::Running)
    }

    fn label(&self) -> &'static str {
        match self {
            InstanceStatus::Running => "running",
            InstanceStatus::Completed => "completed",
            InstanceStatus::Rejected { .. } => "rejected",
            InstanceStatus::Failed { .. } => "failed",
        }
    }
}

/// An approval waiting for a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingApproval {
    pub node_id: String,
    /// `None` when the node's approver attributes do not resolve.
    pub approver: Option<ApproverSpec>,
}

#[derive(Debug, Clone)]
struct JoinState {
    arrived: usize,
    required: usize,
}

/// One live request walking an [`ExecutionGraph`].
#[derive(Debug)]
pub struct Instance<'g> {
    graph: &'g ExecutionGraph,
    context: RequestContext,
    max_steps: usize,
    status: InstanceStatus,
    /// Tokens parked at APPROVAL nodes.
    waiting: Vec<Token>,
    joins: AHashMap<(String, u64), JoinState>,
    /// The join each fork's branches have been seen at.
    fork_targets: AHashMap<u64, String>,
    closed_forks: AHashSet<u64>,
    next_fork: u64,
    history: Vec<ExecutionEvent>,
}

impl<'g> Instance<'g> {
    pub fn new(graph: &'g ExecutionGraph, context: RequestContext) -> Self {
        Self {
            graph,
            context,
            max_steps: ExecutionConfig::default().max_steps,
            status: InstanceStatus::Running,
            waiting: Vec::new(),
            joins: AHashMap::new(),
            fork_targets: AHashMap::new(),
            closed_forks: AHashSet::new(),
            next_fork: 0,
            history: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: &ExecutionConfig) -> Self {
        self.max_steps = config.max_steps;
        self
    }

    /// Places the initial token on START and advances until every token is
    /// parked at an approval or the instance ends.
    pub fn start(&mut self) -> Result<&InstanceStatus, RoutingError> {
        if !self.history.is_empty() {
            return Err(RoutingError::InstanceClosed("already started".to_string()));
        }
        let start_id = self.graph.start_id().to_string();
        info!(node_id = %start_id, "starting instance");
        self.history.push(ExecutionEvent::Started {
            node_id: start_id.clone(),
        });
        self.run(VecDeque::from([Token::at(start_id)]))?;
        Ok(&self.status)
    }

    /// Records an approver's decision on a parked token.
    pub fn decide(
        &mut self,
        node_id: &str,
        decision: Decision,
    ) -> Result<&InstanceStatus, RoutingError> {
        if !self.status.is_running() {
            return Err(RoutingError::InstanceClosed(self.status.label().to_string()));
        }
        let position = self
            .waiting
            .iter()
            .position(|t| t.node_id == node_id)
            .ok_or_else(|| RoutingError::NotAwaitingDecision(node_id.to_string()))?;
        let token = self.waiting.remove(position);

        match decision {
            Decision::Approve => {
                self.history.push(ExecutionEvent::Approved {
                    node_id: node_id.to_string(),
                });
                let graph = self.graph;
                let edge = graph.single_edge(node_id).map_err(|e| self.fail(e))?;
                let next = token.moved(&edge.id, &edge.to_node_id);
                self.run(VecDeque::from([next]))?;
            }
            Decision::Reject => {
                info!(node_id, "instance rejected");
                self.history.push(ExecutionEvent::Rejected {
                    node_id: node_id.to_string(),
                });
                self.waiting.clear();
                self.status = InstanceStatus::Rejected {
                    node_id: node_id.to_string(),
                };
            }
        }
        Ok(&self.status)
    }

    pub fn status(&self) -> &InstanceStatus {
        &self.status
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn history(&self) -> &[ExecutionEvent] {
        &self.history
    }

    pub fn is_waiting_at(&self, node_id: &str) -> bool {
        self.waiting.iter().any(|t| t.node_id == node_id)
    }

    /// Approvals currently waiting, in arrival order.
    pub fn pending_approvals(&self) -> Vec<PendingApproval> {
        self.waiting
            .iter()
            .map(|token| PendingApproval {
                node_id: token.node_id.clone(),
                approver: self
                    .graph
                    .node(&token.node_id)
                    .and_then(Node::approval_attributes)
                    .and_then(|attributes| resolve_approver(attributes).ok()),
            })
            .collect()
    }

    /// Arrivals and required arrivals at a join whose fork is still open.
    /// When several open forks wait at the same join, the innermost (most
    /// recently opened) one is reported.
    pub fn join_progress(&self, join_id: &str) -> Option<(usize, usize)> {
        self.joins
            .iter()
            .filter(|((id, fork_id), _)| id == join_id && !self.closed_forks.contains(fork_id))
            .max_by_key(|((_, fork_id), _)| *fork_id)
            .map(|(_, state)| (state.arrived, state.required))
    }

    fn run(&mut self, queue: VecDeque<Token>) -> Result<(), RoutingError> {
        self.advance(queue).map_err(|e| self.fail(e))
    }

    fn fail(&mut self, error: RoutingError) -> RoutingError {
        warn!(error = %error, "instance failed");
        self.waiting.clear();
        self.status = InstanceStatus::Failed {
            reason: error.to_string(),
        };
        self.history.push(ExecutionEvent::Failed {
            reason: error.to_string(),
        });
        error
    }

    fn advance(&mut self, mut queue: VecDeque<Token>) -> Result<(), RoutingError> {
        let graph = self.graph;
        let mut steps = 0;

        while let Some(token) = queue.pop_front() {
            if token.frames.iter().any(|f| self.closed_forks.contains(&f.fork_id)) {
                debug!(node_id = %token.node_id, "discarded token of a closed fork");
                continue;
            }
            steps += 1;
            if steps > self.max_steps {
                return Err(RoutingError::StepLimitExceeded {
                    limit: self.max_steps,
                });
            }

            let node = graph
                .node(&token.node_id)
                .ok_or_else(|| RoutingError::DanglingEdge {
                    edge_id: token.via.clone().unwrap_or_default(),
                    node_id: token.node_id.clone(),
                })?;
            debug!(node_id = %node.id, kind = %node.kind(), "token arrived");

            match node.kind() {
                NodeKind::Start => {
                    let edge = graph.single_edge(&node.id)?;
                    queue.push_back(token.moved(&edge.id, &edge.to_node_id));
                }
                NodeKind::Approval => {
                    self.history.push(ExecutionEvent::ApprovalPending {
                        node_id: node.id.clone(),
                    });
                    self.waiting.push(token);
                }
                NodeKind::Condition => {
                    let outgoing = graph.outgoing(&node.id);
                    let selection = select_edge(&outgoing, &self.context).ok_or_else(|| {
                        RoutingError::DeadEnd {
                            node_id: node.id.clone(),
                        }
                    })?;
                    let explanation = TraceFormatter::format_selection(&selection);
                    debug!(node_id = %node.id, %explanation, "condition resolved");
                    self.history.push(ExecutionEvent::ConditionResolved {
                        node_id: node.id.clone(),
                        edge_id: selection.edge.id.clone(),
                        explanation,
                    });
                    queue.push_back(token.moved(&selection.edge.id, &selection.edge.to_node_id));
                }
                NodeKind::ParallelStart => {
                    let branches = graph.outgoing(&node.id);
                    if branches.is_empty() {
                        return Err(RoutingError::DeadEnd {
                            node_id: node.id.clone(),
                        });
                    }
                    self.next_fork += 1;
                    let frame = ForkFrame {
                        fork_id: self.next_fork,
                        fork_node_id: node.id.clone(),
                        branches: branches.len(),
                        mode: node.parallel_mode().unwrap_or_default(),
                    };
                    self.history.push(ExecutionEvent::Forked {
                        node_id: node.id.clone(),
                        branches: frame.branches,
                        mode: frame.mode,
                    });
                    for edge in branches {
                        let mut branch = token.clone().moved(&edge.id, &edge.to_node_id);
                        branch.frames.push(frame.clone());
                        queue.push_back(branch);
                    }
                }
                NodeKind::ParallelJoin => {
                    if let Some(next) = self.arrive(node, token)? {
                        queue.push_back(next);
                    }
                }
                NodeKind::End => {
                    if let Some(frame) = token.frames.last() {
                        return Err(RoutingError::ForkJoinMismatch {
                            node_id: node.id.clone(),
                            message: format!(
                                "reached END inside the fork opened at '{}'",
                                frame.fork_node_id
                            ),
                        });
                    }
                    info!(node_id = %node.id, "instance completed");
                    self.history.push(ExecutionEvent::Completed {
                        node_id: node.id.clone(),
                    });
                    self.waiting.clear();
                    self.status = InstanceStatus::Completed;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Counts an arrival at a join. Returns the continuing token once the
    /// fork's policy is satisfied; the fork's other tokens are discarded.
    fn arrive(&mut self, join: &Node, mut token: Token) -> Result<Option<Token>, RoutingError> {
        let Some(frame) = token.frames.last().cloned() else {
            return Err(RoutingError::ForkJoinMismatch {
                node_id: join.id.clone(),
                message: "token arrived outside any fork".to_string(),
            });
        };

        let target = self
            .fork_targets
            .entry(frame.fork_id)
            .or_insert_with(|| join.id.clone());
        if *target != join.id {
            return Err(RoutingError::ForkJoinMismatch {
                node_id: join.id.clone(),
                message: format!(
                    "branches of the fork opened at '{}' reach both '{}' and '{}'",
                    frame.fork_node_id, target, join.id
                ),
            });
        }

        let state = self
            .joins
            .entry((join.id.clone(), frame.fork_id))
            .or_insert_with(|| JoinState {
                arrived: 0,
                required: frame.required_arrivals(),
            });
        state.arrived += 1;
        let (arrived, required) = (state.arrived, state.required);

        if arrived < required {
            self.history.push(ExecutionEvent::JoinWaiting {
                node_id: join.id.clone(),
                arrived,
                required,
            });
            return Ok(None);
        }

        self.history.push(ExecutionEvent::JoinCompleted {
            node_id: join.id.clone(),
            arrived,
            required,
        });
        self.closed_forks.insert(frame.fork_id);
        self.waiting.retain(|t| !t.within(frame.fork_id));

        token.frames.pop();
        let edge = self.graph.single_edge(&join.id)?;
        Ok(Some(token.moved(&edge.id, &edge.to_node_id)))
    }
}
