//! Whole-graph checks run before a definition is considered savable.
//!
//! Errors describe graphs an engine cannot execute unambiguously. Warnings
//! describe graphs that are executable but suspicious, or that an in-progress
//! edit has left temporarily incomplete (a disconnected branch, say).

use crate::config::ValidationConfig;
use crate::model::{Edge, Node, WorkflowDefinition};
use crate::routing::evaluation_order;
use ahash::AHashMap;
use tracing::debug;

mod attributes;
mod conditions;
mod issue;
mod parallel;
mod structure;

pub use issue::{IssueCode, Severity, ValidationIssue, ValidationResult};

/// Id-indexed view of a definition, with outgoing edges in evaluation order.
pub(crate) struct GraphIndex<'a> {
    nodes: AHashMap<&'a str, &'a Node>,
    outgoing: AHashMap<&'a str, Vec<&'a Edge>>,
    incoming: AHashMap<&'a str, Vec<&'a Edge>>,
}

impl<'a> GraphIndex<'a> {
    pub(crate) fn new(definition: &'a WorkflowDefinition) -> Self {
        let nodes = definition
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n))
            .collect();

        let mut outgoing: AHashMap<&'a str, Vec<&'a Edge>> = AHashMap::new();
        let mut incoming: AHashMap<&'a str, Vec<&'a Edge>> = AHashMap::new();
        for edge in &definition.edges {
            outgoing
                .entry(edge.from_node_id.as_str())
                .or_default()
                .push(edge);
            incoming
                .entry(edge.to_node_id.as_str())
                .or_default()
                .push(edge);
        }
        for edges in outgoing.values_mut() {
            *edges = evaluation_order(edges.iter().copied());
        }

        Self {
            nodes,
            outgoing,
            incoming,
        }
    }

    pub(crate) fn node(&self, id: &str) -> Option<&'a Node> {
        self.nodes.get(id).copied()
    }

    pub(crate) fn outgoing(&self, id: &str) -> &[&'a Edge] {
        self.outgoing.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn incoming(&self, id: &str) -> &[&'a Edge] {
        self.incoming.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Targets of a node's outgoing edges that exist in the definition.
    pub(crate) fn successors(&self, id: &str) -> impl Iterator<Item = &'a Node> + '_ {
        self.outgoing(id)
            .iter()
            .filter_map(|e| self.node(&e.to_node_id))
    }
}

/// Validates definitions against the structural and semantic rules.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn validate(&self, definition: &WorkflowDefinition) -> ValidationResult {
        let index = GraphIndex::new(definition);
        let mut result = ValidationResult::default();

        structure::check_nodes(definition, &mut result);
        structure::check_edges(definition, &index, &mut result);
        structure::check_degrees(definition, &index, &mut result);
        structure::check_reachability(definition, &index, &self.config, &mut result);
        conditions::check_outgoing(definition, &index, &self.config, &mut result);
        attributes::check_approvers(definition, &mut result);
        attributes::check_scope(definition, &mut result);
        parallel::check_balance(definition, &index, &mut result);

        debug!(
            nodes = definition.nodes.len(),
            edges = definition.edges.len(),
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated workflow definition"
        );
        result
    }
}

/// Validates with the default configuration.
pub fn validate(definition: &WorkflowDefinition) -> ValidationResult {
    Validator::default().validate(definition)
}
