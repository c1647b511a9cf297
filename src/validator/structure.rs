use super::{GraphIndex, IssueCode, ValidationIssue, ValidationResult};
use crate::config::ValidationConfig;
use crate::model::{NodeKind, WorkflowDefinition};
use crate::registry::{Degree, spec_for};
use ahash::AHashSet;
use std::collections::VecDeque;

/// Unique ids, exactly one START, at least one END.
pub(super) fn check_nodes(definition: &WorkflowDefinition, result: &mut ValidationResult) {
    let mut seen = AHashSet::new();
    for node in &definition.nodes {
        if !seen.insert(node.id.as_str()) {
            result.push(
                ValidationIssue::error(
                    IssueCode::DuplicateId,
                    format!("node id '{}' is used more than once", node.id),
                )
                .on_node(&node.id),
            );
        }
    }
    let mut seen_edges = AHashSet::new();
    for edge in &definition.edges {
        if !seen_edges.insert(edge.id.as_str()) {
            result.push(
                ValidationIssue::error(
                    IssueCode::DuplicateId,
                    format!("edge id '{}' is used more than once", edge.id),
                )
                .on_edge(&edge.id),
            );
        }
    }

    let starts: Vec<_> = definition.nodes_of_kind(NodeKind::Start).collect();
    match starts.len() {
        0 => result.push(ValidationIssue::error(
            IssueCode::MissingStart,
            "definition must have exactly one START node, found none",
        )),
        1 => {}
        n => {
            for start in &starts[1..] {
                result.push(
                    ValidationIssue::error(
                        IssueCode::MultipleStarts,
                        format!("definition must have exactly one START node, found {}", n),
                    )
                    .on_node(&start.id),
                );
            }
        }
    }

    if definition.nodes_of_kind(NodeKind::End).next().is_none() {
        result.push(ValidationIssue::error(
            IssueCode::MissingEnd,
            "definition must have at least one END node",
        ));
    }
}

/// Every edge connects two existing, distinct nodes.
pub(super) fn check_edges(
    definition: &WorkflowDefinition,
    index: &GraphIndex<'_>,
    result: &mut ValidationResult,
) {
    for edge in &definition.edges {
        for (field, endpoint) in [
            ("fromNodeId", &edge.from_node_id),
            ("toNodeId", &edge.to_node_id),
        ] {
            if index.node(endpoint).is_none() {
                result.push(
                    ValidationIssue::error(
                        IssueCode::DanglingEdge,
                        format!("edge references missing node '{}'", endpoint),
                    )
                    .on_edge(&edge.id)
                    .with_field(field),
                );
            }
        }
        if edge.from_node_id == edge.to_node_id {
            result.push(
                ValidationIssue::error(
                    IssueCode::SelfLoop,
                    format!("edge connects node '{}' to itself", edge.from_node_id),
                )
                .on_edge(&edge.id),
            );
        }
    }
}

/// Edge counts per registry degree class.
pub(super) fn check_degrees(
    definition: &WorkflowDefinition,
    index: &GraphIndex<'_>,
    result: &mut ValidationResult,
) {
    for node in &definition.nodes {
        let spec = spec_for(node.kind());

        let outgoing = index.outgoing(&node.id).len();
        if !spec.outgoing.admits(outgoing) {
            result.push(
                ValidationIssue::error(
                    IssueCode::OutDegree,
                    format!(
                        "{} node must have {} outgoing edge(s), found {}",
                        node.kind(),
                        spec.outgoing.describe(),
                        outgoing
                    ),
                )
                .on_node(&node.id),
            );
        }

        let incoming = index.incoming(&node.id).len();
        if !spec.incoming.admits(incoming) {
            let code = if spec.incoming == Degree::AtLeastTwo {
                IssueCode::JoinArity
            } else {
                IssueCode::InDegree
            };
            result.push(
                ValidationIssue::error(
                    code,
                    format!(
                        "{} node must have {} incoming edge(s), found {}",
                        node.kind(),
                        spec.incoming.describe(),
                        incoming
                    ),
                )
                .on_node(&node.id),
            );
        }
    }
}

/// Forward traversal from START; anything not visited is reported.
pub(super) fn check_reachability(
    definition: &WorkflowDefinition,
    index: &GraphIndex<'_>,
    config: &ValidationConfig,
    result: &mut ValidationResult,
) {
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<&str> = definition
        .nodes_of_kind(NodeKind::Start)
        .map(|n| n.id.as_str())
        .collect();
    if queue.is_empty() {
        // Already reported as MissingStart; every node would be unreachable.
        return;
    }

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        for next in index.successors(id) {
            if !visited.contains(next.id.as_str()) {
                queue.push_back(&next.id);
            }
        }
    }

    for node in &definition.nodes {
        if !visited.contains(node.id.as_str()) {
            result.push(
                ValidationIssue::warning(
                    IssueCode::UnreachableNode,
                    format!(
                        "{} node '{}' is not reachable from START",
                        node.kind(),
                        node.display_name()
                    ),
                )
                .on_node(&node.id)
                .escalate_if(config.unreachable_is_error),
            );
        }
    }
}
