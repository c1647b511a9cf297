use super::{GraphIndex, IssueCode, ValidationIssue, ValidationResult};
use crate::config::ValidationConfig;
use crate::model::{Edge, NodeKind, WorkflowDefinition, parse_decimal};
use crate::routing::split_list;

/// Per-source checks on outgoing edges: default uniqueness, condition
/// completeness and literals, and branches the selection rule can never take.
pub(super) fn check_outgoing(
    definition: &WorkflowDefinition,
    index: &GraphIndex<'_>,
    config: &ValidationConfig,
    result: &mut ValidationResult,
) {
    for node in &definition.nodes {
        let outgoing = index.outgoing(&node.id);
        if outgoing.is_empty() {
            continue;
        }
        let branching = node.kind() == NodeKind::Condition;

        let defaults: Vec<&Edge> = outgoing.iter().copied().filter(|e| e.is_default).collect();
        if defaults.len() > 1 {
            for edge in &defaults {
                result.push(
                    ValidationIssue::error(
                        IssueCode::MultipleDefaults,
                        format!(
                            "node '{}' has {} default edges, at most one is allowed",
                            node.id,
                            defaults.len()
                        ),
                    )
                    .on_node(&node.id)
                    .on_edge(&edge.id)
                    .with_field("isDefault"),
                );
            }
        }

        for edge in outgoing {
            if edge.is_default {
                check_default(edge, branching, result);
            } else {
                check_condition(edge, branching, result);
            }
        }

        if branching {
            check_branches(&node.id, outgoing, config, result);
        }
    }
}

fn check_default(edge: &Edge, branching: bool, result: &mut ValidationResult) {
    if edge.has_condition() {
        result.push(
            ValidationIssue::warning(
                IssueCode::IgnoredCondition,
                "condition on a default edge is never evaluated",
            )
            .on_edge(&edge.id),
        );
    }
    if !branching {
        result.push(
            ValidationIssue::warning(
                IssueCode::IneffectiveDefault,
                format!(
                    "default flag has no effect on edges leaving non-CONDITION node '{}'",
                    edge.from_node_id
                ),
            )
            .on_edge(&edge.id)
            .with_field("isDefault"),
        );
    }
}

fn check_condition(edge: &Edge, branching: bool, result: &mut ValidationResult) {
    if !edge.has_condition() {
        return;
    }

    let components = [
        ("conditionField", edge.condition_field.is_some()),
        ("conditionOperator", edge.condition_operator.is_some()),
        ("conditionValue", edge.condition_value.is_some()),
    ];
    for (field, present) in components {
        if !present {
            result.push(
                ValidationIssue::error(
                    IssueCode::IncompleteCondition,
                    format!("conditional edge is missing {}", field),
                )
                .on_edge(&edge.id)
                .with_field(field),
            );
        }
    }

    if let Some(condition) = edge.condition() {
        if condition.operator.is_numeric() && parse_decimal(&condition.value).is_none() {
            result.push(
                ValidationIssue::warning(
                    IssueCode::NonNumericOperand,
                    format!(
                        "'{}' is not a number, so {} {} always evaluates false",
                        condition.value, condition.field, condition.operator
                    ),
                )
                .on_edge(&edge.id)
                .with_field("conditionValue"),
            );
        }
        if condition.operator.is_list() && split_list(&condition.value).is_empty() {
            result.push(
                ValidationIssue::error(
                    IssueCode::EmptyList,
                    format!("{} requires at least one list item", condition.operator),
                )
                .on_edge(&edge.id)
                .with_field("conditionValue"),
            );
        }
    }

    if !branching {
        result.push(
            ValidationIssue::warning(
                IssueCode::IgnoredCondition,
                format!(
                    "condition on an edge leaving non-CONDITION node '{}' is never evaluated",
                    edge.from_node_id
                ),
            )
            .on_edge(&edge.id),
        );
    }
}

/// Shadowing and missing fallback on a CONDITION node. `outgoing` is in
/// evaluation order.
fn check_branches(
    node_id: &str,
    outgoing: &[&Edge],
    config: &ValidationConfig,
    result: &mut ValidationResult,
) {
    let catch_all = outgoing
        .iter()
        .position(|e| !e.is_default && !e.has_condition());

    if let Some(position) = catch_all {
        let shadowing = &outgoing[position].id;
        for edge in &outgoing[position + 1..] {
            result.push(
                ValidationIssue::warning(
                    IssueCode::ShadowedEdge,
                    format!(
                        "edge can never be taken: unconditional edge '{}' is evaluated first",
                        shadowing
                    ),
                )
                .on_node(node_id)
                .on_edge(&edge.id),
            );
        }
    } else if config.warn_missing_default && !outgoing.iter().any(|e| e.is_default) {
        result.push(
            ValidationIssue::warning(
                IssueCode::MissingDefault,
                "CONDITION node has no default edge; an unmatched request is a routing dead-end",
            )
            .on_node(node_id),
        );
    }
}
