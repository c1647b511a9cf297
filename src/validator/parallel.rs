use super::{GraphIndex, IssueCode, ValidationIssue, ValidationResult};
use crate::model::{Edge, NodeKind, WorkflowDefinition};
use ahash::AHashSet;
use std::collections::BTreeSet;

/// Where one branch of a fork can end up, ignoring edge predicates.
#[derive(Debug, Default)]
struct BranchReach<'a> {
    /// Joins reached at the fork's own nesting level.
    joins: BTreeSet<&'a str>,
    /// Whether END is reachable without passing a matching join.
    escapes: bool,
}

/// Best-effort fork/join balance. Conditions make exact analysis undecidable,
/// so every finding here is a warning.
pub(super) fn check_balance(
    definition: &WorkflowDefinition,
    index: &GraphIndex<'_>,
    result: &mut ValidationResult,
) {
    // Nesting deeper than the node count can only come from a cycle.
    let depth_limit = definition.nodes.len();

    for fork in definition.nodes_of_kind(NodeKind::ParallelStart) {
        let branches = index.outgoing(&fork.id);
        if branches.len() == 1 {
            result.push(
                ValidationIssue::warning(
                    IssueCode::ParallelBalance,
                    "PARALLEL_START has a single branch; the fork has no effect",
                )
                .on_node(&fork.id),
            );
        }

        let reaches: Vec<(&Edge, BranchReach<'_>)> = branches
            .iter()
            .map(|&edge| (edge, explore(index, edge, depth_limit)))
            .collect();

        for (edge, reach) in &reaches {
            if reach.joins.is_empty() {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::ParallelBalance,
                        "branch never reaches a matching PARALLEL_JOIN",
                    )
                    .on_node(&fork.id)
                    .on_edge(&edge.id),
                );
            } else if reach.escapes {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::ParallelBalance,
                        "branch can reach END before its PARALLEL_JOIN",
                    )
                    .on_node(&fork.id)
                    .on_edge(&edge.id),
                );
            }
        }

        if reaches.len() > 1 && reaches.iter().all(|(_, r)| !r.joins.is_empty()) {
            let mut common = reaches[0].1.joins.clone();
            for (_, reach) in &reaches[1..] {
                common.retain(|join| reach.joins.contains(join));
            }
            if common.is_empty() {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::ParallelBalance,
                        "branches do not converge on a common PARALLEL_JOIN",
                    )
                    .on_node(&fork.id),
                );
            }
        }
    }
}

/// Depth-first walk from a branch edge. Nested forks raise the nesting depth
/// and their joins lower it; only a join met at depth zero closes the branch.
fn explore<'a>(index: &GraphIndex<'a>, branch: &'a Edge, depth_limit: usize) -> BranchReach<'a> {
    let mut reach = BranchReach::default();
    let mut visited: AHashSet<(&str, usize)> = AHashSet::new();
    let mut stack: Vec<(&'a str, usize)> = vec![(branch.to_node_id.as_str(), 0)];

    while let Some((id, depth)) = stack.pop() {
        if depth > depth_limit || !visited.insert((id, depth)) {
            continue;
        }
        let Some(node) = index.node(id) else {
            continue;
        };

        let next_depth = match node.kind() {
            NodeKind::ParallelJoin if depth == 0 => {
                reach.joins.insert(&node.id);
                continue;
            }
            NodeKind::ParallelJoin => depth - 1,
            NodeKind::ParallelStart => depth + 1,
            NodeKind::End => {
                if depth == 0 {
                    reach.escapes = true;
                }
                continue;
            }
            _ => depth,
        };

        for next in index.successors(id) {
            stack.push((&next.id, next_depth));
        }
    }

    reach
}
