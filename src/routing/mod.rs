//! The edge-selection rule shared by editor warnings and execution.
//!
//! Given a source node's outgoing edges and a request snapshot, non-default
//! edges are tried in ascending `sort_order` (ties broken by insertion order)
//! and the first one whose predicate holds is taken. If none matches, the
//! default edge is taken. If there is no default either, the request has hit a
//! routing dead-end, which is fatal for the engine.

use crate::context::RequestContext;
use crate::model::Edge;
use itertools::Itertools;

pub mod predicate;

pub use predicate::{ConditionTrace, LIST_DELIMITER, evaluate, split_list};

/// Why an edge was chosen.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionReason {
    /// The edge's condition held.
    Matched(ConditionTrace),
    /// The edge carries no condition and matches any request.
    Unconditional,
    /// No other edge matched; this is the fallback.
    Default,
}

/// The outcome of edge selection, with the conditions rejected on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'e> {
    pub edge: &'e Edge,
    pub reason: SelectionReason,
    pub rejected: Vec<(&'e Edge, ConditionTrace)>,
}

/// Orders edges for evaluation: non-default edges by `sort_order`, then the
/// default edge. The sort is stable, so input order breaks ties.
pub fn evaluation_order<'e, I>(edges: I) -> Vec<&'e Edge>
where
    I: IntoIterator<Item = &'e Edge>,
{
    edges
        .into_iter()
        .sorted_by_key(|e| (e.is_default, e.sort_order))
        .collect()
}

/// Applies the edge-selection rule. `edges` must be given in insertion order.
///
/// Returns `None` on a routing dead-end. The result depends only on the
/// edges and the context.
pub fn select_edge<'e>(edges: &[&'e Edge], context: &RequestContext) -> Option<Selection<'e>> {
    let ordered = evaluation_order(edges.iter().copied());
    let mut rejected = Vec::new();

    for edge in ordered.iter().copied().filter(|e| !e.is_default) {
        let reason = match edge.condition() {
            Some(condition) => {
                let trace = evaluate(&condition, context);
                if !trace.outcome {
                    rejected.push((edge, trace));
                    continue;
                }
                SelectionReason::Matched(trace)
            }
            // A half-filled condition never matches; an absent one always does.
            None if edge.has_condition() => continue,
            None => SelectionReason::Unconditional,
        };
        return Some(Selection {
            edge,
            reason,
            rejected,
        });
    }

    ordered
        .into_iter()
        .find(|e| e.is_default)
        .map(|edge| Selection {
            edge,
            reason: SelectionReason::Default,
            rejected,
        })
}
