use crate::routing::{ConditionTrace, Selection, SelectionReason, split_list};

/// Formats routing traces into human-readable explanations.
pub struct TraceFormatter;

impl TraceFormatter {
    /// Explains a single condition, e.g. `AMOUNT (was 1500) > 1000`.
    pub fn format_condition(trace: &ConditionTrace) -> String {
        let actual = match &trace.actual {
            Some(value) => format!("(was {})", value),
            None => "(missing)".to_string(),
        };
        let expected = if trace.operator.is_list() {
            format!("[{}]", split_list(&trace.expected).join(", "))
        } else {
            trace.expected.clone()
        };
        format!(
            "{} {} {} {}",
            trace.field,
            actual,
            trace.operator.symbol(),
            expected
        )
    }

    /// Explains why an edge was selected.
    pub fn format_selection(selection: &Selection<'_>) -> String {
        let reason = match &selection.reason {
            SelectionReason::Matched(trace) => Self::format_condition(trace),
            SelectionReason::Unconditional => "unconditional".to_string(),
            SelectionReason::Default => {
                if selection.rejected.is_empty() {
                    "default".to_string()
                } else {
                    // Show what failed so the fallback is explainable.
                    let failed = selection
                        .rejected
                        .iter()
                        .map(|(_, trace)| Self::format_condition(trace))
                        .collect::<Vec<_>>()
                        .join("; ");
                    format!("default (no match: {})", failed)
                }
            }
        };
        format!("edge '{}': {}", selection.edge.id, reason)
    }
}
