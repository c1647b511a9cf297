use super::{IssueCode, ValidationIssue, ValidationResult};
use crate::model::WorkflowDefinition;
use crate::registry::check_approval;

pub(super) fn check_approvers(definition: &WorkflowDefinition, result: &mut ValidationResult) {
    for node in &definition.nodes {
        let Some(attributes) = node.approval_attributes() else {
            continue;
        };
        for issue in check_approval(attributes) {
            result.push(
                ValidationIssue::error(IssueCode::ApproverAttributes, issue.message)
                    .on_node(&node.id)
                    .with_field(issue.attribute.name()),
            );
        }
    }
}

/// Scope keys only affect which requests the definition applies to, so
/// problems there never block saving.
pub(super) fn check_scope(definition: &WorkflowDefinition, result: &mut ValidationResult) {
    for issue in definition.info.scope_issues() {
        result.push(
            ValidationIssue::warning(IssueCode::ScopeKeys, issue.message).with_field(issue.field),
        );
    }
}
