//! Node kind registry and approver rule tests
use kessai::model::{ApprovalAttributes, ApproverType, Node, NodeKind, OrgRelation, ParallelMode};
use kessai::registry::{
    approver_rule, check_approval, resolve_approver, spec_for, ApproverSpec, Attribute, Degree,
};
use pretty_assertions::assert_eq;

fn failing_attributes(attributes: &ApprovalAttributes) -> Vec<Attribute> {
    check_approval(attributes)
        .into_iter()
        .map(|issue| issue.attribute)
        .collect()
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_every_kind_has_an_entry() {
        for kind in NodeKind::ALL {
            assert_eq!(spec_for(kind).kind, kind);
        }
    }

    #[test]
    fn test_only_terminals_are_protected() {
        let protected: Vec<NodeKind> = NodeKind::ALL
            .into_iter()
            .filter(|&kind| spec_for(kind).protected)
            .collect();
        assert_eq!(protected, vec![NodeKind::Start, NodeKind::End]);
        assert!(Node::start("s").is_protected());
        assert!(!Node::condition("c").is_protected());
    }

    #[test]
    fn test_degree_rules() {
        assert_eq!(spec_for(NodeKind::Start).incoming, Degree::Zero);
        assert_eq!(spec_for(NodeKind::End).outgoing, Degree::Zero);
        assert_eq!(spec_for(NodeKind::ParallelJoin).incoming, Degree::AtLeastTwo);
        assert!(Degree::AtLeastTwo.admits(3));
        assert!(!Degree::ExactlyOne.admits(2));
        assert_eq!(Degree::AtLeastOne.describe(), "at least one");
    }

    #[test]
    fn test_attribute_whitelist() {
        let approval = spec_for(NodeKind::Approval);
        assert!(approval.allows(Attribute::OrgRelation));
        assert!(!approval.allows(Attribute::ParallelMode));
        assert!(spec_for(NodeKind::ParallelStart).allows(Attribute::ParallelMode));
        assert!(spec_for(NodeKind::Condition).attributes.is_empty());
    }

    #[test]
    fn test_parallel_mode_defaults_from_registry() {
        assert_eq!(
            spec_for(NodeKind::ParallelStart).parallel_mode,
            Some(ParallelMode::All)
        );
        assert_eq!(
            Node::parallel_start("fork", None).parallel_mode(),
            Some(ParallelMode::All)
        );
        assert_eq!(
            Node::parallel_start("fork", Some(ParallelMode::Any)).parallel_mode(),
            Some(ParallelMode::Any)
        );
        assert_eq!(Node::condition("c").parallel_mode(), None);
    }

    #[test]
    fn test_approver_rules() {
        let rule = approver_rule(ApproverType::OrgRelation);
        assert!(!rule.forbids(Attribute::OrgLevelUp));
        assert!(rule.forbids(Attribute::ApproverId));
        assert!(approver_rule(ApproverType::DepartmentHead).forbids(Attribute::CustomFieldName));
    }

    #[test]
    fn test_check_approval_reports_each_attribute() {
        assert_eq!(
            failing_attributes(&ApprovalAttributes::default()),
            vec![Attribute::ApproverType]
        );

        let mut employee = ApprovalAttributes::specific_employee("  ");
        employee.org_relation = Some(OrgRelation::DirectSupervisor);
        assert_eq!(
            failing_attributes(&employee),
            vec![Attribute::ApproverId, Attribute::OrgRelation]
        );

        assert_eq!(
            failing_attributes(&ApprovalAttributes::org_relation(OrgRelation::NLevelUp, Some(0))),
            vec![Attribute::OrgLevelUp]
        );
        assert_eq!(
            failing_attributes(&ApprovalAttributes::org_relation(
                OrgRelation::DirectSupervisor,
                Some(2)
            )),
            vec![Attribute::OrgLevelUp]
        );
    }

    #[test]
    fn test_resolve_approver() {
        assert_eq!(
            resolve_approver(&ApprovalAttributes::org_relation(OrgRelation::NLevelUp, Some(2))),
            Ok(ApproverSpec::OrgRelation {
                relation: OrgRelation::NLevelUp,
                levels_up: Some(2),
            })
        );
        assert_eq!(
            resolve_approver(&ApprovalAttributes::custom_field("budget_owner")),
            Ok(ApproverSpec::CustomField {
                field_name: "budget_owner".to_string()
            })
        );
        assert_eq!(
            resolve_approver(&ApprovalAttributes::department_head()),
            Ok(ApproverSpec::DepartmentHead)
        );

        let issues = resolve_approver(&ApprovalAttributes::default()).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].message, "approval node requires an approverType");
    }
}
