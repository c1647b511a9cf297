//! Node kind metadata shared by the store's lenient write path and the
//! validator's strict checks.

use crate::model::{ApprovalAttributes, ApproverType, NodeKind, OrgRelation, ParallelMode};
use std::fmt;

/// Optional, kind-specific node attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    ApproverType,
    ApproverId,
    OrgRelation,
    OrgLevelUp,
    CustomFieldName,
    ParallelMode,
}

impl Attribute {
    /// The record field name, used in field-level messages.
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::ApproverType => "approverType",
            Attribute::ApproverId => "approverId",
            Attribute::OrgRelation => "orgRelation",
            Attribute::OrgLevelUp => "orgLevelUp",
            Attribute::CustomFieldName => "customFieldName",
            Attribute::ParallelMode => "parallelMode",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Allowed number of edges on one side of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degree {
    Zero,
    ExactlyOne,
    AtLeastOne,
    AtLeastTwo,
}

impl Degree {
    pub fn admits(&self, count: usize) -> bool {
        match self {
            Degree::Zero => count == 0,
            Degree::ExactlyOne => count == 1,
            Degree::AtLeastOne => count >= 1,
            Degree::AtLeastTwo => count >= 2,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Degree::Zero => "no",
            Degree::ExactlyOne => "exactly one",
            Degree::AtLeastOne => "at least one",
            Degree::AtLeastTwo => "at least two",
        }
    }
}

/// Registry entry for one node kind.
#[derive(Debug, PartialEq)]
pub struct NodeKindSpec {
    pub kind: NodeKind,
    pub attributes: &'static [Attribute],
    pub outgoing: Degree,
    pub incoming: Degree,
    pub protected: bool,
    pub parallel_mode: Option<ParallelMode>,
}

impl NodeKindSpec {
    pub fn allows(&self, attribute: Attribute) -> bool {
        self.attributes.contains(&attribute)
    }
}

/// Defines the registry table and its lookup function.
macro_rules! define_node_kinds {
    (@mode $mode:ident) => { Some(ParallelMode::$mode) };
    (@mode) => { None };
    ( $( $kind:ident {
            attributes: [$($attr:ident),* $(,)?],
            outgoing: $out:ident,
            incoming: $inc:ident,
            protected: $protected:literal
            $(, parallel_mode: $mode:ident)? $(,)?
        } ),* $(,)? ) => {
        /// Returns the registry entry for a node kind.
        pub fn spec_for(kind: NodeKind) -> &'static NodeKindSpec {
            match kind {
                $( NodeKind::$kind => &NodeKindSpec {
                    kind: NodeKind::$kind,
                    attributes: &[$(Attribute::$attr),*],
                    outgoing: Degree::$out,
                    incoming: Degree::$inc,
                    protected: $protected,
                    parallel_mode: define_node_kinds!(@mode $($mode)?),
                }, )*
            }
        }
    };
}

define_node_kinds! {
    Start { attributes: [], outgoing: ExactlyOne, incoming: Zero, protected: true },
    End { attributes: [], outgoing: Zero, incoming: AtLeastOne, protected: true },
    Approval {
        attributes: [ApproverType, ApproverId, OrgRelation, OrgLevelUp, CustomFieldName],
        outgoing: ExactlyOne,
        incoming: AtLeastOne,
        protected: false,
    },
    Condition { attributes: [], outgoing: AtLeastOne, incoming: AtLeastOne, protected: false },
    ParallelStart {
        attributes: [ParallelMode],
        outgoing: AtLeastOne,
        incoming: AtLeastOne,
        protected: false,
        parallel_mode: All,
    },
    ParallelJoin { attributes: [], outgoing: ExactlyOne, incoming: AtLeastTwo, protected: false },
}

/// Approver attributes that participate in the per-type exclusion groups.
const APPROVER_ATTRIBUTES: [Attribute; 4] = [
    Attribute::ApproverId,
    Attribute::OrgRelation,
    Attribute::OrgLevelUp,
    Attribute::CustomFieldName,
];

/// Which approver attributes an approver type needs and tolerates.
/// Any other approver attribute is forbidden for that type.
#[derive(Debug, PartialEq)]
pub struct ApproverRule {
    pub approver_type: ApproverType,
    pub required: &'static [Attribute],
    pub optional: &'static [Attribute],
}

impl ApproverRule {
    pub fn forbids(&self, attribute: Attribute) -> bool {
        APPROVER_ATTRIBUTES.contains(&attribute)
            && !self.required.contains(&attribute)
            && !self.optional.contains(&attribute)
    }
}

pub fn approver_rule(approver_type: ApproverType) -> &'static ApproverRule {
    match approver_type {
        ApproverType::SpecificEmployee => &ApproverRule {
            approver_type: ApproverType::SpecificEmployee,
            required: &[Attribute::ApproverId],
            optional: &[],
        },
        ApproverType::Position => &ApproverRule {
            approver_type: ApproverType::Position,
            required: &[Attribute::ApproverId],
            optional: &[],
        },
        ApproverType::Role => &ApproverRule {
            approver_type: ApproverType::Role,
            required: &[Attribute::ApproverId],
            optional: &[],
        },
        ApproverType::OrgRelation => &ApproverRule {
            approver_type: ApproverType::OrgRelation,
            required: &[Attribute::OrgRelation],
            optional: &[Attribute::OrgLevelUp],
        },
        ApproverType::DepartmentHead => &ApproverRule {
            approver_type: ApproverType::DepartmentHead,
            required: &[],
            optional: &[],
        },
        ApproverType::CustomField => &ApproverRule {
            approver_type: ApproverType::CustomField,
            required: &[Attribute::CustomFieldName],
            optional: &[],
        },
    }
}

/// A field-level problem with an approval node's attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeIssue {
    pub attribute: Attribute,
    pub message: String,
}

/// The strict, resolved form of an approval node's approver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApproverSpec {
    SpecificEmployee { employee_id: String },
    Position { position_id: String },
    Role { role_id: String },
    OrgRelation {
        relation: OrgRelation,
        levels_up: Option<u32>,
    },
    DepartmentHead,
    CustomField { field_name: String },
}

fn present(attributes: &ApprovalAttributes, attribute: Attribute) -> bool {
    match attribute {
        Attribute::ApproverType => attributes.approver_type.is_some(),
        Attribute::ApproverId => attributes.approver_id.is_some(),
        Attribute::OrgRelation => attributes.org_relation.is_some(),
        Attribute::OrgLevelUp => attributes.org_level_up.is_some(),
        Attribute::CustomFieldName => attributes.custom_field_name.is_some(),
        Attribute::ParallelMode => false,
    }
}

fn blank(attributes: &ApprovalAttributes, attribute: Attribute) -> bool {
    let value = match attribute {
        Attribute::ApproverId => attributes.approver_id.as_deref(),
        Attribute::CustomFieldName => attributes.custom_field_name.as_deref(),
        _ => None,
    };
    value.is_some_and(|v| v.trim().is_empty())
}

/// Checks an approval node's attributes against the exclusion groups.
pub fn check_approval(attributes: &ApprovalAttributes) -> Vec<AttributeIssue> {
    let mut issues = Vec::new();

    let Some(approver_type) = attributes.approver_type else {
        issues.push(AttributeIssue {
            attribute: Attribute::ApproverType,
            message: "approval node requires an approverType".to_string(),
        });
        return issues;
    };
    let rule = approver_rule(approver_type);

    for &attribute in rule.required {
        if !present(attributes, attribute) {
            issues.push(AttributeIssue {
                attribute,
                message: format!("approverType {} requires {}", approver_type, attribute),
            });
        } else if blank(attributes, attribute) {
            issues.push(AttributeIssue {
                attribute,
                message: format!("{} must not be empty", attribute),
            });
        }
    }

    for attribute in APPROVER_ATTRIBUTES {
        if rule.forbids(attribute) && present(attributes, attribute) {
            issues.push(AttributeIssue {
                attribute,
                message: format!(
                    "{} is not allowed when approverType is {}",
                    attribute, approver_type
                ),
            });
        }
    }

    if approver_type == ApproverType::OrgRelation {
        match (attributes.org_relation, attributes.org_level_up) {
            (Some(OrgRelation::NLevelUp), None) => issues.push(AttributeIssue {
                attribute: Attribute::OrgLevelUp,
                message: "orgRelation N_LEVEL_UP requires orgLevelUp >= 1".to_string(),
            }),
            (Some(OrgRelation::NLevelUp), Some(levels)) if levels < 1 => {
                issues.push(AttributeIssue {
                    attribute: Attribute::OrgLevelUp,
                    message: format!(
                        "orgRelation N_LEVEL_UP requires orgLevelUp >= 1, found {}",
                        levels
                    ),
                })
            }
            (Some(relation), Some(_)) if relation != OrgRelation::NLevelUp => {
                issues.push(AttributeIssue {
                    attribute: Attribute::OrgLevelUp,
                    message: format!("orgLevelUp has no meaning for orgRelation {}", relation),
                })
            }
            _ => {}
        }
    }

    issues
}

/// Resolves the strict approver form, or returns every attribute problem.
pub fn resolve_approver(attributes: &ApprovalAttributes) -> Result<ApproverSpec, Vec<AttributeIssue>> {
    let issues = check_approval(attributes);
    if !issues.is_empty() {
        return Err(issues);
    }

    let approver_id = attributes.approver_id.clone();
    let resolved = match attributes.approver_type {
        Some(ApproverType::SpecificEmployee) => {
            approver_id.map(|employee_id| ApproverSpec::SpecificEmployee { employee_id })
        }
        Some(ApproverType::Position) => {
            approver_id.map(|position_id| ApproverSpec::Position { position_id })
        }
        Some(ApproverType::Role) => approver_id.map(|role_id| ApproverSpec::Role { role_id }),
        Some(ApproverType::OrgRelation) => {
            attributes
                .org_relation
                .map(|relation| ApproverSpec::OrgRelation {
                    relation,
                    levels_up: attributes.org_level_up.and_then(|n| u32::try_from(n).ok()),
                })
        }
        Some(ApproverType::DepartmentHead) => Some(ApproverSpec::DepartmentHead),
        Some(ApproverType::CustomField) => attributes
            .custom_field_name
            .clone()
            .map(|field_name| ApproverSpec::CustomField { field_name }),
        None => None,
    };

    resolved.ok_or_else(|| {
        vec![AttributeIssue {
            attribute: Attribute::ApproverType,
            message: "approver could not be resolved".to_string(),
        }]
    })
}
