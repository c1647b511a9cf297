use crate::registry::spec_for;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The six step kinds a workflow graph is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeKind {
    Start,
    End,
    Approval,
    Condition,
    ParallelStart,
    ParallelJoin,
}

impl NodeKind {
    pub const ALL: [NodeKind; 6] = [
        NodeKind::Start,
        NodeKind::End,
        NodeKind::Approval,
        NodeKind::Condition,
        NodeKind::ParallelStart,
        NodeKind::ParallelJoin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Start => "START",
            NodeKind::End => "END",
            NodeKind::Approval => "APPROVAL",
            NodeKind::Condition => "CONDITION",
            NodeKind::ParallelStart => "PARALLEL_START",
            NodeKind::ParallelJoin => "PARALLEL_JOIN",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the approver of an APPROVAL node is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApproverType {
    SpecificEmployee,
    Position,
    Role,
    OrgRelation,
    DepartmentHead,
    CustomField,
}

impl ApproverType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApproverType::SpecificEmployee => "SPECIFIC_EMPLOYEE",
            ApproverType::Position => "POSITION",
            ApproverType::Role => "ROLE",
            ApproverType::OrgRelation => "ORG_RELATION",
            ApproverType::DepartmentHead => "DEPARTMENT_HEAD",
            ApproverType::CustomField => "CUSTOM_FIELD",
        }
    }
}

impl fmt::Display for ApproverType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Organizational relation between the applicant and the approver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgRelation {
    DirectSupervisor,
    DepartmentManager,
    NLevelUp,
}

impl OrgRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrgRelation::DirectSupervisor => "DIRECT_SUPERVISOR",
            OrgRelation::DepartmentManager => "DEPARTMENT_MANAGER",
            OrgRelation::NLevelUp => "N_LEVEL_UP",
        }
    }
}

impl fmt::Display for OrgRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Completion policy of a parallel fork, applied at its join.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParallelMode {
    #[default]
    All,
    Any,
    Majority,
}

impl ParallelMode {
    /// Number of arrivals needed before the join advances.
    pub fn required_arrivals(&self, branches: usize) -> usize {
        match self {
            ParallelMode::All => branches,
            ParallelMode::Any => 1.min(branches),
            ParallelMode::Majority => branches / 2 + 1,
        }
    }
}

/// Canvas coordinates. Authoring metadata only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Approver attributes as authored. Every field is optional so that partially
/// filled forms can be stored; consistency is checked by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApprovalAttributes {
    pub approver_type: Option<ApproverType>,
    pub approver_id: Option<String>,
    pub org_relation: Option<OrgRelation>,
    pub org_level_up: Option<i32>,
    pub custom_field_name: Option<String>,
}

impl ApprovalAttributes {
    pub fn specific_employee(employee_id: impl Into<String>) -> Self {
        Self {
            approver_type: Some(ApproverType::SpecificEmployee),
            approver_id: Some(employee_id.into()),
            ..Default::default()
        }
    }

    pub fn org_relation(relation: OrgRelation, levels_up: Option<i32>) -> Self {
        Self {
            approver_type: Some(ApproverType::OrgRelation),
            org_relation: Some(relation),
            org_level_up: levels_up,
            ..Default::default()
        }
    }

    pub fn custom_field(field_name: impl Into<String>) -> Self {
        Self {
            approver_type: Some(ApproverType::CustomField),
            custom_field_name: Some(field_name.into()),
            ..Default::default()
        }
    }

    pub fn department_head() -> Self {
        Self {
            approver_type: Some(ApproverType::DepartmentHead),
            ..Default::default()
        }
    }
}

/// Kind-specific payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Start,
    End,
    Approval(ApprovalAttributes),
    Condition,
    ParallelStart { parallel_mode: Option<ParallelMode> },
    ParallelJoin,
}

impl NodeBody {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeBody::Start => NodeKind::Start,
            NodeBody::End => NodeKind::End,
            NodeBody::Approval(_) => NodeKind::Approval,
            NodeBody::Condition => NodeKind::Condition,
            NodeBody::ParallelStart { .. } => NodeKind::ParallelStart,
            NodeBody::ParallelJoin => NodeKind::ParallelJoin,
        }
    }

    /// Empty body for a kind, with every optional attribute unset.
    pub fn empty(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Start => NodeBody::Start,
            NodeKind::End => NodeBody::End,
            NodeKind::Approval => NodeBody::Approval(ApprovalAttributes::default()),
            NodeKind::Condition => NodeBody::Condition,
            NodeKind::ParallelStart => NodeBody::ParallelStart {
                parallel_mode: None,
            },
            NodeKind::ParallelJoin => NodeBody::ParallelJoin,
        }
    }
}

/// A vertex of the workflow graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub name: Option<String>,
    pub position: Position,
    pub body: NodeBody,
}

impl Node {
    pub fn new(id: impl Into<String>, body: NodeBody) -> Self {
        Self {
            id: id.into(),
            name: None,
            position: Position::default(),
            body,
        }
    }

    pub fn start(id: impl Into<String>) -> Self {
        Self::new(id, NodeBody::Start)
    }

    pub fn end(id: impl Into<String>) -> Self {
        Self::new(id, NodeBody::End)
    }

    pub fn approval(id: impl Into<String>, attributes: ApprovalAttributes) -> Self {
        Self::new(id, NodeBody::Approval(attributes))
    }

    pub fn condition(id: impl Into<String>) -> Self {
        Self::new(id, NodeBody::Condition)
    }

    pub fn parallel_start(id: impl Into<String>, parallel_mode: Option<ParallelMode>) -> Self {
        Self::new(id, NodeBody::ParallelStart { parallel_mode })
    }

    pub fn parallel_join(id: impl Into<String>) -> Self {
        Self::new(id, NodeBody::ParallelJoin)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn at(mut self, x: f64, y: f64) -> Self {
        self.position = Position::new(x, y);
        self
    }

    pub fn kind(&self) -> NodeKind {
        self.body.kind()
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn approval_attributes(&self) -> Option<&ApprovalAttributes> {
        match &self.body {
            NodeBody::Approval(attributes) => Some(attributes),
            _ => None,
        }
    }

    /// The effective fork policy, falling back to the registry default.
    /// `None` unless this is a PARALLEL_START.
    pub fn parallel_mode(&self) -> Option<ParallelMode> {
        match &self.body {
            NodeBody::ParallelStart { parallel_mode } => {
                parallel_mode.or(spec_for(NodeKind::ParallelStart).parallel_mode)
            }
            _ => None,
        }
    }

    /// START and END nodes can never be deleted from a definition.
    pub fn is_protected(&self) -> bool {
        spec_for(self.kind()).protected
    }
}
