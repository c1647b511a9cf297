use crate::model::{
    ApproverType, ConditionField, ConditionOperator, NodeKind, OrgRelation, ParallelMode,
};
use serde::{Deserialize, Serialize};

/// Flat node record exchanged with the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    pub node_type: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_type: Option<ApproverType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_relation: Option<OrgRelation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_level_up: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_mode: Option<ParallelMode>,
    #[serde(default)]
    pub pos_x: f64,
    #[serde(default)]
    pub pos_y: f64,
}

impl NodeRecord {
    pub fn new(id: impl Into<String>, node_type: NodeKind) -> Self {
        Self {
            id: id.into(),
            node_type,
            name: None,
            approver_type: None,
            approver_id: None,
            org_relation: None,
            org_level_up: None,
            custom_field_name: None,
            parallel_mode: None,
            pos_x: 0.0,
            pos_y: 0.0,
        }
    }
}

/// Flat edge record exchanged with the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_field: Option<ConditionField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_operator: Option<ConditionOperator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_value: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub sort_order: i32,
}

/// The full node/edge payload of one definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphRecords {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}
