use super::records::{EdgeRecord, GraphRecords, NodeRecord};
use crate::error::RecordConversionError;
use crate::model::{
    ApprovalAttributes, DefinitionInfo, Edge, Node, NodeBody, NodeKind, Position,
    WorkflowDefinition,
};
use crate::registry::{Attribute, spec_for};

/// A trait for data models that can be converted into a `WorkflowDefinition`.
///
/// Host applications that keep workflow graphs in their own shape implement
/// this to hand them to the store, the validator or the execution graph.
///
/// # Example
///
/// ```rust,no_run
/// use kessai::prelude::*;
/// use kessai::error::RecordConversionError;
///
/// struct Step { id: String, is_first: bool }
/// struct Legacy { steps: Vec<Step> }
///
/// impl IntoGraph for Legacy {
///     fn into_graph(self) -> std::result::Result<WorkflowDefinition, RecordConversionError> {
///         let nodes = self
///             .steps
///             .into_iter()
///             .map(|s| if s.is_first { Node::start(s.id) } else { Node::end(s.id) })
///             .collect();
///         Ok(WorkflowDefinition::new(DefinitionInfo::default(), nodes, vec![]))
///     }
/// }
/// ```
pub trait IntoGraph {
    /// Consumes the object and converts it into a workflow definition.
    fn into_graph(self) -> Result<WorkflowDefinition, RecordConversionError>;
}

impl IntoGraph for GraphRecords {
    fn into_graph(self) -> Result<WorkflowDefinition, RecordConversionError> {
        records_into_definition(DefinitionInfo::default(), self)
    }
}

pub(crate) fn records_into_definition(
    info: DefinitionInfo,
    records: GraphRecords,
) -> Result<WorkflowDefinition, RecordConversionError> {
    let nodes = records
        .nodes
        .into_iter()
        .map(Node::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let edges = records.edges.into_iter().map(Edge::from).collect();
    Ok(WorkflowDefinition::new(info, nodes, edges))
}

fn present_attributes(record: &NodeRecord) -> Vec<Attribute> {
    [
        (Attribute::ApproverType, record.approver_type.is_some()),
        (Attribute::ApproverId, record.approver_id.is_some()),
        (Attribute::OrgRelation, record.org_relation.is_some()),
        (Attribute::OrgLevelUp, record.org_level_up.is_some()),
        (Attribute::CustomFieldName, record.custom_field_name.is_some()),
        (Attribute::ParallelMode, record.parallel_mode.is_some()),
    ]
    .into_iter()
    .filter_map(|(attribute, present)| present.then_some(attribute))
    .collect()
}

/// Rejects attributes the node kind does not accept instead of dropping them.
impl TryFrom<NodeRecord> for Node {
    type Error = RecordConversionError;

    fn try_from(record: NodeRecord) -> Result<Self, Self::Error> {
        let spec = spec_for(record.node_type);
        if let Some(attribute) = present_attributes(&record)
            .into_iter()
            .find(|a| !spec.allows(*a))
        {
            return Err(RecordConversionError::DisallowedAttribute {
                node_id: record.id,
                kind: record.node_type,
                attribute: attribute.name(),
            });
        }

        let body = match record.node_type {
            NodeKind::Approval => NodeBody::Approval(ApprovalAttributes {
                approver_type: record.approver_type,
                approver_id: record.approver_id,
                org_relation: record.org_relation,
                org_level_up: record.org_level_up,
                custom_field_name: record.custom_field_name,
            }),
            NodeKind::ParallelStart => NodeBody::ParallelStart {
                parallel_mode: record.parallel_mode,
            },
            kind => NodeBody::empty(kind),
        };

        Ok(Node {
            id: record.id,
            name: record.name,
            position: Position::new(record.pos_x, record.pos_y),
            body,
        })
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        let mut record = NodeRecord::new(node.id.clone(), node.kind());
        record.name = node.name.clone();
        record.pos_x = node.position.x;
        record.pos_y = node.position.y;
        match &node.body {
            NodeBody::Approval(attributes) => {
                record.approver_type = attributes.approver_type;
                record.approver_id = attributes.approver_id.clone();
                record.org_relation = attributes.org_relation;
                record.org_level_up = attributes.org_level_up;
                record.custom_field_name = attributes.custom_field_name.clone();
            }
            NodeBody::ParallelStart { parallel_mode } => record.parallel_mode = *parallel_mode,
            _ => {}
        }
        record
    }
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        Edge {
            id: record.id,
            from_node_id: record.from_node_id,
            to_node_id: record.to_node_id,
            condition_field: record.condition_field,
            condition_operator: record.condition_operator,
            condition_value: record.condition_value,
            is_default: record.is_default,
            sort_order: record.sort_order,
        }
    }
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        EdgeRecord {
            id: edge.id.clone(),
            from_node_id: edge.from_node_id.clone(),
            to_node_id: edge.to_node_id.clone(),
            condition_field: edge.condition_field,
            condition_operator: edge.condition_operator,
            condition_value: edge.condition_value.clone(),
            is_default: edge.is_default,
            sort_order: edge.sort_order,
        }
    }
}
