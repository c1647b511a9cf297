use crate::model::{
    ApproverType, ConditionField, ConditionOperator, Edge, Node, NodeBody, OrgRelation,
    ParallelMode, Position,
};
use crate::registry::Attribute;

/// A partial update for a node.
///
/// Each attribute is `None` to leave it alone, `Some(None)` to clear it and
/// `Some(Some(v))` to set it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<Option<String>>,
    pub position: Option<Position>,
    pub approver_type: Option<Option<ApproverType>>,
    pub approver_id: Option<Option<String>>,
    pub org_relation: Option<Option<OrgRelation>>,
    pub org_level_up: Option<Option<i32>>,
    pub custom_field_name: Option<Option<String>>,
    pub parallel_mode: Option<Option<ParallelMode>>,
}

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(Some(name.into()));
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position::new(x, y));
        self
    }

    pub fn approver_type(mut self, approver_type: ApproverType) -> Self {
        self.approver_type = Some(Some(approver_type));
        self
    }

    pub fn approver_id(mut self, approver_id: impl Into<String>) -> Self {
        self.approver_id = Some(Some(approver_id.into()));
        self
    }

    pub fn org_relation(mut self, relation: OrgRelation) -> Self {
        self.org_relation = Some(Some(relation));
        self
    }

    pub fn org_level_up(mut self, levels: i32) -> Self {
        self.org_level_up = Some(Some(levels));
        self
    }

    pub fn custom_field_name(mut self, field_name: impl Into<String>) -> Self {
        self.custom_field_name = Some(Some(field_name.into()));
        self
    }

    pub fn parallel_mode(mut self, mode: ParallelMode) -> Self {
        self.parallel_mode = Some(Some(mode));
        self
    }

    /// Clears an optional attribute.
    pub fn clear(mut self, attribute: Attribute) -> Self {
        match attribute {
            Attribute::ApproverType => self.approver_type = Some(None),
            Attribute::ApproverId => self.approver_id = Some(None),
            Attribute::OrgRelation => self.org_relation = Some(None),
            Attribute::OrgLevelUp => self.org_level_up = Some(None),
            Attribute::CustomFieldName => self.custom_field_name = Some(None),
            Attribute::ParallelMode => self.parallel_mode = Some(None),
        }
        self
    }

    pub fn clear_name(mut self) -> Self {
        self.name = Some(None);
        self
    }

    /// Attributes this patch assigns a value to. Clearing is not assigning.
    pub(crate) fn assigned(&self) -> Vec<Attribute> {
        [
            (Attribute::ApproverType, matches!(self.approver_type, Some(Some(_)))),
            (Attribute::ApproverId, matches!(self.approver_id, Some(Some(_)))),
            (Attribute::OrgRelation, matches!(self.org_relation, Some(Some(_)))),
            (Attribute::OrgLevelUp, matches!(self.org_level_up, Some(Some(_)))),
            (
                Attribute::CustomFieldName,
                matches!(self.custom_field_name, Some(Some(_))),
            ),
            (Attribute::ParallelMode, matches!(self.parallel_mode, Some(Some(_)))),
        ]
        .into_iter()
        .filter_map(|(attribute, set)| set.then_some(attribute))
        .collect()
    }

    /// Merges the patch into a node. Attributes the node's kind does not carry
    /// must have been rejected beforehand; clearing them is a no-op.
    pub(crate) fn apply(self, node: &mut Node) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(position) = self.position {
            node.position = position;
        }
        match &mut node.body {
            NodeBody::Approval(attributes) => {
                merge(&mut attributes.approver_type, self.approver_type);
                merge(&mut attributes.approver_id, self.approver_id);
                merge(&mut attributes.org_relation, self.org_relation);
                merge(&mut attributes.org_level_up, self.org_level_up);
                merge(&mut attributes.custom_field_name, self.custom_field_name);
            }
            NodeBody::ParallelStart { parallel_mode } => merge(parallel_mode, self.parallel_mode),
            _ => {}
        }
    }
}

/// A partial update for an edge's condition, default flag and order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub condition_field: Option<Option<ConditionField>>,
    pub condition_operator: Option<Option<ConditionOperator>>,
    pub condition_value: Option<Option<String>>,
    pub is_default: Option<bool>,
    pub sort_order: Option<i32>,
}

impl EdgePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets all three condition components.
    pub fn condition(
        mut self,
        field: ConditionField,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> Self {
        self.condition_field = Some(Some(field));
        self.condition_operator = Some(Some(operator));
        self.condition_value = Some(Some(value.into()));
        self
    }

    pub fn condition_field(mut self, field: ConditionField) -> Self {
        self.condition_field = Some(Some(field));
        self
    }

    pub fn condition_operator(mut self, operator: ConditionOperator) -> Self {
        self.condition_operator = Some(Some(operator));
        self
    }

    pub fn condition_value(mut self, value: impl Into<String>) -> Self {
        self.condition_value = Some(Some(value.into()));
        self
    }

    pub fn clear_condition(mut self) -> Self {
        self.condition_field = Some(None);
        self.condition_operator = Some(None);
        self.condition_value = Some(None);
        self
    }

    pub fn default_edge(mut self, is_default: bool) -> Self {
        self.is_default = Some(is_default);
        self
    }

    pub fn sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = Some(sort_order);
        self
    }

    pub(crate) fn apply(self, edge: &mut Edge) {
        merge(&mut edge.condition_field, self.condition_field);
        merge(&mut edge.condition_operator, self.condition_operator);
        merge(&mut edge.condition_value, self.condition_value);
        if let Some(is_default) = self.is_default {
            edge.is_default = is_default;
        }
        if let Some(sort_order) = self.sort_order {
            edge.sort_order = sort_order;
        }
    }
}

fn merge<T>(slot: &mut Option<T>, update: Option<Option<T>>) {
    if let Some(value) = update {
        *slot = value;
    }
}
