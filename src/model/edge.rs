use serde::{Deserialize, Serialize};
use std::fmt;

/// Request fields an edge condition can test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionField {
    Amount,
    RequestType,
    SubType,
    ApplicantDepartment,
    ApplicantPosition,
    ApplicantLevel,
    CustomField,
}

impl ConditionField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionField::Amount => "AMOUNT",
            ConditionField::RequestType => "REQUEST_TYPE",
            ConditionField::SubType => "SUB_TYPE",
            ConditionField::ApplicantDepartment => "APPLICANT_DEPARTMENT",
            ConditionField::ApplicantPosition => "APPLICANT_POSITION",
            ConditionField::ApplicantLevel => "APPLICANT_LEVEL",
            ConditionField::CustomField => "CUSTOM_FIELD",
        }
    }
}

impl fmt::Display for ConditionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    GreaterOrEqual,
    LessOrEqual,
    Contains,
    In,
    NotIn,
}

impl ConditionOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            ConditionOperator::Equals => "==",
            ConditionOperator::NotEquals => "!=",
            ConditionOperator::GreaterThan => ">",
            ConditionOperator::LessThan => "<",
            ConditionOperator::GreaterOrEqual => ">=",
            ConditionOperator::LessOrEqual => "<=",
            ConditionOperator::Contains => "contains",
            ConditionOperator::In => "in",
            ConditionOperator::NotIn => "not in",
        }
    }

    /// Operators that compare both sides as decimals.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ConditionOperator::GreaterThan
                | ConditionOperator::LessThan
                | ConditionOperator::GreaterOrEqual
                | ConditionOperator::LessOrEqual
        )
    }

    /// Operators whose value is a delimited list.
    pub fn is_list(&self) -> bool {
        matches!(self, ConditionOperator::In | ConditionOperator::NotIn)
    }
}

impl fmt::Display for ConditionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A complete edge guard: field, operator and literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub value: String,
}

/// A directed transition between two nodes.
///
/// The three condition components are stored independently so that the
/// editor can hold a half-filled condition; the validator reports incomplete
/// ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: String,
    pub from_node_id: String,
    pub to_node_id: String,
    pub condition_field: Option<ConditionField>,
    pub condition_operator: Option<ConditionOperator>,
    pub condition_value: Option<String>,
    pub is_default: bool,
    pub sort_order: i32,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        from_node_id: impl Into<String>,
        to_node_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            from_node_id: from_node_id.into(),
            to_node_id: to_node_id.into(),
            condition_field: None,
            condition_operator: None,
            condition_value: None,
            is_default: false,
            sort_order: 0,
        }
    }

    pub fn when(
        mut self,
        field: ConditionField,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> Self {
        self.condition_field = Some(field);
        self.condition_operator = Some(operator);
        self.condition_value = Some(value.into());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// True when any condition component is present.
    pub fn has_condition(&self) -> bool {
        self.condition_field.is_some()
            || self.condition_operator.is_some()
            || self.condition_value.is_some()
    }

    /// The guard, if all three components are present.
    pub fn condition(&self) -> Option<Condition> {
        match (
            self.condition_field,
            self.condition_operator,
            &self.condition_value,
        ) {
            (Some(field), Some(operator), Some(value)) => Some(Condition {
                field,
                operator,
                value: value.clone(),
            }),
            _ => None,
        }
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.from_node_id == node_id || self.to_node_id == node_id
    }
}
