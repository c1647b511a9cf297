use crate::context::RequestContext;
use crate::model::{Condition, ConditionField, ConditionOperator, Value, parse_decimal};

/// Delimiter for IN / NOT_IN value lists.
pub const LIST_DELIMITER: char = ',';

// Numeric comparison; a non-numeric side makes the predicate false.
macro_rules! compare_numbers {
    ($actual:expr, $expected:expr, $op:tt) => {
        match ($actual.as_number(), parse_decimal($expected)) {
            (Some(a), Some(b)) => a $op b,
            _ => false,
        }
    };
}

/// A record of how one condition was evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTrace {
    pub field: ConditionField,
    pub operator: ConditionOperator,
    pub expected: String,
    /// The context value, `None` when the field was absent.
    pub actual: Option<Value>,
    pub outcome: bool,
}

/// Splits an IN / NOT_IN literal into trimmed, non-empty items.
pub fn split_list(raw: &str) -> Vec<&str> {
    raw.split(LIST_DELIMITER)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Evaluates a condition against a context. Never fails: a missing field or
/// an unparsable number yields `false`.
pub fn evaluate(condition: &Condition, context: &RequestContext) -> ConditionTrace {
    let actual = context.get(condition.field).cloned();
    let outcome = match &actual {
        Some(value) => test(condition.operator, value, &condition.value),
        None => false,
    };
    ConditionTrace {
        field: condition.field,
        operator: condition.operator,
        expected: condition.value.clone(),
        actual,
        outcome,
    }
}

/// Normalizes one side of an equality or membership test. Numeric text is
/// printed the way `Value::Number` prints, so `"1500.0"` and `1500` agree.
fn normalize(raw: &str) -> String {
    match parse_decimal(raw) {
        Some(n) => Value::Number(n).to_string(),
        None => raw.to_string(),
    }
}

fn test(operator: ConditionOperator, actual: &Value, expected: &str) -> bool {
    match operator {
        ConditionOperator::Equals => normalize(&actual.to_string()) == normalize(expected),
        ConditionOperator::NotEquals => normalize(&actual.to_string()) != normalize(expected),
        ConditionOperator::GreaterThan => compare_numbers!(actual, expected, >),
        ConditionOperator::LessThan => compare_numbers!(actual, expected, <),
        ConditionOperator::GreaterOrEqual => compare_numbers!(actual, expected, >=),
        ConditionOperator::LessOrEqual => compare_numbers!(actual, expected, <=),
        ConditionOperator::Contains => actual.to_string().contains(expected),
        ConditionOperator::In => {
            let actual = normalize(&actual.to_string());
            split_list(expected).into_iter().any(|item| normalize(item) == actual)
        }
        ConditionOperator::NotIn => {
            let actual = normalize(&actual.to_string());
            !split_list(expected).into_iter().any(|item| normalize(item) == actual)
        }
    }
}
