use crate::error::DocumentError;
use crate::model::{ConditionField, Value};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::fs;

/// Snapshot of the request fields that edge conditions are evaluated against.
///
/// The JSON form is an object keyed by field name:
/// `{"AMOUNT": 1500, "REQUEST_TYPE": "LEAVE"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestContext {
    values: AHashMap<ConditionField, Value>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: ConditionField, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    pub fn insert(&mut self, field: ConditionField, value: impl Into<Value>) {
        self.values.insert(field, value.into());
    }

    /// A field's value. `Null` counts as absent.
    pub fn get(&self, field: ConditionField) -> Option<&Value> {
        self.values.get(&field).filter(|v| !v.is_null())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a context from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }
}
