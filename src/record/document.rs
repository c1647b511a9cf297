use super::conversion::{IntoGraph, records_into_definition};
use super::records::{EdgeRecord, GraphRecords, NodeRecord};
use crate::error::{DocumentError, RecordConversionError};
use crate::model::{DefinitionInfo, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use std::fs;

/// A self-contained JSON document: definition metadata plus its records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub definition: DefinitionInfo,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphDocument {
    pub fn new(definition: DefinitionInfo, records: GraphRecords) -> Self {
        Self {
            definition,
            nodes: records.nodes,
            edges: records.edges,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a document from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_parts(self) -> (DefinitionInfo, GraphRecords) {
        (
            self.definition,
            GraphRecords {
                nodes: self.nodes,
                edges: self.edges,
            },
        )
    }
}

impl IntoGraph for GraphDocument {
    fn into_graph(self) -> Result<WorkflowDefinition, RecordConversionError> {
        let (info, records) = self.into_parts();
        records_into_definition(info, records)
    }
}
