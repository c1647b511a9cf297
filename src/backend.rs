use crate::error::PersistenceError;
use crate::model::DefinitionInfo;
use crate::record::GraphRecords;
use ahash::{AHashMap, AHashSet};

/// What the persistence collaborator hands back after a save: the stable
/// definition id and the records with server-assigned ids.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGraph {
    pub definition_id: String,
    pub records: GraphRecords,
}

/// The external persistence collaborator.
///
/// Each call is a full replacement of the definition's node and edge sets.
/// Implementations decide which ids are new; the store never applies ids
/// optimistically and reloads from the returned records instead.
pub trait PersistenceBackend {
    fn save(
        &mut self,
        definition: &DefinitionInfo,
        records: GraphRecords,
    ) -> Result<SavedGraph, PersistenceError>;
}

/// A process-local backend that behaves like the real collaborator: ids it
/// has not issued itself are treated as new and replaced by stable ones.
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    definitions: AHashMap<String, StoredDefinition>,
    next_definition: u64,
    next_element: u64,
}

#[derive(Debug, Clone)]
struct StoredDefinition {
    info: DefinitionInfo,
    records: GraphRecords,
    issued: AHashSet<String>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved state of a definition.
    pub fn load(&self, definition_id: &str) -> Option<(&DefinitionInfo, &GraphRecords)> {
        self.definitions
            .get(definition_id)
            .map(|stored| (&stored.info, &stored.records))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn issue_id(&mut self) -> String {
        self.next_element += 1;
        format!("{:04}", self.next_element)
    }
}

impl PersistenceBackend for InMemoryPersistence {
    fn save(
        &mut self,
        definition: &DefinitionInfo,
        mut records: GraphRecords,
    ) -> Result<SavedGraph, PersistenceError> {
        let (definition_id, mut issued) = match &definition.definition_id {
            Some(id) => {
                let stored = self
                    .definitions
                    .get(id)
                    .ok_or_else(|| PersistenceError::UnknownDefinition(id.clone()))?;
                (id.clone(), stored.issued.clone())
            }
            None => {
                self.next_definition += 1;
                (format!("wf-{}", self.next_definition), AHashSet::new())
            }
        };

        let mut remapped: AHashMap<String, String> = AHashMap::new();
        for node in &mut records.nodes {
            if !issued.contains(&node.id) {
                let id = self.issue_id();
                remapped.insert(std::mem::replace(&mut node.id, id.clone()), id.clone());
                issued.insert(id);
            }
        }
        let node_ids: AHashSet<&str> = records.nodes.iter().map(|n| n.id.as_str()).collect();

        let mut edges = Vec::with_capacity(records.edges.len());
        for mut edge in records.edges {
            for endpoint in [&mut edge.from_node_id, &mut edge.to_node_id] {
                if let Some(id) = remapped.get(endpoint.as_str()) {
                    *endpoint = id.clone();
                }
                if !node_ids.contains(endpoint.as_str()) {
                    return Err(PersistenceError::Rejected(format!(
                        "edge '{}' references unknown node '{}'",
                        edge.id, endpoint
                    )));
                }
            }
            edges.push(edge);
        }
        for edge in &mut edges {
            if !issued.contains(&edge.id) {
                edge.id = self.issue_id();
                issued.insert(edge.id.clone());
            }
        }
        records.edges = edges;

        let mut info = definition.clone();
        info.definition_id = Some(definition_id.clone());
        self.definitions.insert(
            definition_id.clone(),
            StoredDefinition {
                info,
                records: records.clone(),
                issued,
            },
        );

        Ok(SavedGraph {
            definition_id,
            records,
        })
    }
}
