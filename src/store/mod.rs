//! The in-memory graph owned by one authoring session.
//!
//! Every mutation either applies completely or returns an error and leaves the
//! store untouched. Writes are lenient: a node may hold a half-filled approver
//! form or an edge a half-filled condition. Whole-graph consistency is checked
//! by [`GraphStore::validate`] and enforced by [`GraphStore::save`].

mod index;
mod patch;

pub use patch::{EdgePatch, NodePatch};

use crate::backend::PersistenceBackend;
use crate::config::{KessaiConfig, StoreConfig};
use crate::error::{GraphError, SaveError};
use crate::model::{DefinitionInfo, Edge, Node, WorkflowDefinition};
use crate::record::conversion::records_into_definition;
use crate::record::{EdgeRecord, GraphRecords, NodeRecord};
use crate::registry::spec_for;
use crate::routing::evaluation_order;
use crate::validator::{ValidationResult, Validator};
use ahash::AHashMap;
use index::AdjacencyIndex;
use itertools::Itertools;
use tracing::{debug, info};
use uuid::Uuid;

/// The currently selected canvas element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selected {
    Node(String),
    Edge(String),
}

/// An element tagged with its insertion sequence number.
#[derive(Debug, Clone)]
struct Slot<T> {
    seq: u64,
    item: T,
}

#[derive(Debug, Clone, Default)]
pub struct GraphStore {
    definition: DefinitionInfo,
    nodes: AHashMap<String, Slot<Node>>,
    edges: AHashMap<String, Slot<Edge>>,
    index: AdjacencyIndex,
    selection: Option<Selected>,
    next_seq: u64,
    config: StoreConfig,
    validator: Validator,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: &KessaiConfig) -> Self {
        Self {
            config: config.store.clone(),
            validator: Validator::with_config(config.validation.clone()),
            ..Self::default()
        }
    }

    /// Builds a store holding an existing definition.
    pub fn from_definition(definition: WorkflowDefinition) -> Result<Self, GraphError> {
        let mut store = Self::new();
        store.load_graph(definition.nodes, definition.edges)?;
        store.set_definition(definition.info);
        Ok(store)
    }

    pub fn definition(&self) -> &DefinitionInfo {
        &self.definition
    }

    /// Replaces definition metadata. Nodes and edges are untouched.
    pub fn set_definition(&mut self, info: DefinitionInfo) {
        self.definition = info;
    }

    /// Replaces the whole graph. Rejected if ids repeat or an edge references a
    /// node that is not part of `nodes`.
    pub fn load_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<(), GraphError> {
        let mut seq = 0;
        let mut node_map: AHashMap<String, Slot<Node>> = AHashMap::with_capacity(nodes.len());
        for node in nodes {
            if node_map.contains_key(&node.id) {
                return Err(GraphError::DuplicateId(node.id));
            }
            seq += 1;
            node_map.insert(node.id.clone(), Slot { seq, item: node });
        }

        let mut edge_map: AHashMap<String, Slot<Edge>> = AHashMap::with_capacity(edges.len());
        let mut index = AdjacencyIndex::default();
        for edge in edges {
            if edge_map.contains_key(&edge.id) {
                return Err(GraphError::DuplicateId(edge.id));
            }
            for (field, endpoint) in [
                ("fromNodeId", &edge.from_node_id),
                ("toNodeId", &edge.to_node_id),
            ] {
                if !node_map.contains_key(endpoint) {
                    return Err(GraphError::Validation {
                        element: edge.id.clone(),
                        field: Some(field.to_string()),
                        message: format!("references missing node '{}'", endpoint),
                    });
                }
            }
            seq += 1;
            index.insert(&edge);
            edge_map.insert(edge.id.clone(), Slot { seq, item: edge });
        }

        debug!(
            nodes = node_map.len(),
            edges = edge_map.len(),
            "loaded graph"
        );
        self.nodes = node_map;
        self.edges = edge_map;
        self.index = index;
        self.next_seq = seq;
        self.selection = None;
        Ok(())
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.nodes.contains_key(&node.id) {
            return Err(GraphError::DuplicateId(node.id));
        }
        debug!(node_id = %node.id, kind = %node.kind(), "added node");
        let seq = self.bump_seq();
        self.nodes.insert(node.id.clone(), Slot { seq, item: node });
        Ok(())
    }

    /// Merges `patch` into a node.
    ///
    /// Only attributes foreign to the node's kind are rejected here. Whether
    /// the approver attributes agree with each other is the validator's call.
    pub fn update_node_attributes(&mut self, node_id: &str, patch: NodePatch) -> Result<(), GraphError> {
        let slot = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| GraphError::node_not_found(node_id))?;

        let kind = slot.item.kind();
        let spec = spec_for(kind);
        if let Some(attribute) = patch.assigned().into_iter().find(|a| !spec.allows(*a)) {
            return Err(GraphError::Validation {
                element: node_id.to_string(),
                field: Some(attribute.name().to_string()),
                message: format!("{} nodes do not accept {}", kind, attribute),
            });
        }

        patch.apply(&mut slot.item);
        debug!(node_id, "updated node attributes");
        Ok(())
    }

    /// Removes a node and every edge touching it.
    pub fn delete_node(&mut self, node_id: &str) -> Result<Node, GraphError> {
        let node = &self
            .nodes
            .get(node_id)
            .ok_or_else(|| GraphError::node_not_found(node_id))?
            .item;
        if node.is_protected() {
            return Err(GraphError::ProtectedNode {
                node_id: node_id.to_string(),
                kind: node.kind(),
            });
        }

        let cascaded = self.index.touching(node_id);
        for edge_id in &cascaded {
            self.remove_edge(edge_id);
        }
        let removed = self
            .nodes
            .remove(node_id)
            .map(|slot| slot.item)
            .ok_or_else(|| GraphError::node_not_found(node_id))?;

        if self.selection == Some(Selected::Node(node_id.to_string())) {
            self.selection = None;
        }
        debug!(node_id, cascaded_edges = cascaded.len(), "deleted node");
        Ok(removed)
    }

    /// Creates an unconditional edge and returns its generated id. The new
    /// edge is ordered after its existing siblings.
    pub fn connect(&mut self, from_node_id: &str, to_node_id: &str) -> Result<String, GraphError> {
        if from_node_id == to_node_id {
            return Err(GraphError::SelfLoop(from_node_id.to_string()));
        }
        for id in [from_node_id, to_node_id] {
            if !self.nodes.contains_key(id) {
                return Err(GraphError::node_not_found(id));
            }
        }

        let sort_order = self
            .index
            .outgoing(from_node_id)
            .iter()
            .filter_map(|id| self.edges.get(id))
            .map(|slot| slot.item.sort_order)
            .max()
            .map_or(Some(0), |max| max.checked_add(1))
            .ok_or_else(|| GraphError::Validation {
                element: from_node_id.to_string(),
                field: Some("sortOrder".to_string()),
                message: format!("no sortOrder is left after {}", i32::MAX),
            })?;

        let id = format!("{}-{}", self.config.edge_id_prefix, Uuid::new_v4());
        let edge = Edge::new(id.clone(), from_node_id, to_node_id).with_sort_order(sort_order);
        self.index.insert(&edge);
        let seq = self.bump_seq();
        self.edges.insert(id.clone(), Slot { seq, item: edge });

        debug!(edge_id = %id, from_node_id, to_node_id, sort_order, "connected nodes");
        Ok(id)
    }

    /// Merges `patch` into an edge. Conflicting defaults are left for the
    /// validator to report.
    pub fn update_edge_attributes(&mut self, edge_id: &str, patch: EdgePatch) -> Result<(), GraphError> {
        let slot = self
            .edges
            .get_mut(edge_id)
            .ok_or_else(|| GraphError::edge_not_found(edge_id))?;
        patch.apply(&mut slot.item);
        debug!(edge_id, "updated edge attributes");
        Ok(())
    }

    pub fn delete_edge(&mut self, edge_id: &str) -> Result<Edge, GraphError> {
        let edge = self
            .remove_edge(edge_id)
            .ok_or_else(|| GraphError::edge_not_found(edge_id))?;
        debug!(edge_id, "deleted edge");
        Ok(edge)
    }

    fn remove_edge(&mut self, edge_id: &str) -> Option<Edge> {
        let slot = self.edges.remove(edge_id)?;
        self.index.remove(&slot.item);
        if self.selection == Some(Selected::Edge(edge_id.to_string())) {
            self.selection = None;
        }
        Some(slot.item)
    }

    fn bump_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    pub fn select_node(&mut self, node_id: &str) -> Result<(), GraphError> {
        if !self.nodes.contains_key(node_id) {
            return Err(GraphError::node_not_found(node_id));
        }
        self.selection = Some(Selected::Node(node_id.to_string()));
        Ok(())
    }

    pub fn select_edge(&mut self, edge_id: &str) -> Result<(), GraphError> {
        if !self.edges.contains_key(edge_id) {
            return Err(GraphError::edge_not_found(edge_id));
        }
        self.selection = Some(Selected::Edge(edge_id.to_string()));
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    pub fn selection(&self) -> Option<&Selected> {
        self.selection.as_ref()
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id).map(|slot| &slot.item)
    }

    pub fn edge(&self, edge_id: &str) -> Option<&Edge> {
        self.edges.get(edge_id).map(|slot| &slot.item)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> Vec<&Node> {
        self.nodes
            .values()
            .sorted_by_key(|slot| slot.seq)
            .map(|slot| &slot.item)
            .collect()
    }

    /// Edges in insertion order.
    pub fn edges(&self) -> Vec<&Edge> {
        self.edges
            .values()
            .sorted_by_key(|slot| slot.seq)
            .map(|slot| &slot.item)
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// A node's outgoing edges in evaluation order.
    pub fn outgoing(&self, node_id: &str) -> Vec<&Edge> {
        evaluation_order(
            self.index
                .outgoing(node_id)
                .iter()
                .filter_map(|id| self.edge(id)),
        )
    }

    /// A node's incoming edges in insertion order.
    pub fn incoming(&self, node_id: &str) -> Vec<&Edge> {
        self.index
            .incoming(node_id)
            .iter()
            .filter_map(|id| self.edge(id))
            .collect()
    }

    /// A snapshot of the current graph in insertion order.
    pub fn to_definition(&self) -> WorkflowDefinition {
        WorkflowDefinition::new(
            self.definition.clone(),
            self.nodes().into_iter().cloned().collect(),
            self.edges().into_iter().cloned().collect(),
        )
    }

    /// Flattens the graph into persistence records.
    ///
    /// Each source's `sortOrder` values are renumbered `0..n` in evaluation
    /// order, so the records never depend on gaps or ties left by editing.
    pub fn serialize(&self) -> GraphRecords {
        let mut dense: AHashMap<&str, i32> = AHashMap::with_capacity(self.edges.len());
        for siblings in self
            .edges
            .values()
            .into_group_map_by(|slot| slot.item.from_node_id.as_str())
            .into_values()
        {
            let ordered = siblings
                .into_iter()
                .sorted_by_key(|slot| (slot.item.is_default, slot.item.sort_order, slot.seq));
            for (position, slot) in ordered.enumerate() {
                dense.insert(slot.item.id.as_str(), position as i32);
            }
        }

        let nodes = self.nodes().into_iter().map(NodeRecord::from).collect();
        let edges = self
            .edges()
            .into_iter()
            .map(|edge| {
                let mut record = EdgeRecord::from(edge);
                if let Some(order) = dense.get(edge.id.as_str()) {
                    record.sort_order = *order;
                }
                record
            })
            .collect();
        GraphRecords { nodes, edges }
    }

    pub fn validate(&self) -> ValidationResult {
        self.validator.validate(&self.to_definition())
    }

    /// Validates, hands the records to the backend and reloads from its
    /// response. Returns the warnings of the saved graph.
    ///
    /// Nothing is sent when validation reports errors. Backend failures are
    /// returned as-is and the store keeps its unsaved state.
    pub fn save(&mut self, backend: &mut dyn PersistenceBackend) -> Result<ValidationResult, SaveError> {
        let result = self.validate();
        if !result.is_valid() {
            return Err(SaveError::Invalid(result));
        }

        let saved = backend.save(&self.definition, self.serialize())?;
        let mut info = self.definition.clone();
        info.definition_id = Some(saved.definition_id);
        let reloaded = records_into_definition(info, saved.records)?;

        self.load_graph(reloaded.nodes, reloaded.edges)?;
        self.definition = reloaded.info;
        info!(
            definition_id = self.definition.definition_id.as_deref().unwrap_or_default(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            warnings = result.warnings.len(),
            "saved workflow definition"
        );
        Ok(result)
    }
}
