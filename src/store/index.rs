use crate::model::Edge;
use ahash::AHashMap;

/// Edge ids by endpoint, kept current on every mutation.
///
/// Lists preserve insertion order, which is the tie-breaker of the
/// edge-selection rule.
#[derive(Debug, Clone, Default)]
pub(super) struct AdjacencyIndex {
    outgoing: AHashMap<String, Vec<String>>,
    incoming: AHashMap<String, Vec<String>>,
}

impl AdjacencyIndex {
    pub(super) fn insert(&mut self, edge: &Edge) {
        self.outgoing
            .entry(edge.from_node_id.clone())
            .or_default()
            .push(edge.id.clone());
        self.incoming
            .entry(edge.to_node_id.clone())
            .or_default()
            .push(edge.id.clone());
    }

    pub(super) fn remove(&mut self, edge: &Edge) {
        Self::detach(&mut self.outgoing, &edge.from_node_id, &edge.id);
        Self::detach(&mut self.incoming, &edge.to_node_id, &edge.id);
    }

    fn detach(map: &mut AHashMap<String, Vec<String>>, node_id: &str, edge_id: &str) {
        if let Some(ids) = map.get_mut(node_id) {
            ids.retain(|id| id != edge_id);
            if ids.is_empty() {
                map.remove(node_id);
            }
        }
    }

    pub(super) fn outgoing(&self, node_id: &str) -> &[String] {
        self.outgoing
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub(super) fn incoming(&self, node_id: &str) -> &[String] {
        self.incoming
            .get(node_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every edge id touching a node, each once.
    pub(super) fn touching(&self, node_id: &str) -> Vec<String> {
        let mut ids: Vec<String> = self.outgoing(node_id).to_vec();
        for id in self.incoming(node_id) {
            if !ids.contains(id) {
                ids.push(id.clone());
            }
        }
        ids
    }
}
