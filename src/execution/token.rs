use crate::model::ParallelMode;

/// Left on every sub-token by the PARALLEL_START that created it, so the
/// matching join knows how many arrivals to expect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForkFrame {
    pub fork_id: u64,
    pub fork_node_id: String,
    pub branches: usize,
    pub mode: ParallelMode,
}

impl ForkFrame {
    pub fn required_arrivals(&self) -> usize {
        self.mode.required_arrivals(self.branches)
    }
}

/// Where one live path of a request sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub node_id: String,
    /// Edge that moved the token here; `None` for the initial token.
    pub via: Option<String>,
    /// Enclosing forks, innermost last.
    pub frames: Vec<ForkFrame>,
}

impl Token {
    pub(super) fn at(node_id: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            via: None,
            frames: Vec::new(),
        }
    }

    /// The same token moved along an edge.
    pub(super) fn moved(mut self, edge_id: &str, to_node_id: &str) -> Self {
        self.node_id = to_node_id.to_string();
        self.via = Some(edge_id.to_string());
        self
    }

    pub(super) fn within(&self, fork_id: u64) -> bool {
        self.frames.iter().any(|frame| frame.fork_id == fork_id)
    }
}
