use crate::model::NodeKind;
use crate::validator::ValidationResult;
use thiserror::Error;

/// Errors raised synchronously by structural edits on the graph store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("An element with id '{0}' already exists in this definition")]
    DuplicateId(String),

    #[error("No {element} with id '{id}' exists in this definition")]
    NotFound { element: &'static str, id: String },

    #[error("Node '{0}' cannot be connected to itself")]
    SelfLoop(String),

    #[error("Node '{node_id}' is a {kind} node and cannot be deleted")]
    ProtectedNode { node_id: String, kind: NodeKind },

    #[error("Invalid '{element}': {message}")]
    Validation {
        element: String,
        field: Option<String>,
        message: String,
    },
}

impl GraphError {
    pub(crate) fn node_not_found(id: &str) -> Self {
        GraphError::NotFound {
            element: "node",
            id: id.to_string(),
        }
    }

    pub(crate) fn edge_not_found(id: &str) -> Self {
        GraphError::NotFound {
            element: "edge",
            id: id.to_string(),
        }
    }
}

/// Fatal conditions met while walking a graph for a live request.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RoutingError {
    #[error("Definition has no START node")]
    MissingStart,

    #[error("Definition has {0} START nodes, expected exactly one")]
    MultipleStarts(usize),

    #[error("Edge '{edge_id}' references missing node '{node_id}'")]
    DanglingEdge { edge_id: String, node_id: String },

    #[error("Routing dead-end at node '{node_id}': no outgoing edge matched and no default exists")]
    DeadEnd { node_id: String },

    #[error("Node '{node_id}' has {count} outgoing edges where exactly one is expected")]
    AmbiguousTransition { node_id: String, count: usize },

    #[error("Fork/join mismatch at node '{node_id}': {message}")]
    ForkJoinMismatch { node_id: String, message: String },

    #[error("Exceeded {limit} automatic transitions without reaching an approval or END")]
    StepLimitExceeded { limit: usize },

    #[error("No token is waiting for a decision at node '{0}'")]
    NotAwaitingDecision(String),

    #[error("Instance is no longer running ({0})")]
    InstanceClosed(String),
}

/// Errors reported by the external persistence collaborator.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    #[error("Definition '{0}' does not exist")]
    UnknownDefinition(String),

    #[error("Persistence rejected the graph: {0}")]
    Rejected(String),

    #[error("Persistence unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur when saving a definition through a backend.
#[derive(Error, Debug, Clone)]
pub enum SaveError {
    #[error("Definition has {} validation error(s) and cannot be saved", .0.errors.len())]
    Invalid(ValidationResult),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Saved records could not be converted: {0}")]
    Conversion(#[from] RecordConversionError),

    #[error("Saved graph could not be reloaded: {0}")]
    Reload(#[from] GraphError),
}

/// Errors that can occur when converting persisted or custom records into the graph model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordConversionError {
    #[error("Node '{node_id}' of kind {kind} does not accept attribute '{attribute}'")]
    DisallowedAttribute {
        node_id: String,
        kind: NodeKind,
        attribute: &'static str,
    },

    #[error("Invalid custom data: {0}")]
    ValidationError(String),
}

/// Errors raised while reading JSON documents (graphs, request contexts).
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Could not read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Config error: {0}")]
    Parse(#[from] toml::de::Error),
}
