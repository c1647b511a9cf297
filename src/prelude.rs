//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the kessai crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kessai::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let definition = GraphDocument::from_file("path/to/graph.json")?.into_graph()?;
//! let result = validate(&definition);
//! for issue in result.issues() {
//!     println!("{}", issue);
//! }
//!
//! let graph = ExecutionGraph::new(&definition)?;
//! let context = RequestContext::from_file("path/to/context.json")?;
//! let mut instance = Instance::new(&graph, context);
//! println!("Status: {:?}", instance.start()?);
//! # Ok(())
//! # }
//! ```

// Graph model
pub use crate::context::RequestContext;
pub use crate::model::{
    ApprovalAttributes, ApproverType, Condition, ConditionField, ConditionOperator,
    DefinitionInfo, Edge, Node, NodeBody, NodeKind, OrgRelation, ParallelMode, Position, Scope,
    Value, WorkflowDefinition,
};

// Authoring and persistence
pub use crate::backend::{InMemoryPersistence, PersistenceBackend, SavedGraph};
pub use crate::config::KessaiConfig;
pub use crate::record::{EdgeRecord, GraphDocument, GraphRecords, IntoGraph, NodeRecord};
pub use crate::store::{EdgePatch, GraphStore, NodePatch, Selected};

// Validation and routing
pub use crate::execution::{Decision, ExecutionEvent, ExecutionGraph, Instance, InstanceStatus};
pub use crate::registry::{ApproverSpec, spec_for};
pub use crate::routing::{Selection, SelectionReason, select_edge};
pub use crate::validator::{IssueCode, Severity, ValidationIssue, ValidationResult, Validator, validate};

// Error types
pub use crate::error::{GraphError, PersistenceError, RoutingError, SaveError};

// Trace formatting
pub use crate::trace::TraceFormatter;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
