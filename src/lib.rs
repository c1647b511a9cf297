//! # Kessai - Approval Workflow Graphs
//!
//! **Kessai** models approval workflows as directed graphs of typed steps
//! (START, END, APPROVAL, CONDITION, PARALLEL_START, PARALLEL_JOIN) joined by
//! optionally guarded edges. It provides the authoring store, the rules a graph
//! must satisfy before it is saved, and the routing contract an engine follows
//! when a live request walks the graph.
//!
//! ## Core Workflow
//!
//! 1.  **Author**: Build the graph in a [`store::GraphStore`]. Edits are lenient so
//!     half-filled forms can be kept while the author works.
//! 2.  **Validate**: [`store::GraphStore::validate`] reports errors (which block
//!     saving) and warnings (which the editor should surface).
//! 3.  **Save**: [`store::GraphStore::save`] hands flat records to a
//!     [`backend::PersistenceBackend`] and reloads the ids it assigns.
//! 4.  **Route**: An [`execution::Instance`] walks a request through the graph,
//!     resolving conditions with the same edge-selection rule the editor uses.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kessai::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut store = GraphStore::new();
//!     store.set_definition(DefinitionInfo::new("Expenses", Scope::Default));
//!     store.add_node(Node::start("start"))?;
//!     store.add_node(Node::condition("amount"))?;
//!     store.add_node(Node::approval("cfo", ApprovalAttributes::specific_employee("E-1")))?;
//!     store.add_node(Node::end("end"))?;
//!
//!     store.connect("start", "amount")?;
//!     let large = store.connect("amount", "cfo")?;
//!     let small = store.connect("amount", "end")?;
//!     store.connect("cfo", "end")?;
//!     store.update_edge_attributes(
//!         &large,
//!         EdgePatch::new().condition(ConditionField::Amount, ConditionOperator::GreaterThan, "1000"),
//!     )?;
//!     store.update_edge_attributes(&small, EdgePatch::new().default_edge(true))?;
//!
//!     let warnings = store.save(&mut InMemoryPersistence::new())?;
//!     println!("Saved with {} warning(s)", warnings.warnings.len());
//!
//!     let graph = ExecutionGraph::new(&store.to_definition())?;
//!     let context = RequestContext::new().with(ConditionField::Amount, 1500.0);
//!     let mut instance = Instance::new(&graph, context);
//!     instance.start()?;
//!     for pending in instance.pending_approvals() {
//!         println!("Waiting for {:?} at '{}'", pending.approver, pending.node_id);
//!     }
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod context;
pub mod error;
pub mod execution;
pub mod model;
pub mod prelude;
pub mod record;
pub mod registry;
pub mod routing;
pub mod store;
pub mod trace;
pub mod validator;
