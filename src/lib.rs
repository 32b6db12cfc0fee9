//! # Process Entity Graph Compiler (PEGC)
//!
//! Compiles a parsed BPMN process definition into an indexed, read-only
//! entity graph that an execution engine can query without walking the
//! source document again.
//!
//! PEGC provides:
//! - Type tag to behaviour resolution through a pluggable [`TypeRegistry`]
//! - One-hop resolution of reference records such as data object references
//! - Behaviour extraction for io specifications, loops and event definitions
//! - Scoped queries over processes, activities, flows, data objects and errors
//! - Binding-free snapshots that rebind against any registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pegc::{build_graph, Behaviour, Behaviours, Binding, Document, TypeRegistry};
//!
//! struct Activity(&'static str);
//!
//! impl Behaviour for Activity {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! let behaviours: Behaviours = ["Definition", "Process", "StartEvent", "EndEvent", "SequenceFlow"]
//!     .into_iter()
//!     .map(|key| (key.to_string(), Binding::new(Activity(key))))
//!     .collect();
//! let registry = TypeRegistry::from_behaviours(&behaviours);
//!
//! let json = std::fs::read_to_string("definition.json")?;
//! let document = Document::from_json(&json)?;
//!
//! match build_graph(&document, &registry) {
//!     Ok(graph) => {
//!         std::fs::write("snapshot.json", graph.serialize().to_json_pretty()?)?;
//!     }
//!     Err(e) => eprintln!("Compilation failed: {}", e),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! PEGC follows a multi-phase compilation pipeline:
//!
//! 1. **Indexing** - Collect every element of the document by id
//! 2. **Definition** - Resolve the root definition record
//! 3. **Scope Walk** - Extract processes, activities, flows and data objects
//! 4. **Message Flows** - Resolve collaboration endpoints to their processes
//! 5. **Graph Indexing** - Build the id and scope indices behind the queries

pub mod compiler;
pub mod document;
pub mod error;
pub mod extract;
pub mod graph;
pub mod model;
pub mod registry;
pub mod snapshot;

// Re-export the main compilation API
pub use compiler::build_graph;
pub use graph::{EntityGraph, GraphParts};
pub use snapshot::{deserialize, serialize, Snapshot};

// Re-export registry types
pub use registry::{
    default_table, Behaviour, Behaviours, Binding, TypeRegistry, TypeTable,
    SERVICE_IMPLEMENTATION,
};

// Re-export document and entity types
pub use document::{Document, Element, Property};
pub use error::{GraphError, Result};
pub use model::{
    Activity, Association, AssociationEnd, Bag, BpmnError, DataObject, DataPort, Definition,
    Descriptor, Entity, Expression, FlowEndpoint, MessageFlow, PortBehaviour, Process,
    SequenceFlow,
};
