//! # Graph Errors
//!
//! Every failure the compiler can surface. Lookups that find nothing are not
//! errors; the accessor answers them with `None` or an empty list.

use thiserror::Error;

/// Errors raised while building, serializing or deserializing an entity graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// A type tag has no entry in the type registry
    #[error("Unknown activity type: {0}")]
    UnknownType(String),

    /// A reference names an id that is not declared anywhere in the definition
    #[error("Dangling reference: no element with id '{id}'")]
    DanglingReference { id: String },

    /// A reference record points at another reference record
    #[error("Reference '{id}' resolves to another reference, only one level of indirection is allowed")]
    ReferenceChain { id: String },

    /// An element that must be indexed carries no id
    #[error("Element of type {element_type} has no id")]
    MissingId { element_type: String },

    /// An activity names a default flow that does not leave it
    #[error("Default flow '{flow}' of '{activity}' is not an outbound sequence flow of '{activity}'")]
    InvalidDefaultFlow { activity: String, flow: String },

    /// Snapshot or document JSON could not be read or written
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GraphError>;
