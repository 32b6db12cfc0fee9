//! # Element Extraction
//!
//! Reference resolution and behaviour extraction for document elements.

mod behaviour;
mod references;

pub use behaviour::*;
pub use references::*;
