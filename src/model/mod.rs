//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod geometry;
pub mod identifiers;
pub mod marker;
pub mod source_node;

// Re-export for convenience
pub use error::{InputError, ViewError};
pub use geometry::{Point, Rect, Size};
pub use identifiers::{InvalidNodeId, NodeId};
pub use marker::{Marker, MarkerMap};
pub use source_node::SourceNode;
