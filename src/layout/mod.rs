//! Layout tree adapter.
//!
//! Turns a [`SourceNode`](crate::model::SourceNode) document into a tree of
//! measured, positioned boxes and exposes the flattened render order the
//! scene reconciler diffs against.

pub mod arrange;
pub mod decoration;
pub mod metrics;
pub mod node;
pub mod policy;
pub mod tree;

pub use arrange::LayoutParams;
pub use decoration::{
    Bindings, Decoration, DecorationKey, DecorationKind, Decorations, Header, HeaderSlot,
    NodeCommand, Severity,
};
pub use metrics::{measure_text, FontSpec, TextSize};
pub use node::{LayoutNode, NodeIndex, NodePalette};
pub use policy::{DepthExpandPolicy, ExpandPolicy};
pub use tree::{LayoutContext, LayoutTree};
