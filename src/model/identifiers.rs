//! Core identifier newtypes with smart constructors.
//!
//! Node identifiers validate non-empty strings at construction time.
//! Raw constructors are never exported - use smart constructors only.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a diagram node.
///
/// Derived from the domain entity's distinguished name and unique within a
/// tree snapshot. Used as the key for layout lookup, the render registry and
/// the persisted expansion map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(String);

impl NodeId {
    /// Smart constructor: validates non-empty id
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidNodeId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidNodeId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Last `/`-separated segment of the id.
    ///
    /// Distinguished names look like `root/ns-[kube-system]/app-[dns]`; the
    /// last segment is a reasonable display name when the source omits one.
    pub fn last_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NodeId {
    type Error = InvalidNodeId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

// ===== Error Types =====

/// Rejected node identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidNodeId {
    /// The id was the empty string.
    #[error("Node ID cannot be empty")]
    Empty,
}

// ===== Tests =====
