//! Hierarchical source document accepted by the diagram.

use super::identifiers::NodeId;
use serde::{Deserialize, Deserializer, Serialize};

/// One node of the external source document.
///
/// The document is a tree: every node has an `id`, an optional `kind` and
/// display `name`, an arbitrary `data` payload used to derive decorations, and
/// a `children` array. An absent or `null` children array is treated as empty.
///
/// # Decoration payload
///
/// Decorations are derived from well-known fields of `data`:
///
/// ```json
/// { "severity": { "error": 2, "warn": 5 }, "flags": ["radioactive"] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceNode {
    /// Stable identity (distinguished name).
    pub id: NodeId,

    /// Entity kind, e.g. `ns`, `app`, `pod`.
    #[serde(default)]
    pub kind: String,

    /// Display name; falls back to the last segment of `id`.
    #[serde(default)]
    pub name: Option<String>,

    /// Arbitrary payload for decoration derivation.
    #[serde(default)]
    pub data: serde_json::Value,

    /// Ordered children.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<SourceNode>,
}

impl SourceNode {
    /// Create a leaf node with the given id and kind.
    pub fn new(id: NodeId, kind: impl Into<String>) -> Self {
        Self {
            id,
            kind: kind.into(),
            name: None,
            data: serde_json::Value::Null,
            children: Vec::new(),
        }
    }

    /// Builder-style child append.
    pub fn with_child(mut self, child: SourceNode) -> Self {
        self.children.push(child);
        self
    }

    /// Builder-style data payload.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Display name, falling back to the id's last segment.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or_else(|| self.id.last_segment())
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SourceNode::subtree_len)
            .sum::<usize>()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<SourceNode>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<SourceNode>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_children_is_empty() {
        let node: SourceNode = serde_json::from_str(r#"{"id":"root"}"#).unwrap();
        assert!(node.children.is_empty());
        assert_eq!(node.kind, "");
        assert_eq!(node.data, serde_json::Value::Null);
    }

    #[test]
    fn null_children_is_empty() {
        let node: SourceNode =
            serde_json::from_str(r#"{"id":"root","children":null}"#).unwrap();
        assert!(node.children.is_empty());
    }

    #[test]
    fn nested_children_parse_in_order() {
        let json = r#"{
            "id": "root",
            "kind": "root",
            "children": [
                {"id": "root/a", "kind": "ns", "children": [{"id": "root/a/a1"}]},
                {"id": "root/b", "kind": "ns"}
            ]
        }"#;
        let node: SourceNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.children.len(), 2);
        assert_eq!(node.children[0].id.as_str(), "root/a");
        assert_eq!(node.children[0].children[0].id.as_str(), "root/a/a1");
        assert_eq!(node.subtree_len(), 4);
    }

    #[test]
    fn empty_id_is_rejected() {
        let result: Result<SourceNode, _> = serde_json::from_str(r#"{"id":""}"#);
        assert!(result.is_err());
    }

    #[test]
    fn display_name_prefers_explicit_name() {
        let mut node = SourceNode::new(NodeId::new("root/ns-[x]").unwrap(), "ns");
        assert_eq!(node.display_name(), "ns-[x]");
        node.name = Some("x".to_string());
        assert_eq!(node.display_name(), "x");
    }
}
