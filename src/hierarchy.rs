//! Ingestion boundary for backend mind-map trees.
//!
//! The backend sends loosely shaped JSON (`{id, data: {label}, children}` or a
//! flat `{id, label, children}`). Everything is validated here and turned into
//! an immutable `HierarchicalNode` tree before it reaches the projector.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::HierarchyError;

// ─── HierarchicalNode ────────────────────────────────────────────────────────

/// One concept in the mind-map tree.
///
/// Children are reference-counted so the node mapping can hand out whole
/// subtrees without copying them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchicalNode {
    pub id: String,
    pub label: String,
    pub children: Vec<Arc<HierarchicalNode>>,
}

impl HierarchicalNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Builder-style helper used heavily in tests.
    pub fn with_children(mut self, children: Vec<HierarchicalNode>) -> Self {
        self.children = children.into_iter().map(Arc::new).collect();
        self
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn count(&self) -> usize {
        self.iter().count()
    }

    /// Number of levels in this subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(|c| c.depth()).max().unwrap_or(0)
    }

    /// Pre-order iterator over this subtree.
    pub fn iter(&self) -> PreOrder<'_> {
        PreOrder { stack: vec![self] }
    }
}

/// Depth-first pre-order walk, children visited in their stored order.
pub struct PreOrder<'a> {
    stack: Vec<&'a HierarchicalNode>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a HierarchicalNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|c| c.as_ref()));
        Some(node)
    }
}

// ─── DuplicatePolicy ─────────────────────────────────────────────────────────

/// What to do when two nodes in one payload share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Refuse the payload.
    #[default]
    Reject,
    /// Keep every node; the later one owns the id in the node mapping.
    LastWriteWins,
}

// ─── Wire format ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct WireNode {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    data: Option<WireData>,
    #[serde(default)]
    children: Option<Vec<WireNode>>,
}

#[derive(Debug, Deserialize)]
struct WireData {
    #[serde(default)]
    label: Option<String>,
}

// ─── Ingestion ───────────────────────────────────────────────────────────────

/// Parse a hierarchy from JSON text. `null` yields `Ok(None)`.
pub fn parse_hierarchy(
    json: &str,
    policy: DuplicatePolicy,
) -> Result<Option<Arc<HierarchicalNode>>, HierarchyError> {
    let value: Value = serde_json::from_str(json)?;
    hierarchy_from_value(value, policy)
}

/// Normalize an already-decoded JSON value. `null` yields `Ok(None)`.
pub fn hierarchy_from_value(
    value: Value,
    policy: DuplicatePolicy,
) -> Result<Option<Arc<HierarchicalNode>>, HierarchyError> {
    if value.is_null() {
        return Ok(None);
    }
    let wire: WireNode = serde_json::from_value(value)?;
    let mut seen = HashSet::new();
    let root = normalize(wire, "root".to_string(), policy, &mut seen)?;
    Ok(Some(Arc::new(root)))
}

fn normalize(
    wire: WireNode,
    path: String,
    policy: DuplicatePolicy,
    seen: &mut HashSet<String>,
) -> Result<HierarchicalNode, HierarchyError> {
    let id = match wire.id {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };
    if id.is_empty() {
        return Err(HierarchyError::EmptyId { path });
    }

    if !seen.insert(id.clone()) {
        match policy {
            DuplicatePolicy::Reject => return Err(HierarchyError::DuplicateId { id }),
            DuplicatePolicy::LastWriteWins => {
                warn!(id = %id, "duplicate node id in hierarchy; later node wins");
            }
        }
    }

    // data.label is what the backend emits; a flat label is accepted too.
    let label = wire
        .data
        .and_then(|d| d.label)
        .or(wire.label)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| id.clone());

    let children = wire
        .children
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, child)| {
            normalize(child, format!("{}.{}", path, i), policy, seen).map(Arc::new)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HierarchicalNode {
        id,
        label,
        children,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> HierarchicalNode {
        HierarchicalNode::new("root", "Root Topic").with_children(vec![
            HierarchicalNode::new("a", "A").with_children(vec![HierarchicalNode::new("a1", "A1")]),
            HierarchicalNode::new("b", "B"),
        ])
    }

    #[test]
    fn test_preorder_iteration() {
        let tree = sample();
        let ids: Vec<&str> = tree.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_count_and_depth() {
        let tree = sample();
        assert_eq!(tree.count(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(HierarchicalNode::new("x", "X").depth(), 1);
        assert!(HierarchicalNode::new("x", "X").is_leaf());
    }

    #[test]
    fn test_parse_backend_shape() {
        let json = r#"{
            "id": "root",
            "data": {"label": "Root Topic"},
            "children": [
                {"id": "node-1", "data": {"label": "Sub A"}, "children": []},
                {"id": "node-2", "data": {"label": "Sub B"}}
            ]
        }"#;
        let root = parse_hierarchy(json, DuplicatePolicy::Reject).unwrap().unwrap();
        assert_eq!(root.label, "Root Topic");
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].id, "node-2");
        assert!(root.children[1].is_leaf());
    }

    #[test]
    fn test_parse_flat_label_shape() {
        let value = json!({"id": "r", "label": "Flat", "children": null});
        let root = hierarchy_from_value(value, DuplicatePolicy::Reject).unwrap().unwrap();
        assert_eq!(root.label, "Flat");
        assert!(root.is_leaf());
    }

    #[test]
    fn test_null_is_empty_result() {
        assert!(parse_hierarchy("null", DuplicatePolicy::Reject).unwrap().is_none());
    }

    #[test]
    fn test_missing_label_falls_back_to_id() {
        let value = json!({"id": "lonely", "data": {"label": "   "}});
        let root = hierarchy_from_value(value, DuplicatePolicy::Reject).unwrap().unwrap();
        assert_eq!(root.label, "lonely");
    }

    #[test]
    fn test_numeric_id_is_stringified() {
        let value = json!({"id": 7, "label": "Seven"});
        let root = hierarchy_from_value(value, DuplicatePolicy::Reject).unwrap().unwrap();
        assert_eq!(root.id, "7");
    }

    #[test]
    fn test_empty_id_reports_path() {
        let value = json!({
            "id": "root",
            "children": [{"id": "a"}, {"id": "b", "children": [{"id": "  "}]}]
        });
        let err = hierarchy_from_value(value, DuplicatePolicy::Reject).unwrap_err();
        match err {
            HierarchyError::EmptyId { path } => assert_eq!(path, "root.1.0"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let value = json!({"id": "root", "children": [{"id": "x"}, {"id": "x"}]});
        let err = hierarchy_from_value(value, DuplicatePolicy::default()).unwrap_err();
        assert!(matches!(err, HierarchyError::DuplicateId { ref id } if id == "x"));
    }

    #[test]
    fn test_duplicate_kept_with_last_write_wins() {
        let value = json!({"id": "root", "children": [{"id": "x"}, {"id": "x"}]});
        let root = hierarchy_from_value(value, DuplicatePolicy::LastWriteWins)
            .unwrap()
            .unwrap();
        assert_eq!(root.count(), 3);
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(matches!(
            parse_hierarchy("{not json", DuplicatePolicy::Reject),
            Err(HierarchyError::Json(_))
        ));
    }
}
