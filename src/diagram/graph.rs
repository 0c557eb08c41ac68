//! DiagramGraph — a petgraph DiGraph view over a `Projection`.
//!
//! The projection is what the layout surface consumes; this view is what the
//! crate uses to reason about it: tree shape checks, depth per node, and
//! child order for the outline renderer.

use std::collections::HashMap;

use petgraph::Direction as EdgeDirection;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::diagram::types::Projection;

/// Node data stored in the petgraph DiGraph.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub id: String,
    pub text: String,
    pub width: u32,
    pub height: u32,
}

/// Shape problems a projection can have once duplicate ids collapse nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeIssue {
    NoRoot,
    MultipleRoots(Vec<String>),
    Cycle,
    /// A node reached through more than one edge.
    SharedChild(String),
}

pub struct DiagramGraph {
    pub digraph: DiGraph<NodeData, ()>,
    /// Maps node id → petgraph NodeIndex.
    pub node_index: HashMap<String, NodeIndex>,
}

impl DiagramGraph {
    /// Build the view. Duplicate ids collapse onto the first occurrence,
    /// which is how a layout surface keyed by id would see them.
    pub fn from_projection(projection: &Projection) -> Self {
        let mut digraph: DiGraph<NodeData, ()> = DiGraph::new();
        let mut node_index: HashMap<String, NodeIndex> = HashMap::new();

        for node in &projection.nodes {
            if node_index.contains_key(&node.id) {
                continue;
            }
            let idx = digraph.add_node(NodeData {
                id: node.id.clone(),
                text: node.text.clone(),
                width: node.width,
                height: node.height,
            });
            node_index.insert(node.id.clone(), idx);
        }

        for edge in &projection.edges {
            if let (Some(&from), Some(&to)) = (node_index.get(&edge.from), node_index.get(&edge.to)) {
                digraph.add_edge(from, to, ());
            }
        }

        Self {
            digraph,
            node_index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.digraph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.digraph.edge_count()
    }

    pub fn node(&self, id: &str) -> Option<&NodeData> {
        self.node_index.get(id).map(|&idx| &self.digraph[idx])
    }

    /// Ids with no incoming edge, in insertion order.
    pub fn roots(&self) -> Vec<String> {
        self.digraph
            .node_indices()
            .filter(|&idx| {
                self.digraph
                    .edges_directed(idx, EdgeDirection::Incoming)
                    .next()
                    .is_none()
            })
            .map(|idx| self.digraph[idx].id.clone())
            .collect()
    }

    /// Child ids of `id` in edge emission order. Empty if `id` is unknown.
    pub fn children(&self, id: &str) -> Vec<String> {
        let Some(&idx) = self.node_index.get(id) else {
            return vec![];
        };
        // petgraph yields outgoing edges newest first; sort back to insertion order.
        let mut out: Vec<_> = self
            .digraph
            .edges_directed(idx, EdgeDirection::Outgoing)
            .map(|e| (e.id().index(), e.target()))
            .collect();
        out.sort_by_key(|(edge_idx, _)| *edge_idx);
        out.into_iter()
            .map(|(_, target)| self.digraph[target].id.clone())
            .collect()
    }

    /// Parent id of `id`, if it has exactly one incoming edge.
    pub fn parent(&self, id: &str) -> Option<String> {
        let &idx = self.node_index.get(id)?;
        let mut incoming = self.digraph.edges_directed(idx, EdgeDirection::Incoming);
        let first = incoming.next()?;
        if incoming.next().is_some() {
            return None;
        }
        Some(self.digraph[first.source()].id.clone())
    }

    /// Distance from the root for every node reachable from it.
    ///
    /// Returns an empty map if the graph has a cycle.
    pub fn depths(&self) -> HashMap<String, usize> {
        let mut depths = HashMap::new();
        let Ok(order) = toposort(&self.digraph, None) else {
            return depths;
        };
        for idx in order {
            let depth = self
                .digraph
                .edges_directed(idx, EdgeDirection::Incoming)
                .filter_map(|e| depths.get(&self.digraph[e.source()].id).copied())
                .max()
                .map_or(0, |d: usize| d + 1);
            depths.insert(self.digraph[idx].id.clone(), depth);
        }
        depths
    }

    /// Check the single-rooted tree invariant. Returns every problem found.
    pub fn shape_issues(&self) -> Vec<ShapeIssue> {
        let mut issues = Vec::new();
        if self.digraph.node_count() == 0 {
            return issues;
        }

        let roots = self.roots();
        match roots.len() {
            0 => issues.push(ShapeIssue::NoRoot),
            1 => {}
            _ => issues.push(ShapeIssue::MultipleRoots(roots)),
        }

        if is_cyclic_directed(&self.digraph) {
            issues.push(ShapeIssue::Cycle);
        }

        for idx in self.digraph.node_indices() {
            let incoming = self
                .digraph
                .edges_directed(idx, EdgeDirection::Incoming)
                .count();
            if incoming > 1 {
                issues.push(ShapeIssue::SharedChild(self.digraph[idx].id.clone()));
            }
        }
        issues
    }

    /// `true` for a single-rooted tree with `edges == nodes - 1`.
    pub fn is_tree(&self) -> bool {
        let n = self.digraph.node_count();
        n == 0 || (self.shape_issues().is_empty() && self.digraph.edge_count() == n - 1)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
