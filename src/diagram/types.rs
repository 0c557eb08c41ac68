//! Diagram types: Direction, ProjectedNode, ProjectedEdge, NodeMapping, Projection.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::hierarchy::HierarchicalNode;

// ─── Direction ───────────────────────────────────────────────────────────────

/// Layout direction declared to the layout surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Direction {
    #[default]
    LR,
    RL,
    TD,
    BT,
}

impl Direction {
    /// Top-down and bottom-up layouts stack levels vertically.
    pub fn is_vertical(self) -> bool {
        matches!(self, Direction::TD | Direction::BT)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LR" => Ok(Direction::LR),
            "RL" => Ok(Direction::RL),
            "TD" | "TB" => Ok(Direction::TD),
            "BT" => Ok(Direction::BT),
            other => Err(format!("unknown direction '{}' (expected LR, RL, TD, BT)", other)),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Direction::LR => "LR",
            Direction::RL => "RL",
            Direction::TD => "TD",
            Direction::BT => "BT",
        };
        f.write_str(s)
    }
}

// ─── ProjectedNode ───────────────────────────────────────────────────────────

/// A node as handed to the layout surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedNode {
    pub id: String,
    pub text: String,
    pub width: u32,
    pub height: u32,
}

// ─── ProjectedEdge ───────────────────────────────────────────────────────────

/// A parent → child edge. `id` is `"<from>-<to>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectedEdge {
    pub id: String,
    pub from: String,
    pub to: String,
}

impl ProjectedEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            id: format!("{}-{}", from, to),
            from,
            to,
        }
    }
}

// ─── NodeMapping ─────────────────────────────────────────────────────────────

/// Domain id → original node, in projection order.
pub type NodeMapping = IndexMap<String, Arc<HierarchicalNode>>;

// ─── Spacing ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Spacing {
    pub node: u32,
    pub rank: u32,
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// Output of one projector run. Always rebuilt as a whole.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Projection {
    pub direction: Direction,
    pub spacing: Spacing,
    pub nodes: Vec<ProjectedNode>,
    pub edges: Vec<ProjectedEdge>,
    #[serde(skip)]
    pub mapping: NodeMapping,
}

impl Projection {
    /// An empty projection for the given direction.
    pub fn empty(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&ProjectedNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The root node id (first emitted), if any.
    pub fn root_id(&self) -> Option<&str> {
        self.nodes.first().map(|n| n.id.as_str())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
