//! Flattens a hierarchy into nodes, edges and a node mapping.
//!
//! Pre-order depth-first walk from the root. Every visited node emits one
//! `ProjectedNode` and one mapping entry; every non-root node also emits the
//! edge from its parent. Output order is emission order, so two runs over the
//! same tree produce identical vectors.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::config::ProjectionConfig;
use crate::diagram::types::{
    Direction, NodeMapping, ProjectedEdge, ProjectedNode, Projection, Spacing,
};
use crate::hierarchy::HierarchicalNode;

/// Project a hierarchy for the layout surface.
///
/// `None` yields an empty projection; it is not an error.
pub fn project(
    root: Option<&Arc<HierarchicalNode>>,
    direction: Direction,
    config: &ProjectionConfig,
) -> Projection {
    let mut projection = Projection::empty(direction);
    projection.spacing = Spacing {
        node: config.node_spacing,
        rank: config.rank_spacing,
    };

    let Some(root) = root else {
        return projection;
    };

    let height = if direction.is_vertical() {
        config.tall_node_height
    } else {
        config.node_height
    };

    visit(root, None, height, config, &mut projection);

    debug!(
        nodes = projection.nodes.len(),
        edges = projection.edges.len(),
        direction = %direction,
        "projected hierarchy"
    );
    projection
}

fn visit(
    node: &Arc<HierarchicalNode>,
    parent: Option<&str>,
    height: u32,
    config: &ProjectionConfig,
    out: &mut Projection,
) {
    out.nodes.push(ProjectedNode {
        id: node.id.clone(),
        text: node.label.clone(),
        width: config.width_for(&node.label),
        height,
    });
    record(&mut out.mapping, node);

    if let Some(parent_id) = parent {
        out.edges.push(ProjectedEdge::new(parent_id, node.id.as_str()));
    }

    for child in &node.children {
        visit(child, Some(node.id.as_str()), height, config, out);
    }
}

/// Last write wins on duplicate ids; the old entry keeps its position.
fn record(mapping: &mut NodeMapping, node: &Arc<HierarchicalNode>) {
    if let Some(previous) = mapping.insert(node.id.clone(), Arc::clone(node)) {
        warn!(
            id = %node.id,
            previous_label = %previous.label,
            label = %node.label,
            "duplicate node id; mapping entry overwritten"
        );
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
