//! Diagram layer — projection of a hierarchy into layout-surface input.

pub mod graph;
pub mod projector;
pub mod types;

pub use graph::{DiagramGraph, ShapeIssue};
pub use projector::project;
pub use types::{Direction, NodeMapping, ProjectedEdge, ProjectedNode, Projection, Spacing};
