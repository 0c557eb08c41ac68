//! mindmap-view — hierarchy-to-diagram projection for PDF mind maps.
//!
//! Pipeline: backend JSON → `hierarchy` (validated tree) → `diagram::project`
//! (nodes, edges, node mapping) → layout surface. Clicks come back as engine
//! ids, which `resolver` maps to domain nodes and `selection` turns into the
//! current selection and detail-panel state. `api` talks to the backend.

pub mod api;
pub mod config;
pub mod diagram;
pub mod error;
pub mod hierarchy;
pub mod renderers;
pub mod resolver;
pub mod selection;

pub use config::{ApiConfig, PanelConfig, ProjectionConfig, ResolverConfig, ViewConfig};
pub use diagram::{Direction, NodeMapping, ProjectedEdge, ProjectedNode, Projection, project};
pub use error::{ApiError, HierarchyError};
pub use hierarchy::{DuplicatePolicy, HierarchicalNode, hierarchy_from_value, parse_hierarchy};
pub use resolver::{HandleTable, MatchTier, Resolution, Resolver, resolve};
pub use selection::{DetailPanel, PanelState, Selection, SelectionController, is_selected};
