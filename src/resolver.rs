//! Maps layout-engine ids back to domain nodes.
//!
//! The layout surface may hand back a rewritten id on interaction callbacks
//! (for example `ref-5-node-node-18` for domain id `node-18`). Resolution
//! tries, in order:
//!
//! 1. an opaque handle, when a `HandleTable` is attached,
//! 2. a direct lookup,
//! 3. stripping the `ref-<n>-node-` prefix and looking up the remainder,
//! 4. a suffix/substring scan over the mapping keys (can be disabled).
//!
//! A miss is not an error: callers log it and leave state untouched.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::debug;

use crate::config::ResolverConfig;
use crate::diagram::types::{NodeMapping, ProjectedEdge, ProjectedNode, Projection};
use crate::hierarchy::HierarchicalNode;

/// Prefix for opaque engine handles. Same double-underscore convention as
/// other synthetic ids so they never clash with backend ids.
pub const HANDLE_PREFIX: &str = "__mm_";

/// `ref-<digits>-node-<domain id>`
const ENGINE_REF_PATTERN: &str = r"^ref-(\d+)-node-(.+)$";

fn engine_ref_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(ENGINE_REF_PATTERN).expect("engine ref pattern is valid"))
}

/// The domain-id part of a prefixed engine id, or `None` if the id has no prefix.
pub fn strip_engine_prefix(engine_id: &str) -> Option<&str> {
    engine_ref_regex()
        .captures(engine_id)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str())
}

// ─── Resolution ──────────────────────────────────────────────────────────────

/// Which rule produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Handle,
    Direct,
    PrefixStripped,
    Fuzzy,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub node: Arc<HierarchicalNode>,
    pub tier: MatchTier,
    /// The mapping key that matched.
    pub key: String,
}

/// Resolve with every string tier enabled and no handle table.
pub fn resolve(engine_id: &str, mapping: &NodeMapping) -> Option<Arc<HierarchicalNode>> {
    resolve_with_tier(engine_id, mapping, true).map(|r| r.node)
}

/// Resolve and report the tier that matched.
pub fn resolve_with_tier(engine_id: &str, mapping: &NodeMapping, fuzzy: bool) -> Option<Resolution> {
    if let Some(node) = mapping.get(engine_id) {
        return Some(found(engine_id, node, MatchTier::Direct));
    }

    let remainder = strip_engine_prefix(engine_id);
    if let Some(rest) = remainder {
        if let Some(node) = mapping.get(rest) {
            return Some(found(rest, node, MatchTier::PrefixStripped));
        }
    }

    if !fuzzy {
        return None;
    }

    mapping
        .iter()
        .find(|(key, _)| fuzzy_match(engine_id, remainder, key))
        .map(|(key, node)| found(key, node, MatchTier::Fuzzy))
}

fn found(key: &str, node: &Arc<HierarchicalNode>, tier: MatchTier) -> Resolution {
    Resolution {
        node: Arc::clone(node),
        tier,
        key: key.to_string(),
    }
}

/// Suffix/substring rule. Ambiguous when one id is a substring of another;
/// the first key in mapping order wins.
fn fuzzy_match(engine_id: &str, remainder: Option<&str>, key: &str) -> bool {
    if key.is_empty() {
        return false;
    }
    engine_id.ends_with(key)
        || remainder.is_some_and(|r| key.ends_with(r))
        || engine_id.contains(key)
}

// ─── HandleTable ─────────────────────────────────────────────────────────────

/// Opaque 1:1 handles for the layout surface.
///
/// Feeding the engine handles instead of domain ids makes resolution an exact
/// lookup, whatever the engine does to the strings it was given.
#[derive(Debug, Clone, Default)]
pub struct HandleTable {
    by_handle: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

impl HandleTable {
    /// Assign `__mm_<n>` to each distinct id in projection order.
    pub fn from_projection(projection: &Projection) -> Self {
        let mut table = Self::default();
        for node in &projection.nodes {
            if table.by_id.contains_key(&node.id) {
                continue;
            }
            let handle = format!("{}{}", HANDLE_PREFIX, table.by_id.len());
            table.by_handle.insert(handle.clone(), node.id.clone());
            table.by_id.insert(node.id.clone(), handle);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn handle_for(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    pub fn domain_id(&self, handle: &str) -> Option<&str> {
        self.by_handle.get(handle).map(String::as_str)
    }

    /// Copy of `projection` with node and edge endpoints replaced by handles.
    /// The node mapping stays keyed by domain id.
    pub fn to_engine(&self, projection: &Projection) -> Projection {
        let swap = |id: &str| self.handle_for(id).unwrap_or(id).to_string();
        Projection {
            direction: projection.direction,
            spacing: projection.spacing,
            nodes: projection
                .nodes
                .iter()
                .map(|n| ProjectedNode {
                    id: swap(&n.id),
                    ..n.clone()
                })
                .collect(),
            edges: projection
                .edges
                .iter()
                .map(|e| ProjectedEdge::new(swap(&e.from), swap(&e.to)))
                .collect(),
            mapping: projection.mapping.clone(),
        }
    }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolution with configuration and an optional handle table.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    config: ResolverConfig,
    handles: Option<HandleTable>,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            handles: None,
        }
    }

    pub fn with_handles(mut self, handles: HandleTable) -> Self {
        self.handles = Some(handles);
        self
    }

    pub fn set_handles(&mut self, handles: Option<HandleTable>) {
        self.handles = handles;
    }

    pub fn handles(&self) -> Option<&HandleTable> {
        self.handles.as_ref()
    }

    pub fn resolve(&self, engine_id: &str, mapping: &NodeMapping) -> Option<Resolution> {
        if let Some(resolution) = self.resolve_handle(engine_id, mapping) {
            debug!(engine_id, key = %resolution.key, "resolved engine id by handle");
            return Some(resolution);
        }

        match resolve_with_tier(engine_id, mapping, self.config.fuzzy) {
            Some(resolution) => {
                debug!(
                    engine_id,
                    key = %resolution.key,
                    tier = ?resolution.tier,
                    "resolved engine id"
                );
                Some(resolution)
            }
            None => {
                debug!(engine_id, keys = mapping.len(), "engine id did not resolve to any node");
                None
            }
        }
    }

    fn resolve_handle(&self, engine_id: &str, mapping: &NodeMapping) -> Option<Resolution> {
        let table = self.handles.as_ref()?;
        let handle = if table.domain_id(engine_id).is_some() {
            engine_id
        } else {
            strip_engine_prefix(engine_id)?
        };
        let id = table.domain_id(handle)?;
        mapping.get(id).map(|node| found(id, node, MatchTier::Handle))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
