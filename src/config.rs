//! Configuration for projection, resolution, the detail panel and the API client.
//!
//! All knobs are plain structs with a `Default` that matches what the web
//! client ships with. The CLI overrides the pieces it exposes as flags.

use std::time::Duration;

// ─── Projection constants ────────────────────────────────────────────────────

/// Narrowest a projected node may be, regardless of label length.
pub const MIN_NODE_WIDTH: u32 = 100;
/// Widest a projected node may be; longer labels wrap inside the engine.
pub const MAX_NODE_WIDTH: u32 = 200;
/// Width added per label character.
pub const WIDTH_PER_CHAR: u32 = 6;
/// Fixed width added on top of the per-character share.
pub const WIDTH_PADDING: u32 = 20;
/// Node height for horizontal layouts (LR / RL).
pub const NODE_HEIGHT: u32 = 50;
/// Node height for vertical layouts (TD / BT).
pub const TALL_NODE_HEIGHT: u32 = 80;
/// Gap between sibling nodes, handed to the layout surface.
pub const NODE_SPACING: u32 = 40;
/// Gap between tree levels, handed to the layout surface.
pub const RANK_SPACING: u32 = 80;

// ─── ProjectionConfig ────────────────────────────────────────────────────────

/// Sizing parameters for the diagram projector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionConfig {
    pub min_width: u32,
    pub max_width: u32,
    pub width_per_char: u32,
    pub width_padding: u32,
    pub node_height: u32,
    pub tall_node_height: u32,
    pub node_spacing: u32,
    pub rank_spacing: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_NODE_WIDTH,
            max_width: MAX_NODE_WIDTH,
            width_per_char: WIDTH_PER_CHAR,
            width_padding: WIDTH_PADDING,
            node_height: NODE_HEIGHT,
            tall_node_height: TALL_NODE_HEIGHT,
            node_spacing: NODE_SPACING,
            rank_spacing: RANK_SPACING,
        }
    }
}

impl ProjectionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Width for a label: `clamp(chars * per_char + padding, min, max)`.
    ///
    /// Counts Unicode scalar values, not bytes, so non-Latin labels size the
    /// same way as ASCII ones.
    pub fn width_for(&self, label: &str) -> u32 {
        let chars = u32::try_from(label.chars().count()).unwrap_or(u32::MAX);
        let raw = chars
            .saturating_mul(self.width_per_char)
            .saturating_add(self.width_padding);
        // `clamp` panics when min > max; a misconfigured pair degrades to max.
        raw.max(self.min_width).min(self.max_width)
    }
}

// ─── ResolverConfig ──────────────────────────────────────────────────────────

/// Controls which resolution tiers are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Enable the suffix/substring fallback. Turn off when the layout surface
    /// is fed opaque handles and never rewrites ids.
    pub fuzzy: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { fuzzy: true }
    }
}

// ─── PanelConfig ─────────────────────────────────────────────────────────────

/// Detail panel timings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// How long content stays visible after the panel closes (close animation).
    pub clear_delay: Duration,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            clear_delay: Duration::from_millis(300),
        }
    }
}

// ─── ApiConfig ───────────────────────────────────────────────────────────────

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Retrieved chunks per question when the caller does not say otherwise.
pub const DEFAULT_TOP_K: u32 = 10;

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL including the API version prefix, without trailing slash.
    pub base_url: String,
    /// Bearer token; `None` sends unauthenticated requests.
    pub token: Option<String>,
    /// Per-request timeout. A hanging request surfaces as `ApiError::Timeout`.
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            ..Self::default()
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ─── ViewConfig ──────────────────────────────────────────────────────────────

/// Everything a mind-map view session needs.
#[derive(Debug, Clone, Default)]
pub struct ViewConfig {
    pub projection: ProjectionConfig,
    pub resolver: ResolverConfig,
    pub panel: PanelConfig,
    pub api: ApiConfig,
}

impl ViewConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
