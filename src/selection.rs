//! Selection and detail-panel state.
//!
//! `SelectionController` is the single owner of the current node mapping and
//! the current selection. Readers subscribe to selection changes through a
//! `tokio::sync::watch` channel; only the controller writes. Installing a new
//! projection and activating a node are the only two mutations, which keeps
//! mapping and selection consistent with each other.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::api::{AskRequest, CitationSource, NodeDetailResponse};
use crate::config::{PanelConfig, ViewConfig};
use crate::diagram::types::{NodeMapping, Projection};
use crate::error::ApiError;
use crate::hierarchy::HierarchicalNode;
use crate::resolver::{HandleTable, Resolver, strip_engine_prefix};

/// The selected node, if any.
pub type Selection = Option<Arc<HierarchicalNode>>;

/// Highlight check for one rendered node: direct id equality, then
/// prefix-stripped equality.
pub fn is_selected(engine_id: &str, current: Option<&HierarchicalNode>) -> bool {
    let Some(node) = current else {
        return false;
    };
    engine_id == node.id || strip_engine_prefix(engine_id).is_some_and(|rest| rest == node.id)
}

// ─── DetailPanel ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

/// Handle for one in-flight question. Finishing a stale ticket is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    seq: u64,
    generation: u64,
}

/// Side panel showing the selected node and the answer to the last question.
#[derive(Debug, Clone)]
pub struct DetailPanel {
    config: PanelConfig,
    state: PanelState,
    node: Selection,
    question_draft: String,
    last_question: Option<String>,
    answer: Option<String>,
    sources: Vec<CitationSource>,
    error: Option<String>,
    in_flight: BTreeSet<u64>,
    next_seq: u64,
    /// Highest ticket whose result is on screen.
    shown_seq: Option<u64>,
    /// Bumped whenever content is reset; older tickets are ignored.
    generation: u64,
    clear_at: Option<Instant>,
}

impl DetailPanel {
    pub fn new(config: PanelConfig) -> Self {
        Self {
            config,
            state: PanelState::Closed,
            node: None,
            question_draft: String::new(),
            last_question: None,
            answer: None,
            sources: Vec::new(),
            error: None,
            in_flight: BTreeSet::new(),
            next_seq: 0,
            shown_seq: None,
            generation: 0,
            clear_at: None,
        }
    }

    pub fn state(&self) -> PanelState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PanelState::Open
    }

    pub fn node(&self) -> Option<&Arc<HierarchicalNode>> {
        self.node.as_ref()
    }

    pub fn question_draft(&self) -> &str {
        &self.question_draft
    }

    pub fn last_question(&self) -> Option<&str> {
        self.last_question.as_deref()
    }

    pub fn answer(&self) -> Option<&str> {
        self.answer.as_deref()
    }

    pub fn sources(&self) -> &[CitationSource] {
        &self.sources
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// `true` while any question is outstanding.
    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn pending_clear(&self) -> bool {
        self.clear_at.is_some()
    }

    /// Closed → Open for `node`. A different node starts with fresh content.
    pub fn open(&mut self, node: Arc<HierarchicalNode>) {
        let same_node = self.node.as_ref().is_some_and(|n| n.id == node.id);
        if !same_node {
            self.reset_content();
        }
        self.node = Some(node);
        self.clear_at = None;
        self.state = PanelState::Open;
    }

    /// Open → Closed. Content stays until `clear_delay` has passed.
    pub fn dismiss(&mut self, now: Instant) {
        if self.state == PanelState::Closed {
            return;
        }
        self.state = PanelState::Closed;
        self.clear_at = Some(now + self.config.clear_delay);
    }

    /// Drop content whose clear delay has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.clear_at {
            if self.state == PanelState::Closed && now >= deadline {
                self.reset_content();
                self.node = None;
                self.clear_at = None;
            }
        }
    }

    pub fn set_question_draft(&mut self, text: impl Into<String>) {
        self.question_draft = text.into();
    }

    /// Start a question. Every call gets its own ticket; nothing is de-duplicated.
    pub fn begin_question(&mut self, question: impl Into<String>) -> RequestTicket {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight.insert(seq);
        self.last_question = Some(question.into());
        self.error = None;
        RequestTicket {
            seq,
            generation: self.generation,
        }
    }

    /// Apply a finished question. Returns `false` when the result was dropped
    /// because the content was reset or a newer answer is already shown.
    pub fn finish_question(
        &mut self,
        ticket: RequestTicket,
        result: Result<NodeDetailResponse, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(seq = ticket.seq, "dropping answer for reset panel");
            return false;
        }
        self.in_flight.remove(&ticket.seq);
        if self.shown_seq.is_some_and(|shown| shown > ticket.seq) {
            debug!(seq = ticket.seq, "dropping answer older than the one shown");
            return false;
        }
        self.shown_seq = Some(ticket.seq);

        match result {
            Ok(response) => {
                self.answer = Some(response.answer);
                self.sources = response.cited_sources;
                self.error = None;
                self.question_draft.clear();
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
        true
    }

    fn reset_content(&mut self) {
        self.question_draft.clear();
        self.last_question = None;
        self.answer = None;
        self.sources.clear();
        self.error = None;
        self.in_flight.clear();
        self.shown_seq = None;
        self.generation += 1;
    }
}

// ─── SelectionController ─────────────────────────────────────────────────────

/// Owns the mapping, the selection and the detail panel for one loaded map.
pub struct SelectionController {
    mapping: NodeMapping,
    resolver: Resolver,
    selection: watch::Sender<Selection>,
    panel: DetailPanel,
}

impl SelectionController {
    pub fn new(config: &ViewConfig) -> Self {
        let (selection, _) = watch::channel(None);
        Self {
            mapping: NodeMapping::new(),
            resolver: Resolver::new(config.resolver.clone()),
            selection,
            panel: DetailPanel::new(config.panel.clone()),
        }
    }

    /// Install the mapping of a fresh projection. The previous mapping is
    /// replaced as a whole. A selection whose id survives is refreshed to the
    /// new node; otherwise it is cleared and the panel closes at `now`.
    pub fn replace_projection(
        &mut self,
        projection: &Projection,
        handles: Option<HandleTable>,
        now: Instant,
    ) {
        self.mapping = projection.mapping.clone();
        self.resolver.set_handles(handles);

        let current = self.selection.borrow().clone();
        if let Some(node) = current {
            match self.mapping.get(&node.id) {
                Some(fresh) => {
                    let fresh = Arc::clone(fresh);
                    self.selection.send_replace(Some(Arc::clone(&fresh)));
                    if self.panel.is_open() {
                        self.panel.open(fresh);
                    }
                }
                None => {
                    info!(id = %node.id, "selected node gone after reload; clearing selection");
                    self.selection.send_replace(None);
                    self.panel.dismiss(now);
                }
            }
        }
    }

    pub fn mapping(&self) -> &NodeMapping {
        &self.mapping
    }

    /// Handle a click from the layout surface.
    ///
    /// On success the selection is committed first, then the panel opens.
    /// On failure nothing changes.
    pub fn on_node_activated(&mut self, engine_id: &str) -> bool {
        let Some(resolution) = self.resolver.resolve(engine_id, &self.mapping) else {
            debug!(engine_id, "click did not identify a node");
            return false;
        };
        let node = resolution.node;
        self.selection.send_replace(Some(Arc::clone(&node)));
        self.panel.open(node);
        true
    }

    pub fn selection(&self) -> Selection {
        self.selection.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.selection.subscribe()
    }

    /// Highlight check that agrees with `on_node_activated`: the engine id is
    /// resolved the same way a click would be.
    pub fn is_selected(&self, engine_id: &str) -> bool {
        let current = self.selection.borrow();
        let Some(node) = current.as_deref() else {
            return false;
        };
        match self.resolver.resolve(engine_id, &self.mapping) {
            Some(resolution) => resolution.key == node.id,
            None => is_selected(engine_id, Some(node)),
        }
    }

    pub fn clear_selection(&mut self, now: Instant) {
        self.selection.send_replace(None);
        self.panel.dismiss(now);
    }

    pub fn panel(&self) -> &DetailPanel {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut DetailPanel {
        &mut self.panel
    }

    pub fn dismiss_panel(&mut self, now: Instant) {
        self.panel.dismiss(now);
    }

    pub fn tick(&mut self, now: Instant) {
        self.panel.tick(now);
    }

    /// Start a question about the selected node. Returns the ticket and the
    /// request to send, or `None` when nothing is selected or the question is blank.
    pub fn begin_question(
        &mut self,
        map_id: &str,
        question: &str,
        top_k: u32,
    ) -> Option<(RequestTicket, AskRequest)> {
        let question = question.trim();
        if question.is_empty() {
            return None;
        }
        let node = self.selection()?;
        let ticket = self.panel.begin_question(question);
        let request = AskRequest {
            question: question.to_string(),
            map_id: map_id.to_string(),
            node_id: Some(node.id.clone()),
            node_label: Some(node.label.clone()),
            top_k,
        };
        Some((ticket, request))
    }

    pub fn finish_question(
        &mut self,
        ticket: RequestTicket,
        result: Result<NodeDetailResponse, ApiError>,
    ) -> bool {
        self.panel.finish_question(ticket, result)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
