//! Wire types of the mind-map backend.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HierarchyError;
use crate::hierarchy::{DuplicatePolicy, HierarchicalNode, hierarchy_from_value};

// ─── Mind maps ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AttachmentInfo {
    pub filename: String,
    #[serde(default)]
    pub s3_path: Option<String>,
    /// `"success"` or `"error"`.
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Response of `POST /maps/generate-mindmap`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MindMapResponse {
    pub attachment: AttachmentInfo,
    pub status: String,
    #[serde(default)]
    pub hierarchical_data: Option<Value>,
    #[serde(default)]
    pub mongodb_doc_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl MindMapResponse {
    /// Validated tree, or `None` when the backend sent no hierarchy.
    pub fn hierarchy(
        &self,
        policy: DuplicatePolicy,
    ) -> Result<Option<Arc<HierarchicalNode>>, HierarchyError> {
        match &self.hierarchical_data {
            Some(value) => hierarchy_from_value(value.clone(), policy),
            None => Ok(None),
        }
    }
}

/// Response of `GET /maps/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MapDocument {
    pub mongodb_doc_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub hierarchical_data: Option<Value>,
    #[serde(default)]
    pub original_filename: Option<String>,
}

impl MapDocument {
    pub fn hierarchy(
        &self,
        policy: DuplicatePolicy,
    ) -> Result<Option<Arc<HierarchicalNode>>, HierarchyError> {
        match &self.hierarchical_data {
            Some(value) => hierarchy_from_value(value.clone(), policy),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MapSummary {
    pub map_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_filename: Option<String>,
    /// ISO-8601 timestamp as sent by the backend.
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Response of `GET /maps/history`, newest first.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MapHistory {
    #[serde(default)]
    pub history: Vec<MapSummary>,
}

// ─── Questions ───────────────────────────────────────────────────────────────

/// Body of `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest {
    pub question: String,
    pub map_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_label: Option<String>,
    pub top_k: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct CitationSource {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub identifier: String,
    /// Original file name of the cited document.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(default)]
    pub snippet: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Answer to a question, from `POST /chat/` or `GET /maps/details`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NodeDetailResponse {
    pub query: String,
    pub answer: String,
    #[serde(default)]
    pub cited_sources: Vec<CitationSource>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `DELETE /chat/delete/{map_id}/{node_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatHistoryResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────
