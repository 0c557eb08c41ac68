//! Backend HTTP client.
//!
//! Thin typed wrapper over the mind-map backend: upload a PDF, fetch maps and
//! history, ask questions about a node, drop a node's chat history. Every
//! request carries the bearer token and the configured timeout, so a hung
//! backend surfaces as `ApiError::Timeout` instead of an endless spinner.

pub mod types;

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::ApiConfig;
use crate::error::ApiError;

pub use types::{
    AskRequest, AttachmentInfo, ChatHistoryResponse, CitationSource, MapDocument, MapHistory,
    MapSummary, MindMapResponse, NodeDetailResponse,
};

/// Async client for the mind-map backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let base_url =
            Url::parse(&config.base_url).map_err(|_| ApiError::InvalidUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(config.base_url.clone()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(ApiError::Http)?;

        Ok(Self {
            config,
            client,
            base_url,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Base URL with `segments` appended, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(ApiError::from_transport)?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from_transport)?;
        debug!(what, status = status.as_u16(), "backend response");

        if !status.is_success() {
            let err = error_for_status(status.as_u16(), &body);
            error!(what, status = status.as_u16(), error = %err, "backend request failed");
            return Err(err);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(what, error = %e, "cannot decode backend response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    // ── Maps ─────────────────────────────────────────────────────────────────

    /// Upload a PDF and have the backend build its mind map.
    pub async fn generate_mindmap(&self, pdf: &Path) -> Result<MindMapResponse, ApiError> {
        let bytes = tokio::fs::read(pdf).await.map_err(|source| ApiError::Io {
            path: pdf.display().to_string(),
            source,
        })?;
        let filename = pdf
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document.pdf".to_string());
        info!(file = %filename, bytes = bytes.len(), "uploading document");

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("application/pdf")
            .map_err(ApiError::Http)?;
        let form = Form::new().part("file", part);

        let url = self.endpoint(&["maps", "generate-mindmap"])?;
        self.send("generate-mindmap", self.client.post(url).multipart(form))
            .await
    }

    pub async fn get_map(&self, map_id: &str) -> Result<MapDocument, ApiError> {
        info!(map_id, "fetching mind map");
        let url = self.endpoint(&["maps", map_id])?;
        self.send("get-map", self.client.get(url)).await
    }

    pub async fn history(&self) -> Result<MapHistory, ApiError> {
        let url = self.endpoint(&["maps", "history"])?;
        self.send("history", self.client.get(url)).await
    }

    // ── Questions ────────────────────────────────────────────────────────────

    /// Ask a question through the chat endpoint (answers are cached per node
    /// server-side).
    pub async fn ask(&self, request: &AskRequest) -> Result<NodeDetailResponse, ApiError> {
        info!(map_id = %request.map_id, node_id = ?request.node_id, "asking question");
        let url = self.endpoint(&["chat", ""])?;
        self.send("ask", self.client.post(url).json(request)).await
    }

    /// One-shot retrieval query about a node, without chat history.
    pub async fn node_details(
        &self,
        map_id: &str,
        node_query: &str,
        top_k: u32,
    ) -> Result<NodeDetailResponse, ApiError> {
        info!(map_id, "requesting node details");
        let mut url = self.endpoint(&["maps", "details"])?;
        url.query_pairs_mut()
            .append_pair("map_id", map_id)
            .append_pair("node_query", node_query)
            .append_pair("top_k", &top_k.to_string());
        self.send("node-details", self.client.get(url)).await
    }

    pub async fn delete_chat_history(
        &self,
        map_id: &str,
        node_id: &str,
    ) -> Result<ChatHistoryResponse, ApiError> {
        info!(map_id, node_id, "deleting chat history");
        let url = self.endpoint(&["chat", "delete", map_id, node_id])?;
        self.send("delete-chat-history", self.client.delete(url))
            .await
    }
}

/// Map a non-2xx status to an error, using FastAPI's `{"detail": ...}` body when present.
pub fn error_for_status(status: u16, body: &str) -> ApiError {
    match status {
        401 => ApiError::Unauthorized,
        404 => ApiError::NotFound(error_detail(body)),
        _ => ApiError::Status {
            status,
            detail: error_detail(body),
        },
    }
}

fn error_detail(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(obj)) => match obj.get("detail") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => Value::Object(obj).to_string(),
        },
        _ if body.trim().is_empty() => "no detail".to_string(),
        _ => body.trim().to_string(),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
