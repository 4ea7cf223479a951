//! Azure AI Search client.
//!
//! Issues index queries through the [`Transport`] seam and applies the
//! [`QueryShape`](super::shaping::QueryShape) downgrade chain, so a
//! service without semantic ranking silently degrades to keyword search.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::shaping::QueryShape;
use super::transport::Transport;
use crate::{RagsweepError, Result};

/// REST API version for index queries.
pub const SEARCH_API_VERSION: &str = "2023-11-01";

/// Fixed per-request timeout for search calls.
pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// Document fields probed for body text, in priority order.
const TEXT_FIELDS: &[&str] = &["content", "text", "chunk", "pageContent", "body"];

/// Client for one search index.
pub struct SearchClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    index: String,
    api_key: String,
}

impl SearchClient {
    /// Create a client for `index` at `endpoint`.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        index: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            index: index.into(),
            api_key: api_key.into(),
        }
    }

    /// The docs/search URL for this index.
    pub fn url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.index,
            SEARCH_API_VERSION
        )
    }

    /// Query the index, returning the raw result documents.
    ///
    /// When `semantic` is set the semantic shape is tried first; a
    /// service that rejects it triggers exactly one keyword reissue.
    pub async fn search(&self, query: &str, top_k: usize, semantic: bool) -> Result<Vec<Value>> {
        let url = self.url();
        let headers = vec![("api-key".to_string(), self.api_key.clone())];

        let mut last_err = None;
        for shape in QueryShape::chain(semantic) {
            let body = serde_json::to_value(SearchRequest {
                search: query,
                top: top_k,
                query_type: shape.semantic.then_some("semantic"),
                semantic_configuration: shape.semantic.then_some("default"),
            })?;
            match self.transport.post_json(&url, &headers, &body).await {
                Ok(response) => {
                    let parsed: SearchResponse = serde_json::from_value(response)?;
                    return Ok(parsed.value);
                }
                Err(e) if shape.downgrades_on(&e) => {
                    warn!(shape = shape.label, index = %self.index, error = %e,
                        "query shape rejected, downgrading");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            RagsweepError::Configuration("query shape chain was empty".to_string())
        }))
    }
}

/// Extract the body text of a retrieved document.
///
/// Index schemas vary: probe the conventional field names first, then
/// the same names nested under `_source`, and fall back to the whole
/// document as JSON so nothing retrieved is ever silently dropped.
pub fn doc_text(doc: &Value) -> String {
    for field in TEXT_FIELDS {
        if let Some(s) = doc.get(field).and_then(Value::as_str) {
            return s.to_string();
        }
    }
    if let Some(source) = doc.get("_source").filter(|v| v.is_object()) {
        for field in TEXT_FIELDS {
            if let Some(s) = source.get(field).and_then(Value::as_str) {
                return s.to_string();
            }
        }
    }
    doc.to_string()
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    top: usize,
    #[serde(rename = "queryType", skip_serializing_if = "Option::is_none")]
    query_type: Option<&'static str>,
    #[serde(
        rename = "semanticConfiguration",
        skip_serializing_if = "Option::is_none"
    )]
    semantic_configuration: Option<&'static str>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<Value>,
}
