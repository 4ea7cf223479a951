//! Azure OpenAI chat-completions client.
//!
//! Sends a grounded-answer prompt through the [`Transport`] seam: the
//! system message pins the model to the supplied context, and the user
//! message carries the query and context under fixed headings so cache
//! keys stay stable.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::transport::Transport;
use crate::telemetry;
use crate::{RagsweepError, Result};

/// Default chat-completions API version.
pub const DEFAULT_CHAT_API_VERSION: &str = "2024-07-18";

/// Fixed per-request timeout for chat calls.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

/// System prompt pinning the model to the retrieved context.
pub const SYSTEM_PROMPT: &str =
    "Use ONLY the provided context. If context is missing, say so briefly.";

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 400;

/// Client for one chat deployment.
pub struct ChatClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    deployment: String,
    api_key: String,
    api_version: String,
}

impl ChatClient {
    /// Create a client for `deployment` at `endpoint`.
    pub fn new(
        transport: Arc<dyn Transport>,
        endpoint: impl Into<String>,
        deployment: impl Into<String>,
        api_key: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            api_key: api_key.into(),
            api_version: api_version.into(),
        }
    }

    /// The chat/completions URL for this deployment.
    pub fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }

    /// The JSON body for a grounded-answer request.
    pub fn request_body(&self, query: &str, context: &str) -> Result<Value> {
        let body = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!("# Query\n{query}\n\n# Context\n{context}"),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };
        Ok(serde_json::to_value(body)?)
    }

    /// Ask the deployment to answer `query` from `context`.
    pub async fn ask(&self, query: &str, context: &str) -> Result<ChatOutcome> {
        let body = self.request_body(query, context)?;
        let headers = vec![("api-key".to_string(), self.api_key.clone())];
        let response = self
            .transport
            .post_json(&self.url(), &headers, &body)
            .await?;
        parse_chat_response(response)
    }
}

/// Extract the answer text and token usage from a raw chat response.
pub fn parse_chat_response(response: Value) -> Result<ChatOutcome> {
    let parsed: ChatResponse = serde_json::from_value(response)?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .map(|m| m.content)
        .unwrap_or_default();
    if content.is_empty() {
        return Err(RagsweepError::EmptyResponse);
    }

    let usage = parsed.usage.unwrap_or_default();
    metrics::counter!(telemetry::TOKENS_TOTAL, "direction" => "prompt")
        .increment(usage.prompt_tokens);
    metrics::counter!(telemetry::TOKENS_TOTAL, "direction" => "completion")
        .increment(usage.completion_tokens);

    Ok(ChatOutcome { content, usage })
}

/// A completed chat call: the answer text plus token accounting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatOutcome {
    pub content: String,
    #[serde(default)]
    pub usage: Usage,
}

/// Token usage as reported by the service. Absent fields read as zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[derive(Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: String,
}
