//! Ragsweep error types

use std::time::Duration;

/// Ragsweep error types
#[derive(Debug, thiserror::Error)]
pub enum RagsweepError {
    // Transport/network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 429 or 503 — the service is shedding load. The only error
    /// class the retry layer will re-attempt.
    #[error("service overloaded ({status}): {message}")]
    Overloaded {
        status: u16,
        retry_after: Option<Duration>,
        message: String,
    },

    /// Raised after the final failed attempt of a retry loop. Carries the
    /// request URL and the last server error text so the log line is
    /// actionable without re-running.
    #[error("max retries exceeded for {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),

    // Soft errors
    #[error("empty response from model")]
    EmptyResponse,
}

impl RagsweepError {
    /// Whether this error is worth retrying.
    ///
    /// Only overload signals (429/503) qualify. Network failures, other
    /// HTTP statuses, and local errors are terminal: retrying them repeats
    /// the same outcome against these services.
    pub fn is_transient(&self) -> bool {
        matches!(self, RagsweepError::Overloaded { .. })
    }

    /// Server-provided retry hint, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            RagsweepError::Overloaded { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// The server's own error text, when the error carries one.
    ///
    /// Falls back to the full display form for local errors. Used to build
    /// [`RagsweepError::RetriesExhausted`] and the CSV error column.
    pub fn server_text(&self) -> String {
        match self {
            RagsweepError::Api { message, .. } => message.clone(),
            RagsweepError::Overloaded { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for ragsweep operations
pub type Result<T> = std::result::Result<T, RagsweepError>;
