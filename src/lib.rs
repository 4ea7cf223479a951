//! Ragsweep - resilient RAG experiment driver for Azure AI Search + Azure OpenAI
//!
//! This crate runs retrieval-augmented generation sweeps: for each
//! configured top-k value it queries a search index, assembles a bounded
//! context from the retrieved documents, asks a chat deployment to answer
//! from that context, and logs timings, cache hits, token usage, and cost.
//! Both remote calls go through a persistent flat-file response cache and
//! a bounded exponential-backoff retry layer that honors `Retry-After`
//! hints; semantic queries degrade to keyword search once when the
//! service rejects them.
//!
//! # Example
//!
//! ```rust,no_run
//! use ragsweep::{RetryConfig, Settings, SweepRunner};
//!
//! #[tokio::main]
//! async fn main() -> ragsweep::Result<()> {
//!     let settings = Settings::from_env()?;
//!     let runner = SweepRunner::from_settings(settings, RetryConfig::default());
//!
//!     let summary = runner.run("summarize the optimization notes").await?;
//!     println!("{} ok, {} failed", summary.succeeded(), summary.failed());
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod report;
pub mod sweep;
pub mod telemetry;
pub mod version;

// Re-export main types at crate root
pub use error::{RagsweepError, Result};

pub use cache::{FileCache, chat_key, search_key};
pub use client::{
    ChatClient, ChatOutcome, HttpTransport, QueryShape, RetryConfig, RetryingTransport,
    SearchClient, Transport, Usage, doc_text,
};
pub use config::Settings;
pub use context::assemble_context;
pub use report::{AnswerLog, AnswerRecord, ResultRow, ResultsLog, estimate_cost};
pub use sweep::{CombinationOutcome, SweepRunner, SweepSummary};
pub use version::{PKG_VERSION, version_string};
