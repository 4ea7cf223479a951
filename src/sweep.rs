//! Top-k experiment orchestration.
//!
//! One sweep runs the full retrieve→assemble→generate pipeline once per
//! configured top-k value, logging every combination to the results CSV
//! and every successful answer to the answers JSONL. A failing
//! combination is recorded and skipped; the sweep always visits every k.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{FileCache, chat_key, search_key};
use crate::client::chat::{ChatClient, ChatOutcome, Usage, parse_chat_response};
use crate::client::retry::{RetryConfig, RetryingTransport};
use crate::client::search::{SEARCH_TIMEOUT, SearchClient, doc_text};
use crate::client::transport::{HttpTransport, Transport};
use crate::config::Settings;
use crate::context::assemble_context;
use crate::report::{AnswerLog, AnswerRecord, ResultRow, ResultsLog, estimate_cost, timestamp};
use crate::telemetry;
use crate::{RagsweepError, Result};

/// Outcome of one (query, top-k) combination.
#[derive(Debug, Clone)]
pub struct CombinationOutcome {
    pub top_k: usize,
    pub search_hit: Option<bool>,
    pub llm_hit: Option<bool>,
    pub search_sec: Option<f64>,
    pub llm_sec: Option<f64>,
    pub usage: Option<Usage>,
    pub est_cost: Option<f64>,
    pub answer: Option<String>,
    pub error: Option<String>,
}

impl CombinationOutcome {
    fn failed(top_k: usize, error: &RagsweepError) -> Self {
        Self {
            top_k,
            search_hit: None,
            llm_hit: None,
            search_sec: None,
            llm_sec: None,
            usage: None,
            est_cost: None,
            answer: None,
            error: Some(error.to_string()),
        }
    }
}

/// All per-combination outcomes of one sweep, in sweep order.
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub outcomes: Vec<CombinationOutcome>,
}

impl SweepSummary {
    /// Number of combinations that completed without error.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_none()).count()
    }

    /// Number of combinations that failed.
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

/// Drives sweeps against one search index and one chat deployment.
pub struct SweepRunner {
    settings: Settings,
    search: SearchClient,
    chat: ChatClient,
    search_cache: FileCache,
    llm_cache: FileCache,
    results: ResultsLog,
    answers: AnswerLog,
}

impl SweepRunner {
    /// Build a runner over real HTTP transports, each wrapped in the
    /// given retry policy.
    pub fn from_settings(settings: Settings, retry: RetryConfig) -> Self {
        let search_transport: Arc<dyn Transport> = Arc::new(RetryingTransport::new(
            Arc::new(HttpTransport::new("search", SEARCH_TIMEOUT)),
            retry.clone(),
        ));
        let chat_transport: Arc<dyn Transport> = Arc::new(RetryingTransport::new(
            Arc::new(HttpTransport::new("chat", crate::client::chat::CHAT_TIMEOUT)),
            retry,
        ));
        Self::with_transports(settings, search_transport, chat_transport)
    }

    /// Build a runner over caller-supplied transports.
    ///
    /// The transports are used as-is (no retry decoration), which lets
    /// tests script exact request sequences.
    pub fn with_transports(
        settings: Settings,
        search_transport: Arc<dyn Transport>,
        chat_transport: Arc<dyn Transport>,
    ) -> Self {
        let search = SearchClient::new(
            search_transport,
            settings.search_endpoint.clone(),
            settings.index.clone(),
            settings.search_key.clone(),
        );
        let chat = ChatClient::new(
            chat_transport,
            settings.aoai_endpoint.clone(),
            settings.deployment.clone(),
            settings.aoai_key.clone(),
            settings.api_version.clone(),
        );
        let search_cache = FileCache::open("search", settings.search_cache.clone());
        let llm_cache = FileCache::open("llm", settings.llm_cache.clone());
        let results = ResultsLog::new(settings.results_csv.clone());
        let answers = AnswerLog::new(settings.answers_jsonl.clone());
        Self {
            settings,
            search,
            chat,
            search_cache,
            llm_cache,
            results,
            answers,
        }
    }

    /// Run the sweep for `query` over every configured top-k value.
    ///
    /// Each combination is logged to the results CSV; successful ones are
    /// also appended to the answers JSONL. A combination failure is
    /// recorded with its error text and the sweep continues.
    pub async fn run(&self, query: &str) -> Result<SweepSummary> {
        let mut summary = SweepSummary::default();
        for &top_k in &self.settings.topk_list {
            let outcome = match self.run_combination(query, top_k).await {
                Ok(outcome) => {
                    metrics::counter!(telemetry::SWEEP_COMBINATIONS_TOTAL, "status" => "ok")
                        .increment(1);
                    info!(
                        top_k,
                        search_sec = outcome.search_sec,
                        search_hit = outcome.search_hit,
                        llm_sec = outcome.llm_sec,
                        llm_hit = outcome.llm_hit,
                        est_cost = outcome.est_cost,
                        "combination complete"
                    );
                    outcome
                }
                Err(e) => {
                    metrics::counter!(telemetry::SWEEP_COMBINATIONS_TOTAL, "status" => "error")
                        .increment(1);
                    warn!(top_k, error = %e, "combination failed, continuing sweep");
                    self.append_error_row(query, top_k, &e)?;
                    CombinationOutcome::failed(top_k, &e)
                }
            };
            summary.outcomes.push(outcome);
        }
        Ok(summary)
    }

    async fn run_combination(&self, query: &str, top_k: usize) -> Result<CombinationOutcome> {
        let semantic = self.settings.use_semantic;

        // Retrieval, cached on the readable search key. The cached value
        // is the extracted document texts, not the raw service response.
        let skey = search_key(&self.settings.index, query, top_k, semantic);
        let search_start = Instant::now();
        let (texts_value, search_hit) = self
            .search_cache
            .get_or_compute(&skey, || async {
                let docs = self.search.search(query, top_k, semantic).await?;
                let texts: Vec<String> = docs.iter().map(doc_text).collect();
                Ok(Value::from(texts))
            })
            .await?;
        let search_sec = search_start.elapsed().as_secs_f64();

        let texts: Vec<String> = serde_json::from_value(texts_value)?;
        let context = assemble_context(&texts, self.settings.max_chars);

        // Generation, cached on the digest key.
        let ckey = chat_key(&self.settings.deployment, query, &context);
        let llm_start = Instant::now();
        let (outcome_value, llm_hit) = self
            .llm_cache
            .get_or_compute(&ckey, || async {
                let outcome = self.chat.ask(query, &context).await?;
                Ok(serde_json::to_value(outcome)?)
            })
            .await?;
        let llm_sec = llm_start.elapsed().as_secs_f64();

        let outcome: ChatOutcome = match serde_json::from_value(outcome_value.clone()) {
            Ok(outcome) => outcome,
            // Older cache files store the raw service response.
            Err(_) => parse_chat_response(outcome_value)?,
        };
        let est_cost = estimate_cost(
            &outcome.usage,
            self.settings.input_price_per_1k,
            self.settings.output_price_per_1k,
        );

        let ts = timestamp();
        self.results.append(&ResultRow {
            ts: ts.clone(),
            query: query.to_string(),
            top_k,
            use_semantic: semantic,
            max_chars: self.settings.max_chars,
            search_cache: Some(search_hit),
            llm_cache: Some(llm_hit),
            search_sec: Some(search_sec),
            llm_sec: Some(llm_sec),
            in_tokens: Some(outcome.usage.prompt_tokens),
            out_tokens: Some(outcome.usage.completion_tokens),
            est_cost,
            error: None,
        })?;
        self.answers.append(&AnswerRecord {
            ts,
            query: query.to_string(),
            top_k,
            use_semantic: semantic,
            answer: outcome.content.clone(),
        })?;

        Ok(CombinationOutcome {
            top_k,
            search_hit: Some(search_hit),
            llm_hit: Some(llm_hit),
            search_sec: Some(search_sec),
            llm_sec: Some(llm_sec),
            usage: Some(outcome.usage),
            est_cost,
            answer: Some(outcome.content),
            error: None,
        })
    }

    fn append_error_row(&self, query: &str, top_k: usize, error: &RagsweepError) -> Result<()> {
        self.results.append(&ResultRow {
            ts: timestamp(),
            query: query.to_string(),
            top_k,
            use_semantic: self.settings.use_semantic,
            max_chars: self.settings.max_chars,
            search_cache: None,
            llm_cache: None,
            search_sec: None,
            llm_sec: None,
            in_tokens: None,
            out_tokens: None,
            est_cost: None,
            error: Some(error.to_string()),
        })
    }

    /// The search client, for one-shot queries outside a sweep.
    pub fn search_client(&self) -> &SearchClient {
        &self.search
    }

    /// The resolved settings this runner was built with.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
