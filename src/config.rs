//! Environment-driven settings.
//!
//! Every tunable lives in one [`Settings`] struct built up front, so the
//! rest of the crate never touches the process environment. Variable
//! names accept both the short `AOAI_*`/`AZ_*` forms and the longer
//! `AZURE_*` forms; the first present value wins. Required variables are
//! validated together — a run with three missing settings reports all
//! three at once instead of failing one at a time.

use std::path::PathBuf;

use crate::{RagsweepError, Result};

/// Default top-k sweep when `TOPK_LIST` is unset.
pub const DEFAULT_TOPK_LIST: &[usize] = &[1, 3, 5];

/// Default per-document character cap for context assembly.
pub const DEFAULT_MAX_CHARS: usize = 1200;

/// Everything a sweep run needs, resolved and validated.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Azure OpenAI resource endpoint (normalized, no trailing slash).
    pub aoai_endpoint: String,
    /// Azure OpenAI API key.
    pub aoai_key: String,
    /// Chat deployment name.
    pub deployment: String,
    /// Chat-completions API version.
    pub api_version: String,

    /// Azure AI Search endpoint (normalized, no trailing slash).
    pub search_endpoint: String,
    /// Azure AI Search API key.
    pub search_key: String,
    /// Index to query.
    pub index: String,

    /// Whether to request semantic ranking (with keyword fallback).
    pub use_semantic: bool,
    /// Per-document character cap for context assembly (0 = unlimited).
    pub max_chars: usize,
    /// Top-k values to sweep, in order.
    pub topk_list: Vec<usize>,

    /// Price per 1K prompt tokens (0 = unpriced).
    pub input_price_per_1k: f64,
    /// Price per 1K completion tokens (0 = unpriced).
    pub output_price_per_1k: f64,

    /// CSV results log path.
    pub results_csv: PathBuf,
    /// JSONL answers log path.
    pub answers_jsonl: PathBuf,
    /// Search response cache path.
    pub search_cache: PathBuf,
    /// Chat response cache path.
    pub llm_cache: PathBuf,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through an injectable variable lookup.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |names: &[&str]| -> Option<String> {
            names
                .iter()
                .find_map(|n| lookup(n).filter(|v| !v.trim().is_empty()))
        };

        // Collect every missing required variable before failing.
        let mut missing = Vec::new();
        let mut require = |canonical: &'static str, value: Option<String>| -> String {
            match value {
                Some(v) => v,
                None => {
                    missing.push(canonical);
                    String::new()
                }
            }
        };

        let aoai_endpoint = require(
            "AOAI_ENDPOINT",
            get(&["AOAI_ENDPOINT", "AZURE_OPENAI_ENDPOINT"]),
        );
        let aoai_key = require("AOAI_KEY", get(&["AOAI_KEY", "AZURE_OPENAI_KEY"]));
        let deployment = require(
            "AOAI_DEPLOYMENT",
            get(&["AOAI_DEPLOYMENT", "AZURE_OPENAI_DEPLOYMENT"]),
        );
        let search_endpoint = require(
            "AZ_SEARCH_ENDPOINT",
            get(&["AZ_SEARCH_ENDPOINT", "AZURE_SEARCH_ENDPOINT"]),
        );
        let search_key = require(
            "AZ_SEARCH_KEY",
            get(&["AZ_SEARCH_KEY", "AZURE_SEARCH_KEY"]),
        );
        let index = require("INDEX_NAME", get(&["INDEX_NAME", "AZ_SEARCH_INDEX"]));

        if !missing.is_empty() {
            return Err(RagsweepError::Configuration(format!(
                "missing required configuration: {}",
                missing.join(", ")
            )));
        }

        let api_version = get(&["AOAI_API_VERSION"])
            .unwrap_or_else(|| crate::client::chat::DEFAULT_CHAT_API_VERSION.to_string());

        let use_semantic = get(&["USE_SEMANTIC"]).is_some_and(|v| truthy(&v));

        let max_chars = match get(&["MAX_CHARS"]) {
            Some(v) => parse_numeric("MAX_CHARS", &v)?,
            None => DEFAULT_MAX_CHARS,
        };

        let topk_list = match get(&["TOPK_LIST", "TOPK"]) {
            Some(v) => parse_topk_list(&v)?,
            None => DEFAULT_TOPK_LIST.to_vec(),
        };

        let input_price_per_1k = match get(&["INPUT_PRICE_PER1K"]) {
            Some(v) => parse_numeric("INPUT_PRICE_PER1K", &v)?,
            None => 0.0,
        };
        let output_price_per_1k = match get(&["OUTPUT_PRICE_PER1K"]) {
            Some(v) => parse_numeric("OUTPUT_PRICE_PER1K", &v)?,
            None => 0.0,
        };

        Ok(Self {
            aoai_endpoint: normalize_endpoint(&aoai_endpoint),
            aoai_key,
            deployment,
            api_version,
            search_endpoint: normalize_endpoint(&search_endpoint),
            search_key,
            index,
            use_semantic,
            max_chars,
            topk_list,
            input_price_per_1k,
            output_price_per_1k,
            results_csv: PathBuf::from("results.csv"),
            answers_jsonl: PathBuf::from("answers.jsonl"),
            search_cache: PathBuf::from("search_cache.json"),
            llm_cache: PathBuf::from("llm_cache.json"),
        })
    }
}

/// Trim a trailing slash and prepend `https://` when no scheme is given.
pub fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// `1`/`true`/`yes`/`on` (case-insensitive) read as true.
pub fn truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_topk_list(raw: &str) -> Result<Vec<usize>> {
    let mut list = Vec::new();
    for part in raw.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let k: usize = part.parse().map_err(|_| {
            RagsweepError::Configuration(format!(
                "TOPK_LIST entry {part:?} is not a positive integer"
            ))
        })?;
        if k == 0 {
            return Err(RagsweepError::Configuration(
                "TOPK_LIST entries must be positive".to_string(),
            ));
        }
        list.push(k);
    }
    if list.is_empty() {
        return Ok(DEFAULT_TOPK_LIST.to_vec());
    }
    Ok(list)
}

fn parse_numeric<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        RagsweepError::Configuration(format!("{name} has invalid value {value:?}"))
    })
}
