//! Run reporting: CSV results log and JSONL answers log.
//!
//! Both logs are append-only. The CSV carries one row per (query, top-k)
//! combination, success or failure; the JSONL carries one record per
//! successful answer. Neither file is ever rewritten, so partial sweeps
//! and repeated runs accumulate in place.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::client::chat::Usage;
use crate::context::truncate_chars;

/// Column order of the results CSV.
pub const CSV_HEADER: &str =
    "ts,query,top_k,use_semantic,max_chars,search_cache,llm_cache,search_sec,llm_sec,in_tokens,out_tokens,est_cost,error";

/// Error text is truncated to this many characters in the CSV.
const MAX_ERROR_CHARS: usize = 500;

/// Current local time, RFC 3339 at seconds precision.
pub fn timestamp() -> String {
    Local::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// One results-CSV row. `None` fields render as empty cells.
#[derive(Debug, Clone)]
pub struct ResultRow {
    pub ts: String,
    pub query: String,
    pub top_k: usize,
    pub use_semantic: bool,
    pub max_chars: usize,
    /// `Some(true)` = hit, `Some(false)` = miss, `None` = stage never ran.
    pub search_cache: Option<bool>,
    pub llm_cache: Option<bool>,
    pub search_sec: Option<f64>,
    pub llm_sec: Option<f64>,
    pub in_tokens: Option<u64>,
    pub out_tokens: Option<u64>,
    pub est_cost: Option<f64>,
    pub error: Option<String>,
}

impl ResultRow {
    fn to_csv_line(&self) -> String {
        let cells = [
            csv_escape(&self.ts),
            csv_escape(&self.query),
            self.top_k.to_string(),
            u8::from(self.use_semantic).to_string(),
            self.max_chars.to_string(),
            cache_flag(self.search_cache),
            cache_flag(self.llm_cache),
            opt_fmt(self.search_sec, 3),
            opt_fmt(self.llm_sec, 3),
            self.in_tokens.map(|t| t.to_string()).unwrap_or_default(),
            self.out_tokens.map(|t| t.to_string()).unwrap_or_default(),
            opt_fmt(self.est_cost, 6),
            csv_escape(truncate_chars(
                self.error.as_deref().unwrap_or(""),
                MAX_ERROR_CHARS,
            )),
        ];
        cells.join(",")
    }
}

fn cache_flag(flag: Option<bool>) -> String {
    match flag {
        Some(true) => "hit".to_string(),
        Some(false) => "miss".to_string(),
        None => String::new(),
    }
}

fn opt_fmt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_default()
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Append-only CSV results log. The header is written once, when the
/// file is created or found empty.
pub struct ResultsLog {
    path: PathBuf,
}

impl ResultsLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one row, writing the header first on a fresh file.
    pub fn append(&self, row: &ResultRow) -> Result<()> {
        let needs_header = std::fs::metadata(&self.path).map_or(true, |m| m.len() == 0);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if needs_header {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(file, "{}", row.to_csv_line())?;
        Ok(())
    }
}

/// One answers-JSONL record, written per successful combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub ts: String,
    pub query: String,
    pub top_k: usize,
    pub use_semantic: bool,
    pub answer: String,
}

/// Append-only line-delimited JSON answers log.
pub struct AnswerLog {
    path: PathBuf,
}

impl AnswerLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single JSON line.
    pub fn append(&self, record: &AnswerRecord) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", serde_json::to_string(record)?)?;
        Ok(())
    }
}

/// Estimate the cost of a completion from its token usage.
///
/// Prompt tokens bill at the input rate and completion tokens at the
/// output rate. When the service omitted `prompt_tokens` but reported
/// `total_tokens`, the total bills at the input rate. Returns `None`
/// when both prices are zero (unpriced run).
pub fn estimate_cost(usage: &Usage, input_price_per_1k: f64, output_price_per_1k: f64) -> Option<f64> {
    if input_price_per_1k == 0.0 && output_price_per_1k == 0.0 {
        return None;
    }
    let in_tokens = if usage.prompt_tokens > 0 {
        usage.prompt_tokens
    } else {
        usage.total_tokens
    };
    Some(
        (in_tokens as f64 / 1000.0) * input_price_per_1k
            + (usage.completion_tokens as f64 / 1000.0) * output_price_per_1k,
    )
}
