//! Telemetry metric name constants.
//!
//! Centralised metric names for ragsweep operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `ragsweep_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `client` — which remote the call targets ("search" | "chat")
//! - `cache` — which cache file was consulted ("search" | "llm")
//! - `status` — outcome: "ok" or "error"
//! - `direction` — token direction: "prompt" or "completion"

/// Total HTTP requests issued (each retry attempt counts once).
///
/// Labels: `client`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "ragsweep_requests_total";

/// HTTP request duration in seconds.
///
/// Labels: `client`.
pub const REQUEST_DURATION_SECONDS: &str = "ragsweep_request_duration_seconds";

/// Total retry attempts (not counting the initial request).
///
/// Labels: `client`.
pub const RETRIES_TOTAL: &str = "ragsweep_retries_total";

/// Total tokens consumed by chat completions.
///
/// Labels: `direction` ("prompt" | "completion").
pub const TOKENS_TOTAL: &str = "ragsweep_tokens_total";

/// Total cache hits.
///
/// Labels: `cache`.
pub const CACHE_HITS_TOTAL: &str = "ragsweep_cache_hits_total";

/// Total cache misses.
///
/// Labels: `cache`.
pub const CACHE_MISSES_TOTAL: &str = "ragsweep_cache_misses_total";

/// Total sweep combinations executed.
///
/// Labels: `status` ("ok" | "error").
pub const SWEEP_COMBINATIONS_TOTAL: &str = "ragsweep_sweep_combinations_total";
