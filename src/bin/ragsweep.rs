//! ragsweep — RAG experiment driver CLI.
//!
//! Runs top-k sweeps against an Azure AI Search index and an Azure OpenAI
//! chat deployment, or issues one-shot index queries. Connection settings
//! come from the environment; flags override the tunables.

use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use ragsweep::client::search::doc_text;
use ragsweep::context::truncate_chars;
use ragsweep::{RetryConfig, Settings, SweepRunner};

/// Ragsweep experiment driver
#[derive(Parser)]
#[command(name = "ragsweep")]
#[command(version = ragsweep::PKG_VERSION)]
#[command(about = "RAG sweep driver for Azure AI Search + Azure OpenAI")]
struct Args {
    /// Increase log verbosity (default: warn; -v: debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full top-k experiment sweep
    Sweep {
        /// Query to sweep
        #[arg(short, long)]
        query: String,

        /// Comma-separated top-k values (overrides TOPK_LIST)
        #[arg(long)]
        topk: Option<String>,

        /// Request semantic ranking (overrides USE_SEMANTIC)
        #[arg(long, overrides_with = "no_semantic")]
        semantic: bool,

        /// Force plain keyword search
        #[arg(long)]
        no_semantic: bool,

        /// Per-document character cap (overrides MAX_CHARS, 0 = unlimited)
        #[arg(long)]
        max_chars: Option<usize>,

        /// Results CSV path
        #[arg(long)]
        results_csv: Option<std::path::PathBuf>,

        /// Answers JSONL path
        #[arg(long)]
        answers_jsonl: Option<std::path::PathBuf>,

        /// Search response cache path
        #[arg(long)]
        search_cache: Option<std::path::PathBuf>,

        /// Chat response cache path
        #[arg(long)]
        llm_cache: Option<std::path::PathBuf>,
    },

    /// One-shot index query, printing retrieved documents
    Search {
        /// Query text
        #[arg(short, long)]
        query: String,

        /// Number of documents to retrieve
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Request semantic ranking
        #[arg(long)]
        semantic: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();
    debug!(version = ragsweep::version_string(), "ragsweep starting");

    match args.command {
        Command::Sweep {
            query,
            topk,
            semantic,
            no_semantic,
            max_chars,
            results_csv,
            answers_jsonl,
            search_cache,
            llm_cache,
        } => {
            let mut settings = Settings::from_env()?;
            if let Some(list) = topk {
                // Reuse the env parser so flag and variable agree on format.
                settings = Settings::from_lookup(|name| match name {
                    "TOPK_LIST" => Some(list.clone()),
                    other => std::env::var(other).ok(),
                })?;
            }
            if semantic {
                settings.use_semantic = true;
            }
            if no_semantic {
                settings.use_semantic = false;
            }
            if let Some(n) = max_chars {
                settings.max_chars = n;
            }
            if let Some(path) = results_csv {
                settings.results_csv = path;
            }
            if let Some(path) = answers_jsonl {
                settings.answers_jsonl = path;
            }
            if let Some(path) = search_cache {
                settings.search_cache = path;
            }
            if let Some(path) = llm_cache {
                settings.llm_cache = path;
            }

            let runner = SweepRunner::from_settings(settings, RetryConfig::default());
            let summary = runner.run(&query).await?;

            for outcome in &summary.outcomes {
                match &outcome.error {
                    None => {
                        let cost = outcome
                            .est_cost
                            .map(|c| format!(" cost=${c:.6}"))
                            .unwrap_or_default();
                        println!(
                            "[k={}] search={:.3}s ({}) llm={:.3}s ({}){cost}",
                            outcome.top_k,
                            outcome.search_sec.unwrap_or_default(),
                            flag(outcome.search_hit),
                            outcome.llm_sec.unwrap_or_default(),
                            flag(outcome.llm_hit),
                        );
                        if let Some(answer) = &outcome.answer {
                            println!("  {}", snippet(answer, 180));
                        }
                    }
                    Some(error) => println!("[k={}] ERROR: {error}", outcome.top_k),
                }
            }
            println!(
                "{} ok, {} failed — results appended to {}",
                summary.succeeded(),
                summary.failed(),
                runner.settings().results_csv.display()
            );
        }

        Command::Search {
            query,
            top,
            semantic,
        } => {
            let settings = Settings::from_env()?;
            let runner = SweepRunner::from_settings(settings, RetryConfig::default());
            let docs = runner.search_client().search(&query, top, semantic).await?;

            if docs.is_empty() {
                println!("(no hits)");
            }
            for (rank, doc) in docs.iter().enumerate() {
                let score = doc
                    .get("@search.score")
                    .and_then(Value::as_f64)
                    .map(|s| format!("  score={s:.4}"))
                    .unwrap_or_default();
                println!("{}.{score}", rank + 1);
                println!("  {}", snippet(&doc_text(doc), 160));
            }
        }
    }

    Ok(())
}

fn flag(hit: Option<bool>) -> &'static str {
    match hit {
        Some(true) => "hit",
        Some(false) => "miss",
        None => "-",
    }
}

/// Single-line preview of a long text.
fn snippet(text: &str, max_chars: usize) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let cut = truncate_chars(&flat, max_chars);
    if cut.len() < flat.len() {
        format!("{cut} ...")
    } else {
        cut.to_string()
    }
}
