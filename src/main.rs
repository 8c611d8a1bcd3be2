//! Response Cache - operator command-line interface
//!
//! Maintenance entry points over the durable cache directory: inspect entry
//! counts, repair corrupt records, clear everything, or drop a single key.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use response_cache::{CacheConfig, SharedCache};

#[derive(Parser)]
#[command(name = "response-cache", version, about = "Maintenance tools for the response cache")]
struct Cli {
    /// Cache directory (defaults to CACHE_DIR or the platform cache path)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show cache configuration and entry counts
    Stats,
    /// Remove unparseable record files and leftover temp files
    Repair,
    /// Remove every cache entry
    Clear,
    /// Remove a single entry by key, as shown in the record file name
    Invalidate { key: String },
}

fn main() -> Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "response_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration from environment variables, then apply overrides
    let mut config = CacheConfig::from_env();
    if cli.dir.is_some() {
        config.cache_dir = cli.dir;
    }

    let cache = SharedCache::new(&config);
    info!(dir = %cache.cache_dir().display(), "cache opened");

    match cli.command {
        Command::Stats => {
            let report = serde_json::json!({
                "generated_at": chrono::Utc::now().to_rfc3339(),
                "cache_dir": cache.cache_dir().display().to_string(),
                "durable_records": cache.durable_len(),
                "memory_entries": cache.len(),
                "ttl_secs": config.ttl_secs,
                "max_size": config.max_size,
                "stats": cache.stats(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Repair => {
            let removed = cache.repair();
            println!("corrupt records removed: {removed}");
        }
        Command::Clear => {
            let removed = cache.clear();
            println!("entries removed: {removed}");
        }
        Command::Invalidate { key } => {
            if cache.invalidate(&key) {
                println!("removed: {key}");
            } else {
                println!("not found: {key}");
            }
        }
    }

    Ok(())
}
