//! File loader for JSONL message records.
//!
//! Reads records from a JSON-lines file and runs them through the same
//! normalize-then-store pipeline as the live daemon. Useful for replaying
//! captured traffic into a store, or for tailing a file that some producer
//! is still appending to (`--follow`).
//!
//! # Pipeline
//!
//! ```text
//! [JSONL File] → [Normalize] → [MessageStore]
//! ```
//!
//! # Usage
//!
//! ```bash
//! # One-shot load into ./data/chatter.sqlite
//! chatter-jsonl -i messages.jsonl
//!
//! # Tail a live file, starting from a fresh store
//! chatter-jsonl -i live.jsonl --follow --fresh
//!
//! # Smoke run: first 100 records into a scratch database
//! chatter-jsonl -i messages.jsonl --db /tmp/scratch.sqlite --limit 100
//! ```

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chatter_ingest::{
    CancelToken, JsonlConfig, JsonlSource, MessageSource, MessageStore, Pipeline, PipelineStats,
    SourceStats,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Load JSONL message records into the chatter store.
#[derive(Parser, Debug)]
#[command(name = "chatter-jsonl")]
#[command(about = "Load JSONL message records into the SQLite store")]
#[command(version)]
struct Args {
    /// Input JSONL file path
    #[arg(short, long)]
    input: PathBuf,

    /// SQLite database file path
    #[arg(long, default_value = "./data/chatter.sqlite")]
    db: PathBuf,

    /// Keep reading at EOF, waiting for appended lines
    #[arg(long)]
    follow: bool,

    /// Delete any prior database file before starting
    #[arg(long)]
    fresh: bool,

    /// EOF retry interval in milliseconds (with --follow)
    #[arg(long, default_value = "500")]
    interval_ms: u64,

    /// Stop after this many records (for smoke runs)
    #[arg(long)]
    limit: Option<usize>,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    let store = MessageStore::new(&args.db);
    if args.fresh {
        store.reset().context("failed to delete prior database")?;
    }
    store.init().context("failed to initialize schema")?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        info!("shutdown signal received, stopping...");
        handler_token.cancel();
    })
    .context("failed to set Ctrl+C handler")?;

    let config = JsonlConfig {
        input: args.input.clone(),
        follow: args.follow,
        poll_interval: Duration::from_millis(args.interval_ms),
        limit: args.limit,
    };
    let mut source = JsonlSource::new(config, cancel);
    let mut pipeline = Pipeline::new(store);

    let start = Instant::now();
    let stats = source.process(|raw| {
        pipeline.handle(raw);
        Ok(true)
    })?;
    let elapsed = start.elapsed();

    print_summary(&args, &stats, &pipeline.stats(), elapsed);

    Ok(())
}

fn print_summary(args: &Args, stats: &SourceStats, pipe: &PipelineStats, elapsed: Duration) {
    println!("\n══════════════════════════════════════════════════");
    println!("SUMMARY");
    println!("══════════════════════════════════════════════════\n");

    println!("Input:       {}", args.input.display());
    println!("Database:    {}", args.db.display());
    println!();
    println!("Records pulled:     {:>10}", stats.total_records);
    println!("Records delivered:  {:>10}", stats.delivered_records);
    println!("Decode errors:      {:>10}", stats.parse_errors);
    println!("Records stored:     {:>10}", pipe.stored);
    println!("Records dropped:    {:>10}", pipe.dropped);
    println!("Store errors:       {:>10}", pipe.store_errors);
    println!(
        "Bytes read:         {:>10}",
        stats.source_metadata.bytes_read.unwrap_or(0)
    );
    println!();
    println!("Elapsed time:       {:>10.2?}", elapsed);

    if pipe.stored > 0 && elapsed.as_secs_f64() > 0.0 {
        let per_sec = pipe.stored as f64 / elapsed.as_secs_f64();
        println!("Throughput:         {:>10.0} records/sec", per_sec);
    }

    println!();
}
