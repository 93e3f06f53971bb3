//! Chatter live ingestion daemon.
//!
//! This is the main entry point for the consumer. It subscribes to the
//! configured topic as part of a consumer group, normalizes each record,
//! and appends it to the SQLite store. Configuration comes from the
//! environment (optionally via a `.env` file).
//!
//! # Usage
//!
//! ```bash
//! # Run with default settings (localhost broker, ./data/chatter.sqlite)
//! chatter-ingest
//!
//! # Point at another cluster and store
//! KAFKA_BROKER_ADDRESS=broker:9092 CHATTER_DB_PATH=/var/lib/chatter.sqlite chatter-ingest
//! ```
//!
//! # Exit codes
//!
//! Bootstrap failures exit with distinct codes so a supervisor can tell
//! them apart:
//!
//! | code | failure                                     |
//! |------|---------------------------------------------|
//! | 1    | configuration could not be read             |
//! | 2    | prior database file could not be deleted    |
//! | 3    | schema initialization failed                |
//! | 11   | broker unreachable                          |
//! | 12   | consumer construction failed                |
//! | 13   | topic missing or without partitions         |
//! | 14   | unrecoverable stream error while consuming  |
//!
//! # Graceful Shutdown
//!
//! SIGINT (Ctrl+C) and SIGTERM flip a cancel token; the loop exits at the
//! next poll boundary, logs a summary, and the process exits 0.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use chatter_ingest::{
    CancelToken, Config, KafkaConfig, KafkaSource, MessageSource, MessageStore, Pipeline,
    verify_broker,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

const EXIT_CONFIG: u8 = 1;
const EXIT_STORE_RESET: u8 = 2;
const EXIT_STORE_INIT: u8 = 3;
const EXIT_BROKER_UNREACHABLE: u8 = 11;
const EXIT_CONSUMER_CREATE: u8 = 12;
const EXIT_TOPIC_UNAVAILABLE: u8 = 13;
const EXIT_STREAM_FAILED: u8 = 14;

/// Timeout for bootstrap metadata requests.
const METADATA_TIMEOUT: Duration = Duration::from_secs(5);

/// Chatter live ingestion daemon.
#[derive(Parser, Debug)]
#[command(name = "chatter-ingest")]
#[command(about = "Kafka-to-SQLite message ingestion daemon")]
#[command(version)]
struct Args {
    /// Path to a .env file with configuration overrides
    #[arg(long, env = "DOTENV_PATH", default_value = ".env")]
    env_file: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Load the env file before anything reads the environment; RUST_LOG may
    // live there too.
    if args.env_file.exists()
        && let Err(e) = dotenvy::from_path(&args.env_file)
    {
        eprintln!("failed to load {}: {e}", args.env_file.display());
        return ExitCode::from(EXIT_CONFIG);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap())
                .add_directive("chatter_ingest=debug".parse().unwrap()),
        )
        .init();

    tracing::info!("chatter ingestion daemon starting...");

    // Step 1: configuration.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "failed to read configuration");
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    // Step 2: fresh start. Each run begins with an empty store.
    let store = MessageStore::new(&config.db_path);
    if let Err(e) = store.reset() {
        tracing::error!(error = %e, path = %config.db_path.display(), "failed to delete prior database");
        return ExitCode::from(EXIT_STORE_RESET);
    }

    // Step 3: schema.
    if let Err(e) = store.init() {
        tracing::error!(error = %e, path = %config.db_path.display(), "failed to initialize schema");
        return ExitCode::from(EXIT_STORE_INIT);
    }

    // Step 4: broker reachability, probed before the group consumer exists.
    if let Err(e) = verify_broker(&config.broker_address, METADATA_TIMEOUT) {
        tracing::error!(error = %e, "broker verification failed");
        return ExitCode::from(EXIT_BROKER_UNREACHABLE);
    }

    // Set up graceful shutdown: the handler only flips the token, the loop
    // notices at the next poll boundary.
    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        tracing::info!("shutdown signal received, stopping after current record...");
        handler_token.cancel();
    }) {
        tracing::error!(error = %e, "failed to set Ctrl+C handler");
        return ExitCode::from(EXIT_CONFIG);
    }

    // Step 5: the group consumer.
    let kafka_config = KafkaConfig {
        brokers: config.broker_address.clone(),
        topic: config.topic.clone(),
        group_id: config.consumer_group.clone(),
        poll_timeout: config.poll_interval,
        metadata_timeout: METADATA_TIMEOUT,
    };
    let mut source = match KafkaSource::connect(kafka_config, cancel.clone()) {
        Ok(source) => source,
        Err(e) => {
            tracing::error!(error = %e, "failed to construct consumer");
            return ExitCode::from(EXIT_CONSUMER_CREATE);
        }
    };

    // Step 6: the topic must already exist (the producer creates it).
    if let Err(e) = source.verify_topic() {
        tracing::error!(error = %e, topic = %config.topic, "topic verification failed");
        return ExitCode::from(EXIT_TOPIC_UNAVAILABLE);
    }

    tracing::info!(topic = %config.topic, "bootstrap complete, consuming...");

    let mut pipeline = Pipeline::new(store);

    let stats = match source.process(|raw| {
        pipeline.handle(raw);
        Ok(true)
    }) {
        Ok(stats) => stats,
        Err(e) => {
            tracing::error!(error = %e, "stream failed");
            return ExitCode::from(EXIT_STREAM_FAILED);
        }
    };

    let pipe_stats = pipeline.stats();

    // Print summary
    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("SHUTDOWN COMPLETE");
    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Records pulled:        {}", stats.total_records);
    tracing::info!("Records delivered:     {}", stats.delivered_records);
    tracing::info!("Payload decode errors: {}", stats.parse_errors);
    tracing::info!("Records stored:        {}", pipe_stats.stored);
    tracing::info!("Records dropped:       {}", pipe_stats.dropped);
    tracing::info!("Store write errors:    {}", pipe_stats.store_errors);
    tracing::info!(
        "Topic partitions:      {}",
        stats.source_metadata.partitions.unwrap_or(0)
    );

    ExitCode::SUCCESS
}
