//! Chatter ingestion pipeline components.
//!
//! This crate provides the consumer daemon that moves message records from a
//! broker topic into a local SQLite store, plus a file-based loader that
//! shares the same pipeline.
//!
//! # Modules
//!
//! - [`source`] - Message source adapters (Kafka topic, JSONL files)
//! - [`pipeline`] - The normalize-then-store stage
//! - [`store`] - SQLite storage gateway
//! - [`config`] - Environment-backed daemon configuration
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ Message Sources │  (Kafka topic, JSONL files)
//! └────────┬────────┘
//!          │ RawMessage
//!          ▼
//! ┌─────────────────┐
//! │    Pipeline     │  coerce numeric fields, derive category + sentiment
//! └────────┬────────┘
//!          │ ProcessedMessage
//!          ▼
//! ┌─────────────────┐
//! │  MessageStore   │  SQLite `messages` table, one connection per write
//! └─────────────────┘
//! ```
//!
//! Delivery is at-least-once: offsets are committed automatically and there
//! is no in-process deduplication. Record-level failures are isolated to the
//! record; only broker-level stream errors end the loop.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod source;
pub mod store;

// Re-export commonly used types at crate root
pub use config::Config;
pub use error::{Error, Result};

// Re-export pipeline and store components for convenience
pub use pipeline::{Pipeline, PipelineStats};
pub use store::MessageStore;

// Re-export source trait and adapters
pub use source::{
    CancelToken, JsonlConfig, JsonlSource, KafkaConfig, KafkaSource, MessageSource,
    SourceMetadata, SourceStats, verify_broker,
};
