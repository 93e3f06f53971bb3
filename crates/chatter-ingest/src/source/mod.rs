//! Message source adapters.
//!
//! This module provides adapters for the places raw message records come
//! from. Each source pulls payloads, decodes them into [`RawMessage`]
//! records, and feeds them to the pipeline.
//!
//! # Available Sources
//!
//! - [`KafkaSource`] - Subscribes to a broker topic as part of a consumer group
//! - [`JsonlSource`] - Reads a JSONL file (one record per line), optionally tailing it
//!
//! # Architecture
//!
//! All sources implement the [`MessageSource`] trait, which gives the
//! pipeline a uniform pull loop regardless of where records originate.
//! A shared [`CancelToken`] stops any source between pulls.

mod jsonl;
mod kafka;

pub use jsonl::{JsonlConfig, JsonlSource};
pub use kafka::{KafkaConfig, KafkaSource, verify_broker};

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chatter_core::RawMessage;

use crate::Result;

/// A source of raw message records.
///
/// Sources are responsible for:
/// 1. Pulling payloads from their underlying stream
/// 2. Decoding payloads into [`RawMessage`] records; undecodable payloads
///    are logged, counted, and skipped
///
/// Normalization and storage happen downstream in the pipeline.
pub trait MessageSource {
    /// Human-readable name for this source (used in logs).
    fn name(&self) -> &'static str;

    /// Pull records from this source, calling the handler for each one.
    ///
    /// The handler returns `Ok(true)` to continue, `Ok(false)` to stop
    /// gracefully, or `Err` to abort with an error.
    ///
    /// # Returns
    ///
    /// Statistics about the run.
    fn process<F>(&mut self, handler: F) -> Result<SourceStats>
    where
        F: FnMut(RawMessage) -> Result<bool>;
}

/// Cooperative stop signal checked between pulls.
///
/// Clones share one flag. The daemon flips it from a Ctrl+C handler; tests
/// flip it directly. A record already handed to the handler always runs to
/// completion before the loop exits.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// New token in the running state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop at the next pull boundary.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether a stop has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Statistics from processing a message source.
#[derive(Debug, Clone, Default)]
pub struct SourceStats {
    /// Total payloads pulled (before decoding).
    pub total_records: usize,

    /// Records decoded and handed to the handler.
    pub delivered_records: usize,

    /// Payloads that failed JSON decoding and were skipped.
    pub parse_errors: usize,

    /// Source-specific metadata (e.g., bytes read, partition count).
    pub source_metadata: SourceMetadata,
}

/// Source-specific metadata.
#[derive(Debug, Clone, Default)]
pub struct SourceMetadata {
    /// For file-based sources: total bytes read.
    pub bytes_read: Option<usize>,

    /// For topic sources: partitions in the subscribed topic.
    pub partitions: Option<usize>,
}
