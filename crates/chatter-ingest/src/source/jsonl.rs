//! JSONL file source adapter.
//!
//! Reads message records from a JSON-lines file (one record per line). In
//! follow mode the file is tailed: at end-of-file the reader waits for a
//! producer to append more lines, which mirrors how the live daemon consumes
//! a topic. A line is only processed once its newline has landed, so a
//! producer caught mid-append never yields a truncated record.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use chatter_core::RawMessage;

use super::{CancelToken, MessageSource, SourceMetadata, SourceStats};
use crate::Result;

/// Configuration for the JSONL source.
#[derive(Debug, Clone)]
pub struct JsonlConfig {
    /// Input file path.
    pub input: PathBuf,

    /// Keep reading at EOF, waiting for appended lines.
    pub follow: bool,

    /// How long to wait at EOF before retrying (follow mode).
    pub poll_interval: Duration,

    /// Stop after this many delivered records (for smoke runs).
    pub limit: Option<usize>,
}

impl Default for JsonlConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::new(),
            follow: false,
            poll_interval: Duration::from_millis(500),
            limit: None,
        }
    }
}

/// JSONL file message source.
pub struct JsonlSource {
    config: JsonlConfig,
    cancel: CancelToken,
}

impl JsonlSource {
    /// Create a new JSONL source with the given configuration.
    pub fn new(config: JsonlConfig, cancel: CancelToken) -> Self {
        Self { config, cancel }
    }

    /// Get the configuration.
    pub fn config(&self) -> &JsonlConfig {
        &self.config
    }
}

impl MessageSource for JsonlSource {
    fn name(&self) -> &'static str {
        "jsonl"
    }

    fn process<F>(&mut self, mut handler: F) -> Result<SourceStats>
    where
        F: FnMut(RawMessage) -> Result<bool>,
    {
        let mut stats = SourceStats::default();
        let mut bytes_read = 0usize;
        let mut line_no = 0usize;

        let file = File::open(&self.config.input)?;
        let mut reader = BufReader::new(file);
        let mut line = String::new();

        tracing::info!(
            path = %self.config.input.display(),
            follow = self.config.follow,
            "reading JSONL input"
        );

        loop {
            if self.cancel.is_cancelled() {
                tracing::info!("stop requested, leaving JSONL loop");
                break;
            }
            if let Some(limit) = self.config.limit
                && stats.delivered_records >= limit
            {
                tracing::info!(limit, "record limit reached");
                break;
            }

            line.clear();
            let n = reader.read_line(&mut line)?;

            if n == 0 {
                // End of file. In follow mode wait for the producer to
                // append more; otherwise we are done.
                if !self.config.follow {
                    break;
                }
                thread::sleep(self.config.poll_interval);
                continue;
            }

            if self.config.follow && !line.ends_with('\n') {
                // A producer is mid-append. Rewind and retry once the
                // newline lands.
                reader.seek_relative(-(n as i64))?;
                thread::sleep(self.config.poll_interval);
                continue;
            }

            line_no += 1;
            bytes_read += n;

            if line.trim().is_empty() {
                continue;
            }

            stats.total_records += 1;

            let raw = match RawMessage::from_json(line.trim()) {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(line = line_no, error = %e, "skipping undecodable line");
                    stats.parse_errors += 1;
                    continue;
                }
            };

            stats.delivered_records += 1;

            match handler(raw) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!("handler signaled stop");
                    break;
                }
                Err(e) => return Err(e),
            }
        }

        stats.source_metadata = SourceMetadata {
            bytes_read: Some(bytes_read),
            ..Default::default()
        };

        Ok(stats)
    }
}
