//! Per-record processing stage.
//!
//! Bridges a message source to the store: each raw record is normalized,
//! then inserted. Record-level failures never escape this stage; they are
//! logged, counted, and the loop moves on to the next record.

use chatter_core::{RawMessage, normalize};

use crate::store::MessageStore;

/// Counters for a processing run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    /// Records that passed normalization.
    pub normalized: usize,

    /// Records written to the store.
    pub stored: usize,

    /// Records dropped by a normalization failure.
    pub dropped: usize,

    /// Store writes that failed. The record is lost but the loop continues.
    pub store_errors: usize,
}

/// The normalize-then-store stage shared by all binaries.
pub struct Pipeline {
    store: MessageStore,
    stats: PipelineStats,
}

impl Pipeline {
    /// Create a pipeline writing to the given store.
    pub fn new(store: MessageStore) -> Self {
        Self {
            store,
            stats: PipelineStats::default(),
        }
    }

    /// Process one raw record.
    ///
    /// Never fails: a normalization error drops the record, a store error is
    /// logged and the record is lost. Both outcomes are counted so the
    /// shutdown summary can report them.
    pub fn handle(&mut self, raw: RawMessage) {
        let processed = match normalize(&raw) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, record = ?raw, "dropping message that failed normalization");
                self.stats.dropped += 1;
                return;
            }
        };
        self.stats.normalized += 1;

        match self.store.insert(&processed) {
            Ok(rowid) => {
                self.stats.stored += 1;
                tracing::debug!(rowid, category = %processed.category, "stored message");
            }
            Err(e) => {
                tracing::error!(error = %e, author = ?processed.author, "failed to store message");
                self.stats.store_errors += 1;
            }
        }
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;
    use tempfile::TempDir;

    fn raw(value: serde_json::Value) -> RawMessage {
        serde_json::from_value(value).unwrap()
    }

    fn pipeline_in(tmp: &TempDir) -> Pipeline {
        let store = MessageStore::new(tmp.path().join("test.sqlite"));
        store.init().unwrap();
        Pipeline::new(store)
    }

    fn query_rows(tmp: &TempDir) -> Vec<(Option<String>, String, f64, String, i64)> {
        let conn = Connection::open(tmp.path().join("test.sqlite")).unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT author, category, sentiment, sentiment_category, message_length
                 FROM messages ORDER BY id",
            )
            .unwrap();
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                ))
            })
            .unwrap();
        rows.map(|r| r.unwrap()).collect()
    }

    #[test]
    fn test_valid_record_is_stored() {
        let tmp = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(&tmp);

        pipeline.handle(raw(json!({
            "message": "check this meme",
            "author": "alice",
            "timestamp": "2024-01-01T00:00:00",
            "keyword_mentioned": "meme",
            "sentiment": 0.5,
            "message_length": 15
        })));

        let stats = pipeline.stats();
        assert_eq!(stats.normalized, 1);
        assert_eq!(stats.stored, 1);
        assert_eq!(stats.dropped, 0);

        let rows = query_rows(&tmp);
        assert_eq!(rows.len(), 1);
        let (author, category, sentiment, label, length) = &rows[0];
        assert_eq!(author.as_deref(), Some("alice"));
        assert_eq!(category, "humor");
        assert_eq!(*sentiment, 0.5);
        assert_eq!(label, "positive");
        assert_eq!(*length, 15);
    }

    #[test]
    fn test_keywordless_record_stored_as_unknown() {
        let tmp = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(&tmp);

        pipeline.handle(raw(json!({
            "message": "hi",
            "author": "bob",
            "timestamp": "t",
            "sentiment": -0.5,
            "message_length": 2
        })));

        let rows = query_rows(&tmp);
        assert_eq!(rows.len(), 1);
        let (author, category, sentiment, label, _) = &rows[0];
        assert_eq!(author.as_deref(), Some("bob"));
        assert_eq!(category, "unknown");
        assert_eq!(*sentiment, -0.5);
        assert_eq!(label, "negative");
    }

    #[test]
    fn test_invalid_record_is_dropped_not_stored() {
        let tmp = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(&tmp);

        pipeline.handle(raw(json!({
            "author": "mallory",
            "sentiment": "abc"
        })));

        let stats = pipeline.stats();
        assert_eq!(stats.dropped, 1);
        assert_eq!(stats.normalized, 0);
        assert_eq!(stats.stored, 0);
        assert!(query_rows(&tmp).is_empty());
    }

    #[test]
    fn test_bad_record_does_not_break_the_stream() {
        let tmp = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(&tmp);

        pipeline.handle(raw(json!({"author": "alice", "sentiment": 0.3})));
        pipeline.handle(raw(json!({"author": "mallory", "sentiment": null})));
        pipeline.handle(raw(json!({"author": "bob", "sentiment": -0.3})));

        let stats = pipeline.stats();
        assert_eq!(stats.stored, 2);
        assert_eq!(stats.dropped, 1);

        let rows = query_rows(&tmp);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].0.as_deref(), Some("alice"));
        assert_eq!(rows[1].0.as_deref(), Some("bob"));
    }

    #[test]
    fn test_duplicate_records_stored_twice() {
        // At-least-once delivery: redelivered records are appended again,
        // never deduplicated.
        let tmp = TempDir::new().unwrap();
        let mut pipeline = pipeline_in(&tmp);

        let record = json!({"author": "alice", "sentiment": 0.2, "keyword_mentioned": "game"});
        pipeline.handle(raw(record.clone()));
        pipeline.handle(raw(record));

        assert_eq!(pipeline.stats().stored, 2);
        assert_eq!(query_rows(&tmp).len(), 2);
    }

    #[test]
    fn test_store_error_is_counted_and_survived() {
        let tmp = TempDir::new().unwrap();
        // No init(): inserting into a schemaless file fails.
        let store = MessageStore::new(tmp.path().join("uninitialized.sqlite"));
        let mut pipeline = Pipeline::new(store);

        pipeline.handle(raw(json!({"author": "alice", "sentiment": 0.5})));
        pipeline.handle(raw(json!({"author": "bob", "sentiment": 0.5})));

        let stats = pipeline.stats();
        assert_eq!(stats.normalized, 2);
        assert_eq!(stats.stored, 0);
        assert_eq!(stats.store_errors, 2);
    }
}
