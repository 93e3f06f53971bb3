//! Core record types and classification for the chatter message pipeline.
//!
//! This crate provides:
//! - The raw and processed message record types
//! - Numeric coercion for loosely-typed producer payloads (numbers or
//!   numeric strings, absent fields defaulted, junk rejected)
//! - Keyword-to-category and sentiment-score classification
//! - Shared error types
//!
//! No I/O happens here beyond log events; sources and storage live in the
//! `chatter-ingest` crate.

mod classify;
mod error;
mod message;

pub use classify::{
    KEYWORD_CATEGORIES, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD, SentimentLabel, UNKNOWN_CATEGORY,
    category_for, sentiment_label,
};
pub use error::{Error, Result};
pub use message::{ProcessedMessage, RawMessage, normalize};
