//! Raw and processed message records.
//!
//! [`RawMessage`] is the untrusted shape that arrives from a topic payload or
//! a JSONL line; every field is optional and the numeric fields may be sent
//! as numbers or as strings. [`normalize`] coerces a raw record into a
//! [`ProcessedMessage`] with the derived classification fields filled in.

use crate::classify::{SentimentLabel, UNKNOWN_CATEGORY, category_for, sentiment_label};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A message record as produced, before coercion.
///
/// Producers disagree about which fields they send and how they encode the
/// numeric ones, so `sentiment` and `message_length` are kept as raw JSON
/// values until [`normalize`] runs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawMessage {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub author: Option<String>,

    #[serde(default)]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub keyword_mentioned: Option<String>,

    /// Sentiment score as sent: number, numeric string, or anything else.
    #[serde(default, deserialize_with = "value_present")]
    pub sentiment: Option<Value>,

    /// Message length as sent: integer, float, numeric string, or junk.
    #[serde(default, deserialize_with = "value_present")]
    pub message_length: Option<Value>,
}

/// Keeps an explicit JSON `null` distinguishable from an absent field:
/// absent goes through `#[serde(default)]` to `None`, while a present value
/// (null included) lands here and becomes `Some`.
fn value_present<'de, D>(deserializer: D) -> std::result::Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RawMessage {
    /// Decode a raw record from a JSON string.
    ///
    /// Unknown fields are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the payload is not a JSON object of the
    /// expected shape (e.g. a bare array, or a non-string `author`).
    pub fn from_json(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Decode a raw record from JSON bytes, e.g. a topic payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] when the bytes are not UTF-8 JSON of the
    /// expected shape.
    pub fn from_slice(payload: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(payload)?)
    }
}

/// A fully coerced and classified record, ready for storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedMessage {
    pub message: Option<String>,
    pub author: Option<String>,
    pub timestamp: Option<String>,

    /// Derived category; [`UNKNOWN_CATEGORY`] when no keyword matched.
    pub category: String,

    /// Coerced sentiment score; 0.0 when the field was absent.
    pub sentiment: f64,

    /// Bucketed form of `sentiment`.
    pub sentiment_category: SentimentLabel,

    /// The keyword as sent, mapped or not.
    pub keyword_mentioned: Option<String>,

    /// Coerced message length; 0 when the field was absent.
    pub message_length: i64,
}

/// Coerce and classify a raw record.
///
/// The whole record fails if any coercion fails; there are no partial
/// results. Well-formed input normalizes idempotently.
///
/// Keyword detection is reported as log events (a known keyword at info, an
/// unmapped one at warn) but never affects the outcome.
///
/// # Errors
///
/// Returns [`Error::Coercion`] when `sentiment` cannot be read as a float or
/// `message_length` cannot be read as an integer. An explicit JSON `null`
/// fails coercion; only a missing field takes the default.
pub fn normalize(raw: &RawMessage) -> Result<ProcessedMessage> {
    let sentiment = coerce_sentiment(raw.sentiment.as_ref())?;
    let message_length = coerce_message_length(raw.message_length.as_ref())?;

    let keyword = raw.keyword_mentioned.as_deref();
    let category = category_for(keyword);

    match keyword {
        Some(k) if category != UNKNOWN_CATEGORY => {
            tracing::info!(keyword = k, category, "detected category keyword");
        }
        Some(k) => {
            tracing::warn!(keyword = k, "keyword not in category table");
        }
        None => {
            tracing::debug!("no keyword mentioned in message");
        }
    }

    Ok(ProcessedMessage {
        message: raw.message.clone(),
        author: raw.author.clone(),
        timestamp: raw.timestamp.clone(),
        category: category.to_string(),
        sentiment,
        sentiment_category: sentiment_label(sentiment),
        keyword_mentioned: raw.keyword_mentioned.clone(),
        message_length,
    })
}

/// Lenient float coercion: numbers pass through, strings are parsed.
/// Anything else, an explicit null included, is an error.
fn coerce_sentiment(value: Option<&Value>) -> Result<f64> {
    let Some(value) = value else {
        return Ok(0.0);
    };
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| coercion_error("sentiment", value, "float")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| coercion_error("sentiment", value, "float")),
        _ => Err(coercion_error("sentiment", value, "float")),
    }
}

/// Lenient integer coercion: integers pass through, floats truncate toward
/// zero, strings must parse as integers ("15" passes, "15.7" does not).
fn coerce_message_length(value: Option<&Value>) -> Result<i64> {
    let Some(value) = value else {
        return Ok(0);
    };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(f) = n.as_f64() {
                Ok(f.trunc() as i64)
            } else {
                Err(coercion_error("message_length", value, "integer"))
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| coercion_error("message_length", value, "integer")),
        _ => Err(coercion_error("message_length", value, "integer")),
    }
}

fn coercion_error(field: &'static str, value: &Value, expected: &'static str) -> Error {
    Error::Coercion {
        field,
        value: value.to_string(),
        expected,
    }
}
