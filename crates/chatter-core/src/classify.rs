//! Keyword and sentiment classification.
//!
//! Both classifiers are total functions over their inputs: every keyword maps
//! to some category (falling back to [`UNKNOWN_CATEGORY`]) and every score
//! maps to some [`SentimentLabel`]. The pipeline relies on this so that
//! classification can never fail a record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Scores strictly above this are positive.
pub const POSITIVE_THRESHOLD: f64 = 0.1;

/// Scores strictly below this are negative.
pub const NEGATIVE_THRESHOLD: f64 = -0.1;

/// Category assigned when no keyword is present or the keyword is unmapped.
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Fixed keyword-to-category mapping. Lookups are case-sensitive.
pub const KEYWORD_CATEGORIES: &[(&str, &str)] = &[
    ("meme", "humor"),
    ("Python", "tech"),
    ("JavaScript", "tech"),
    ("recipe", "food"),
    ("travel", "travel"),
    ("movie", "entertainment"),
    ("game", "gaming"),
];

/// Sentiment bucket derived from a numeric score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// The lowercase form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a sentiment score.
///
/// The boundary values themselves (exactly -0.1 or 0.1) are neutral.
pub fn sentiment_label(score: f64) -> SentimentLabel {
    if score > POSITIVE_THRESHOLD {
        SentimentLabel::Positive
    } else if score < NEGATIVE_THRESHOLD {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

/// Look up the category for a keyword.
///
/// Returns [`UNKNOWN_CATEGORY`] when the keyword is absent or not in the
/// mapping. Matching is exact: "python" does not match "Python".
pub fn category_for(keyword: Option<&str>) -> &'static str {
    let Some(keyword) = keyword else {
        return UNKNOWN_CATEGORY;
    };
    KEYWORD_CATEGORIES
        .iter()
        .find(|(k, _)| *k == keyword)
        .map(|(_, category)| *category)
        .unwrap_or(UNKNOWN_CATEGORY)
}
