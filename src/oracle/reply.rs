//! Parsing of oracle completion text.
//!
//! The oracle is asked for JSON with a fixed key set per record kind, but it
//! may answer with anything. A reply that does not decode degrades to a
//! [`FreeTextReply`] wrapping the raw text; parsing never fails.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Confidence assigned to a reply that could not be decoded as JSON.
pub const DEFAULT_CONFIDENCE: f64 = 0.7;

/// Structured oracle answer for a GPS point.
#[derive(Debug, Deserialize)]
pub struct GpsReply {
    pub area_classification: String,
    pub activity_level: String,
    #[serde(default)]
    pub road_type: Option<String>,
    #[serde(default)]
    pub insights: Value,
}

/// Structured oracle answer for a taxi trip.
#[derive(Debug, Deserialize)]
pub struct TripReply {
    pub trip_category: String,
    pub price_category: String,
    #[serde(default)]
    pub efficiency_score: Option<f64>,
    #[serde(default)]
    pub insights: Value,
}

/// Minimal wrapper for an answer that was not valid JSON.
#[derive(Debug, Clone)]
pub struct FreeTextReply {
    pub insights: String,
    pub confidence: f64,
    pub processed_at: DateTime<Utc>,
}

/// Outcome of decoding a completion.
#[derive(Debug)]
pub enum Reply<T> {
    Structured(T),
    FreeText(FreeTextReply),
}

/// Decodes completion text into the expected structured shape, falling back
/// to a free-text wrapper when the text is not valid JSON for `T`.
pub fn parse<T: for<'de> Deserialize<'de>>(text: &str) -> Reply<T> {
    match serde_json::from_str(text) {
        Ok(parsed) => Reply::Structured(parsed),
        Err(_) => Reply::FreeText(FreeTextReply {
            insights: text.to_string(),
            confidence: DEFAULT_CONFIDENCE,
            processed_at: Utc::now(),
        }),
    }
}

/// Flattens the oracle's `insights` value into text: strings pass through,
/// anything else is re-serialized as JSON.
pub fn insight_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
