//! Prediction series models and the backend payload shapes

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Point in time as the backend sent it.
///
/// Epoch milliseconds arrive as JSON numbers, formatted dates as strings.
/// The original form is kept so the chart receives exactly what was returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Millis(i64),
    Text(String),
}

impl Timestamp {
    /// Resolve to a UTC instant, `None` if the value is not a recognized date
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            Timestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Timestamp::Text(text) => parse_text_timestamp(text),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timestamp::Millis(ms) => write!(f, "{}", ms),
            Timestamp::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Accepts RFC 3339, "YYYY-MM-DD HH:MM:SS" (naive, read as UTC) and plain dates
fn parse_text_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// One `[timestamp, price]` pair of a prediction series
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(Timestamp, f64)")]
pub struct PredictionPoint {
    pub timestamp: Timestamp,
    pub price: f64,
}

impl From<(Timestamp, f64)> for PredictionPoint {
    fn from((timestamp, price): (Timestamp, f64)) -> Self {
        Self { timestamp, price }
    }
}

/// Predicted points in the order the backend returned them
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct PredictionSeries(Vec<PredictionPoint>);

impl PredictionSeries {
    pub fn new(points: Vec<PredictionPoint>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[PredictionPoint] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split into parallel timestamp and price columns, order and pairing kept
    pub fn into_columns(self) -> (Vec<Timestamp>, Vec<f64>) {
        self.0
            .into_iter()
            .map(|point| (point.timestamp, point.price))
            .unzip()
    }
}

/// `{ "error": "..." }` body sent by the backend on failures
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiErrorPayload {
    #[serde(default, deserialize_with = "error_text")]
    pub error: Option<String>,
}

/// Strings are kept; a non-zero number (`{"error": 404}`) is shown as its
/// digits. Anything else carries no message.
fn error_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    })
}

impl ApiErrorPayload {
    /// Read an error payload from a body; anything but a JSON object yields `None`
    pub fn from_body(body: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(body).ok()? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// The error message, if the payload carries a non-empty one
    pub fn into_message(self) -> Option<String> {
        self.error.filter(|message| !message.is_empty())
    }
}

/// Any body a successful `/predict` response may carry
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionBody {
    Series(PredictionSeries),
    Error(ApiErrorPayload),
}

impl PredictionBody {
    /// Arrays are series, objects are error payloads, everything else is malformed
    pub fn parse(body: &str) -> Result<Self, serde_json::Error> {
        match serde_json::from_str::<Value>(body)? {
            value @ Value::Array(_) => serde_json::from_value(value).map(PredictionBody::Series),
            value @ Value::Object(_) => serde_json::from_value(value).map(PredictionBody::Error),
            other => Err(serde_json::Error::custom(format!(
                "expected a prediction series or an error object, got {}",
                other
            ))),
        }
    }
}

/// Result of one fetch, resolved exactly once per submission
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Success(PredictionSeries),
    Failure(String),
}

/// Terminal state reached by one submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionState {
    Rendered,
    ErrorShown,
}
