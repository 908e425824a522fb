//! Prediction query models

/// Normalize a raw ticker field: surrounding whitespace removed, upper-cased
pub fn normalize_ticker(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A single ticker/date request, built fresh for every submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionQuery {
    ticker: String,
    date: String,
}

impl PredictionQuery {
    /// Build a query from the raw form fields.
    ///
    /// The ticker is normalized; the date is passed through as typed.
    pub fn from_form(raw_ticker: &str, raw_date: &str) -> Self {
        Self {
            ticker: normalize_ticker(raw_ticker),
            date: raw_date.to_string(),
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn date(&self) -> &str {
        &self.date
    }
}
