//! Data models for the prediction controller
//!
//! Queries built from the form, the series and error payloads returned by the
//! backend, and the chart specification handed to the plotting primitive.

pub mod chart;
pub mod prediction;
pub mod query;

// Re-export commonly used types for convenience
pub use chart::{Axis, AxisType, ChartSpec, Layout, LineStyle, RangeMode, Trace};
pub use prediction::{
    ApiErrorPayload, FetchOutcome, PredictionBody, PredictionPoint, PredictionSeries,
    PredictionState, Timestamp,
};
pub use query::{normalize_ticker, PredictionQuery};
