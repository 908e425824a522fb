pub mod client;
pub mod models;

pub use client::PredictionClient;
pub use models::{ApiError, RawResponse};

use serenity::async_trait;

use crate::models::PredictionQuery;

/// Issues the `/predict` request for a query.
///
/// Implementations only move bytes; classifying the response is left to the
/// fetch pipeline.
#[async_trait]
pub trait PredictionTransport: Send + Sync {
    async fn get_predictions(&self, query: &PredictionQuery) -> Result<RawResponse, ApiError>;
}
