use std::time::Duration;

use reqwest::Client as HttpClient;
use serenity::async_trait;
use tracing::debug;

use super::models::{ApiError, RawResponse};
use super::PredictionTransport;
use crate::models::PredictionQuery;

/// HTTP client for the prediction backend
pub struct PredictionClient {
    http_client: HttpClient,
    base_url: String,
}

impl PredictionClient {
    /// Create a client for `base_url` (scheme and host, no trailing `/predict`).
    ///
    /// Without a timeout the client waits as long as the transport does.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = HttpClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Build the GET request for a query; both parameters are URL-encoded
    fn build_request(&self, query: &PredictionQuery) -> Result<reqwest::Request, ApiError> {
        self.http_client
            .get(format!("{}/predict", self.base_url))
            .query(&[("ticker", query.ticker()), ("date", query.date())])
            .build()
            .map_err(|e| ApiError::Request(format!("Invalid prediction request: {}", e)))
    }
}

#[async_trait]
impl PredictionTransport for PredictionClient {
    /// GET /predict?ticker={ticker}&date={date}
    ///
    /// Any status is returned as a `RawResponse`; only failures to complete
    /// the exchange become `ApiError::Request`.
    async fn get_predictions(&self, query: &PredictionQuery) -> Result<RawResponse, ApiError> {
        let request = self.build_request(query)?;
        debug!("GET {}", request.url());

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Request(format!("Failed to read response body: {}", e)))?;

        debug!("Prediction response status {} ({} bytes)", status, body.len());
        Ok(RawResponse { status, body })
    }
}
