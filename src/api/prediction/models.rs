use thiserror::Error;

/// Status and body of a completed `/predict` exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that keep a prediction request from producing a usable body
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// Client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
    /// Network/request error; the request never completed
    #[error("{0}")]
    Request(String),
    /// Body is not the JSON we expect
    #[error("{0}")]
    Deserialization(String),
}
