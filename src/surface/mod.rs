//! Output regions owned by the host.
//!
//! The controller never touches a host directly: it is handed a chart target
//! and an error region and writes through them. Writes are last-writer-wins;
//! nothing here orders concurrent submissions.

pub mod discord;
pub mod page;

pub use discord::DiscordSurface;
pub use page::Page;

use std::sync::Arc;

use serenity::async_trait;
use thiserror::Error;

use crate::api::PredictionTransport;
use crate::models::{Layout, Trace};

pub const PREDICT_FORM_ID: &str = "predictForm";
pub const TICKER_FIELD: &str = "ticker";
pub const DATE_FIELD: &str = "date";
pub const CHART_CONTAINER_ID: &str = "chartContainer";
pub const ERROR_MESSAGE_ID: &str = "errorMessage";

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Unknown chart target '{0}'")]
    UnknownTarget(String),
    #[error("Invalid timestamp '{0}'")]
    InvalidTimestamp(String),
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("No font for chart text: {0}")]
    Font(String),
    #[error("Chart file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to publish chart: {0}")]
    Publish(String),
}

/// The plotting primitive: draws `data` with `layout` into `target_id`,
/// replacing whatever chart was there before
#[async_trait]
pub trait ChartTarget: Send + Sync {
    async fn new_plot(&self, target_id: &str, data: &[Trace], layout: &Layout) -> Result<(), PlotError>;
}

/// The fixed message region, hidden until something is written to it.
///
/// Host write failures are logged by implementations, never returned.
#[async_trait]
pub trait ErrorRegion: Send + Sync {
    async fn set_text(&self, text: &str);
    async fn set_visible(&self, visible: bool);
}

/// Everything one submission needs from its host
#[derive(Clone)]
pub struct HostBindings {
    pub transport: Arc<dyn PredictionTransport>,
    pub chart: Arc<dyn ChartTarget>,
    pub errors: Arc<dyn ErrorRegion>,
}
