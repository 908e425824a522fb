use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{PredictionQuery, PredictionState};
use crate::services::fetch_service;
use crate::surface::HostBindings;

/// A submission of the prediction form
#[derive(Debug)]
pub struct SubmitEvent {
    ticker: String,
    date: String,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(ticker: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            date: date.into(),
            default_prevented: false,
        }
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    /// Cancel the host's default submit action (page navigation)
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Handle a form submission.
///
/// Suppresses the default action, normalizes the inputs and starts one
/// prediction run in the background. Returns without waiting for it; runs
/// from overlapping submissions are independent.
pub fn handle_submit(event: &mut SubmitEvent, bindings: HostBindings) -> JoinHandle<PredictionState> {
    event.prevent_default();

    let query = PredictionQuery::from_form(event.ticker(), event.date());
    debug!("Submitted prediction form: {:?}", query);

    tokio::spawn(async move {
        fetch_service::run_prediction(
            bindings.transport.as_ref(),
            bindings.chart.as_ref(),
            bindings.errors.as_ref(),
            query,
        )
        .await
    })
}
