//! In-memory page host
//!
//! Mirrors the DOM surface the controller expects: a `predictForm` with
//! `ticker` and `date` inputs, a `chartContainer` and an `errorMessage`
//! region that starts hidden.

use std::collections::HashMap;
use std::sync::Arc;

use serenity::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{
    ChartTarget, ErrorRegion, HostBindings, PlotError, CHART_CONTAINER_ID, DATE_FIELD,
    ERROR_MESSAGE_ID, PREDICT_FORM_ID, TICKER_FIELD,
};
use crate::api::PredictionTransport;
use crate::models::{ChartSpec, Layout, PredictionState, Trace};
use crate::services::submit_service::{self, SubmitEvent};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorRegionState {
    pub text: String,
    pub visible: bool,
}

#[derive(Default)]
pub struct Page {
    fields: Mutex<HashMap<String, String>>,
    chart: Mutex<Option<ChartSpec>>,
    error: Mutex<ErrorRegionState>,
    plot_calls: Mutex<usize>,
    error_writes: Mutex<Vec<String>>,
    navigations: Mutex<usize>,
}

impl Page {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Type into a form input
    pub async fn set_field(&self, name: &str, value: &str) {
        self.fields
            .lock()
            .await
            .insert(name.to_string(), value.to_string());
    }

    pub async fn field(&self, name: &str) -> String {
        self.fields
            .lock()
            .await
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    /// Wire this page's regions to a transport
    pub fn bindings(self: &Arc<Self>, transport: Arc<dyn PredictionTransport>) -> HostBindings {
        HostBindings {
            transport,
            chart: self.clone(),
            errors: self.clone(),
        }
    }

    /// Submit `predictForm`.
    ///
    /// Dispatches a submit event to the handler; if the handler leaves the
    /// default action in place the page counts a navigation.
    pub async fn submit(
        self: &Arc<Self>,
        transport: Arc<dyn PredictionTransport>,
    ) -> JoinHandle<PredictionState> {
        debug!("Submitting #{}", PREDICT_FORM_ID);
        let mut event = SubmitEvent::new(
            self.field(TICKER_FIELD).await,
            self.field(DATE_FIELD).await,
        );

        let run = submit_service::handle_submit(&mut event, self.bindings(transport));

        if !event.default_prevented() {
            *self.navigations.lock().await += 1;
        }
        run
    }

    /// Current content of `chartContainer`
    pub async fn chart(&self) -> Option<ChartSpec> {
        self.chart.lock().await.clone()
    }

    /// Current state of `errorMessage`
    pub async fn error_region(&self) -> ErrorRegionState {
        self.error.lock().await.clone()
    }

    pub async fn plot_calls(&self) -> usize {
        *self.plot_calls.lock().await
    }

    /// Every text written to `errorMessage`, oldest first
    pub async fn error_writes(&self) -> Vec<String> {
        self.error_writes.lock().await.clone()
    }

    pub async fn navigations(&self) -> usize {
        *self.navigations.lock().await
    }
}

#[async_trait]
impl ChartTarget for Page {
    async fn new_plot(&self, target_id: &str, data: &[Trace], layout: &Layout) -> Result<(), PlotError> {
        if target_id != CHART_CONTAINER_ID {
            return Err(PlotError::UnknownTarget(target_id.to_string()));
        }

        *self.plot_calls.lock().await += 1;
        *self.chart.lock().await = Some(ChartSpec {
            data: data.to_vec(),
            layout: layout.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl ErrorRegion for Page {
    async fn set_text(&self, text: &str) {
        debug!("#{} text: {}", ERROR_MESSAGE_ID, text);
        self.error_writes.lock().await.push(text.to_string());
        self.error.lock().await.text = text.to_string();
    }

    async fn set_visible(&self, visible: bool) {
        debug!("#{} visible: {}", ERROR_MESSAGE_ID, visible);
        self.error.lock().await.visible = visible;
    }
}
