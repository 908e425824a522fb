use tracing::{error, info, warn};

use crate::api::{ApiError, PredictionTransport, RawResponse};
use crate::models::{
    ApiErrorPayload, FetchOutcome, PredictionBody, PredictionQuery, PredictionState,
};
use crate::services::{chart_service, error_service};
use crate::surface::{ChartTarget, ErrorRegion};

/// Shown for a non-success status whose body has no usable `error` field
pub const STATUS_FALLBACK_MESSAGE: &str = "Network response was not ok";
/// Shown for a failure that carries no message of its own
pub const FETCH_FALLBACK_MESSAGE: &str = "An error occurred while fetching predictions.";

/// Request predictions for a query and classify the response.
///
/// Never fails: every problem is folded into `FetchOutcome::Failure`.
pub async fn fetch_predictions(
    transport: &dyn PredictionTransport,
    query: &PredictionQuery,
) -> FetchOutcome {
    info!("🔮 Fetching predictions for {} on {}", query.ticker(), query.date());

    match transport.get_predictions(query).await {
        Ok(response) => classify_response(response),
        Err(e) => fetch_failure(&e),
    }
}

/// Classify a completed response, in order: bad status, in-band error,
/// malformed body, series
pub fn classify_response(response: RawResponse) -> FetchOutcome {
    if !response.is_success() {
        let message = ApiErrorPayload::from_body(&response.body)
            .and_then(ApiErrorPayload::into_message)
            .unwrap_or_else(|| STATUS_FALLBACK_MESSAGE.to_string());
        warn!("Prediction request failed with status {}: {}", response.status, message);
        return FetchOutcome::Failure(message);
    }

    match PredictionBody::parse(&response.body) {
        Ok(PredictionBody::Series(series)) => {
            info!("✓ Received {} predicted points", series.len());
            FetchOutcome::Success(series)
        }
        Ok(PredictionBody::Error(payload)) => match payload.into_message() {
            Some(message) => {
                warn!("Prediction backend reported an error: {}", message);
                FetchOutcome::Failure(message)
            }
            None => fetch_failure(&ApiError::Deserialization(
                "Response contained neither predictions nor an error message".to_string(),
            )),
        },
        Err(e) => fetch_failure(&ApiError::Deserialization(format!(
            "Failed to parse response: {}",
            e
        ))),
    }
}

fn fetch_failure(e: &ApiError) -> FetchOutcome {
    error!("Error fetching predictions: {}", e);
    let message = e.to_string();
    if message.trim().is_empty() {
        FetchOutcome::Failure(FETCH_FALLBACK_MESSAGE.to_string())
    } else {
        FetchOutcome::Failure(message)
    }
}

/// One full submission cycle: fetch, then render or report.
///
/// Exactly one of the two regions is written per failure, and a successful
/// render hides any error left over from an earlier submission.
pub async fn run_prediction(
    transport: &dyn PredictionTransport,
    chart: &dyn ChartTarget,
    errors: &dyn ErrorRegion,
    query: PredictionQuery,
) -> PredictionState {
    match fetch_predictions(transport, &query).await {
        FetchOutcome::Success(series) => match chart_service::update_chart(chart, series).await {
            Ok(()) => {
                error_service::hide_error(errors).await;
                info!("✓ Chart rendered for {} on {}", query.ticker(), query.date());
                PredictionState::Rendered
            }
            Err(e) => {
                error!("Error rendering predictions: {}", e);
                error_service::display_error(errors, &e.to_string()).await;
                PredictionState::ErrorShown
            }
        },
        FetchOutcome::Failure(message) => {
            error_service::display_error(errors, &message).await;
            PredictionState::ErrorShown
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::CannedTransport;
    use super::*;
    use crate::models::{PredictionSeries, Timestamp};
    use crate::surface::Page;

    fn query() -> PredictionQuery {
        PredictionQuery::from_form("aapl", "2024-05-20")
    }

    async fn run(transport: CannedTransport) -> (std::sync::Arc<Page>, PredictionState) {
        let page = Page::new();
        let state = run_prediction(&transport, &*page, &*page, query()).await;
        (page, state)
    }

    #[test]
    fn test_classify_success_series() {
        let outcome = classify_response(RawResponse::new(
            200,
            "[[1700000000000,150.2],[1700003600000,151.0]]",
        ));
        let series = match outcome {
            FetchOutcome::Success(series) => series,
            other => panic!("expected success, got {:?}", other),
        };
        let (timestamps, prices) = series.into_columns();
        assert_eq!(
            timestamps,
            vec![
                Timestamp::Millis(1_700_000_000_000),
                Timestamp::Millis(1_700_003_600_000)
            ]
        );
        assert_eq!(prices, vec![150.2, 151.0]);
    }

    #[test]
    fn test_classify_status_failures() {
        assert_eq!(
            classify_response(RawResponse::new(404, r#"{"error":"ticker not found"}"#)),
            FetchOutcome::Failure("ticker not found".to_string())
        );
        for body in ["", "not json", "{}", r#"{"error":""}"#, "[1,2]"] {
            assert_eq!(
                classify_response(RawResponse::new(500, body)),
                FetchOutcome::Failure(STATUS_FALLBACK_MESSAGE.to_string()),
                "body {:?}",
                body
            );
        }
    }

    #[test]
    fn test_classify_in_band_error() {
        assert_eq!(
            classify_response(RawResponse::new(200, r#"{"error":"model unavailable"}"#)),
            FetchOutcome::Failure("model unavailable".to_string())
        );
    }

    #[test]
    fn test_classify_malformed_success_body() {
        for body in ["<html></html>", "42", r#"{"predictions": []}"#, r#"[["x", "y"]]"#] {
            match classify_response(RawResponse::new(200, body)) {
                FetchOutcome::Failure(message) => assert!(!message.is_empty(), "body {:?}", body),
                other => panic!("expected failure for {:?}, got {:?}", body, other),
            }
        }
    }

    #[test]
    fn test_classify_empty_series() {
        assert_eq!(
            classify_response(RawResponse::new(200, "[]")),
            FetchOutcome::Success(PredictionSeries::default())
        );
    }

    #[tokio::test]
    async fn test_transport_failure_uses_its_message() {
        let transport = CannedTransport::fail("Request failed: connection refused");
        assert_eq!(
            fetch_predictions(&transport, &query()).await,
            FetchOutcome::Failure("Request failed: connection refused".to_string())
        );
    }

    #[tokio::test]
    async fn test_transport_failure_without_message_uses_fallback() {
        let transport = CannedTransport::fail("");
        assert_eq!(
            fetch_predictions(&transport, &query()).await,
            FetchOutcome::Failure(FETCH_FALLBACK_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_run_renders_series_without_error_report() {
        let (page, state) = run(CannedTransport::respond(
            200,
            "[[1700000000000,150.2],[1700003600000,151.0]]",
        ))
        .await;

        assert_eq!(state, PredictionState::Rendered);
        assert_eq!(page.plot_calls().await, 1);
        assert!(page.error_writes().await.is_empty());
        assert!(!page.error_region().await.visible);

        let chart = page.chart().await.unwrap();
        assert_eq!(chart.data[0].y, vec![150.2, 151.0]);
    }

    #[tokio::test]
    async fn test_run_status_error_reports_once() {
        let (page, state) = run(CannedTransport::respond(400, r#"{"error":"ticker not found"}"#)).await;

        assert_eq!(state, PredictionState::ErrorShown);
        assert_eq!(page.error_writes().await, vec!["ticker not found".to_string()]);
        assert!(page.error_region().await.visible);
        assert_eq!(page.plot_calls().await, 0);
    }

    #[test]
    fn test_classify_numeric_error_field() {
        assert_eq!(
            classify_response(RawResponse::new(404, r#"{"error": 404}"#)),
            FetchOutcome::Failure("404".to_string())
        );
        assert_eq!(
            classify_response(RawResponse::new(500, r#"{"error": 0}"#)),
            FetchOutcome::Failure(STATUS_FALLBACK_MESSAGE.to_string())
        );
    }

    #[tokio::test]
    async fn test_run_unparseable_status_body_reports_fallback() {
        let (page, _) = run(CannedTransport::respond(502, "<html>Bad Gateway</html>")).await;
        assert_eq!(page.error_writes().await, vec![STATUS_FALLBACK_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_run_in_band_error_never_renders() {
        let (page, state) = run(CannedTransport::respond(200, r#"{"error":"model unavailable"}"#)).await;

        assert_eq!(state, PredictionState::ErrorShown);
        assert_eq!(page.plot_calls().await, 0);
        assert!(page.chart().await.is_none());
        assert_eq!(page.error_writes().await, vec!["model unavailable".to_string()]);
    }

    #[tokio::test]
    async fn test_run_transport_failure_reports_once() {
        let (page, state) = run(CannedTransport::fail("Request failed: timed out")).await;

        assert_eq!(state, PredictionState::ErrorShown);
        assert_eq!(page.error_writes().await, vec!["Request failed: timed out".to_string()]);
    }

    #[tokio::test]
    async fn test_run_success_hides_previous_error() {
        let page = Page::new();
        let failing = CannedTransport::respond(400, r#"{"error":"ticker not found"}"#);
        run_prediction(&failing, &*page, &*page, query()).await;
        assert!(page.error_region().await.visible);

        let ok = CannedTransport::respond(200, "[[1700000000000,150.2]]");
        let state = run_prediction(&ok, &*page, &*page, query()).await;

        assert_eq!(state, PredictionState::Rendered);
        assert!(!page.error_region().await.visible);
        assert_eq!(page.error_writes().await.len(), 1);
    }

    #[tokio::test]
    async fn test_run_reports_chart_target_failure() {
        struct BrokenChart;

        #[serenity::async_trait]
        impl ChartTarget for BrokenChart {
            async fn new_plot(
                &self,
                _target_id: &str,
                _data: &[crate::models::Trace],
                _layout: &crate::models::Layout,
            ) -> Result<(), crate::surface::PlotError> {
                Err(crate::surface::PlotError::Drawing("no canvas".to_string()))
            }
        }

        let page = Page::new();
        let transport = CannedTransport::respond(200, "[[1700000000000,150.2]]");
        let state = run_prediction(&transport, &BrokenChart, &*page, query()).await;

        assert_eq!(state, PredictionState::ErrorShown);
        assert_eq!(
            page.error_writes().await,
            vec!["Failed to draw chart: no canvas".to_string()]
        );
    }
}
