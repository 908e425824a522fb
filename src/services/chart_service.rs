use tracing::info;

use crate::models::chart::{PREDICTED_PRICES_COLOR, PREDICTED_PRICES_LABEL};
use crate::models::{Axis, AxisType, ChartSpec, Layout, LineStyle, PredictionSeries, RangeMode, Trace};
use crate::surface::{ChartTarget, PlotError, CHART_CONTAINER_ID};

/// Build the chart for a predicted series: one line trace over a date axis,
/// with the price axis floored at zero
pub fn build_chart(series: PredictionSeries) -> ChartSpec {
    let (timestamps, prices) = series.into_columns();

    let trace = Trace {
        x: timestamps,
        y: prices,
        mode: "lines",
        kind: "scatter",
        name: PREDICTED_PRICES_LABEL.to_string(),
        line: LineStyle {
            color: PREDICTED_PRICES_COLOR.to_string(),
        },
    };

    let layout = Layout {
        title: PREDICTED_PRICES_LABEL.to_string(),
        xaxis: Axis {
            title: "Timestamp".to_string(),
            axis_type: Some(AxisType::Date),
            range_mode: None,
        },
        yaxis: Axis {
            title: "Price".to_string(),
            axis_type: None,
            range_mode: Some(RangeMode::ToZero),
        },
    };

    ChartSpec {
        data: vec![trace],
        layout,
    }
}

/// Render a series into the chart container, replacing the previous chart
pub async fn update_chart(target: &dyn ChartTarget, series: PredictionSeries) -> Result<(), PlotError> {
    info!("📈 Rendering {} predicted points", series.len());
    let spec = build_chart(series);
    target
        .new_plot(CHART_CONTAINER_ID, &spec.data, &spec.layout)
        .await
}
