use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Duration, Utc};
use plotters::drawing::DrawingAreaErrorKind;
use plotters_backend::DrawingErrorKind;
use plotters::prelude::*;

use crate::models::{Layout, RangeMode, Trace};
use crate::surface::PlotError;

static CHART_FILE_SEQ: AtomicU64 = AtomicU64::new(0);

type Series = Vec<Vec<(DateTime<Utc>, f64)>>;

/// Draw traces onto a PNG image and return its bytes.
///
/// Without a usable font the chart is drawn again with no caption, axis
/// labels or legend.
pub fn render_png(data: &[Trace], layout: &Layout, width: u32, height: u32) -> Result<Vec<u8>, PlotError> {
    let series = resolve_series(data)?;

    let instants: Vec<DateTime<Utc>> = series
        .iter()
        .flat_map(|points| points.iter().map(|(t, _)| *t))
        .collect();
    let prices: Vec<f64> = series
        .iter()
        .flat_map(|points| points.iter().map(|(_, p)| *p))
        .collect();

    let x_range = time_range(&instants, Utc::now());
    let y_range = price_range(&prices, layout.yaxis.range_mode);

    let labelled = with_temp_png(|path| {
        draw_labelled(path, (width, height), data, &series, layout, x_range, y_range)
    });

    match labelled {
        Err(PlotError::Font(e)) => {
            tracing::warn!("No font available for chart text, drawing without labels: {}", e);
            with_temp_png(|path| draw_bare(path, (width, height), data, &series, x_range, y_range))
        }
        other => other,
    }
}

/// Run `draw` against a fresh temporary PNG path and return the file's bytes.
///
/// The file is removed whether or not drawing succeeded.
fn with_temp_png<F>(draw: F) -> Result<Vec<u8>, PlotError>
where
    F: FnOnce(&Path) -> Result<(), PlotError>,
{
    // BitMapBackend encodes PNG only when writing to a path
    let temp_file = std::env::temp_dir().join(format!(
        "ticker_forecast_chart_{}_{}.png",
        Utc::now().timestamp_millis(),
        CHART_FILE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    let image_data = draw(&temp_file).and_then(|_| Ok(fs::read(&temp_file)?));

    match fs::remove_file(&temp_file) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            tracing::warn!("Failed to delete temporary chart file {}: {}", temp_file.display(), e);
        }
        _ => {}
    }

    image_data
}

fn drawing_error<E>(step: &str, e: DrawingAreaErrorKind<E>) -> PlotError
where
    E: std::error::Error + Send + Sync,
{
    match e {
        DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(e)) => PlotError::Font(format!("{}: {}", step, e)),
        other => PlotError::Drawing(format!("{}: {}", step, other)),
    }
}

fn draw_labelled(
    path: &Path,
    size: (u32, u32),
    data: &[Trace],
    series: &Series,
    layout: &Layout,
    (x_min, x_max): (DateTime<Utc>, DateTime<Utc>),
    (y_min, y_max): (f64, f64),
) -> Result<(), PlotError> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| drawing_error("Failed to fill canvas", e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&layout.title, ("sans-serif", 40.0).into_font())
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| drawing_error("Failed to build chart", e))?;

    chart
        .configure_mesh()
        .x_desc(&layout.xaxis.title)
        .y_desc(&layout.yaxis.title)
        .draw()
        .map_err(|e| drawing_error("Failed to draw mesh", e))?;

    for (trace, points) in data.iter().zip(series) {
        let color = trace_color(trace);
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
            .map_err(|e| drawing_error("Failed to draw line", e))?
            .label(trace.name.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(|e| drawing_error("Failed to draw legend", e))?;

    root.present()
        .map_err(|e| drawing_error("Failed to render chart", e))
}

/// Lines only; nothing here needs a font
fn draw_bare(
    path: &Path,
    size: (u32, u32),
    data: &[Trace],
    series: &Series,
    (x_min, x_max): (DateTime<Utc>, DateTime<Utc>),
    (y_min, y_max): (f64, f64),
) -> Result<(), PlotError> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| drawing_error("Failed to fill canvas", e))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(15)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| drawing_error("Failed to build chart", e))?;

    for (trace, points) in data.iter().zip(series) {
        chart
            .draw_series(LineSeries::new(points.iter().copied(), trace_color(trace).stroke_width(2)))
            .map_err(|e| drawing_error("Failed to draw line", e))?;
    }

    root.present()
        .map_err(|e| drawing_error("Failed to render chart", e))
}

fn trace_color(trace: &Trace) -> RGBAColor {
    parse_css_color(&trace.line.color).unwrap_or_else(|| BLUE.to_rgba())
}

/// Pair each trace's timestamps with its prices as UTC instants
fn resolve_series(data: &[Trace]) -> Result<Series, PlotError> {
    data.iter()
        .map(|trace| {
            trace
                .x
                .iter()
                .zip(trace.y.iter())
                .map(|(timestamp, price)| {
                    timestamp
                        .to_utc()
                        .map(|instant| (instant, *price))
                        .ok_or_else(|| PlotError::InvalidTimestamp(timestamp.to_string()))
                })
                .collect()
        })
        .collect()
}

/// Horizontal span covering every instant.
///
/// A single instant gets one hour of width; no data gets the last day.
fn time_range(instants: &[DateTime<Utc>], now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let (Some(min), Some(max)) = (instants.iter().min(), instants.iter().max()) else {
        return (now - Duration::days(1), now);
    };

    if max > min {
        (*min, *max)
    } else {
        (*min, *min + Duration::hours(1))
    }
}

/// Vertical span; with `ToZero` the minimum is always 0
fn price_range(prices: &[f64], range_mode: Option<RangeMode>) -> (f64, f64) {
    let finite = prices.iter().copied().filter(|p| p.is_finite());
    let min = finite.clone().fold(f64::INFINITY, f64::min);
    let max = finite.fold(f64::NEG_INFINITY, f64::max);

    match range_mode {
        Some(RangeMode::ToZero) => {
            let top = if max > 0.0 { max * 1.1 } else { 1.0 };
            (0.0, top)
        }
        None if min.is_finite() && max.is_finite() => {
            let padding = (max - min).max(1e-8) * 0.1;
            (min - padding, max + padding)
        }
        None => (0.0, 1.0),
    }
}

/// Parse `rgb(r, g, b)` / `rgba(r, g, b, a)` strings
fn parse_css_color(css: &str) -> Option<RGBAColor> {
    let css = css.trim();
    let inner = css
        .strip_prefix("rgba(")
        .or_else(|| css.strip_prefix("rgb("))?
        .strip_suffix(')')?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let (r, g, b) = match parts.as_slice() {
        [r, g, b] | [r, g, b, _] => (
            r.parse::<u8>().ok()?,
            g.parse::<u8>().ok()?,
            b.parse::<u8>().ok()?,
        ),
        _ => return None,
    };
    let alpha = match parts.get(3) {
        Some(a) => a.parse::<f64>().ok()?.clamp(0.0, 1.0),
        None => 1.0,
    };

    Some(RGBAColor(r, g, b, alpha))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartSpec, Timestamp};
    use crate::services::chart_service::build_chart;
    use chrono::TimeZone;

    #[test]
    fn test_price_range_floors_at_zero() {
        let (low, high) = price_range(&[150.0, 200.0], Some(RangeMode::ToZero));
        assert_eq!(low, 0.0);
        assert!((high - 220.0).abs() < 1e-9);
        assert_eq!(price_range(&[-5.0, -1.0], Some(RangeMode::ToZero)), (0.0, 1.0));
        assert_eq!(price_range(&[], Some(RangeMode::ToZero)), (0.0, 1.0));
    }

    #[test]
    fn test_price_range_without_floor_pads_data() {
        let (low, high) = price_range(&[100.0, 200.0], None);
        assert!((low - 90.0).abs() < 1e-9);
        assert!((high - 210.0).abs() < 1e-9);
        assert_eq!(price_range(&[], None), (0.0, 1.0));
    }

    #[test]
    fn test_time_range() {
        let now = Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
        let a = Utc.with_ymd_and_hms(2024, 5, 20, 9, 30, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2024, 5, 20, 16, 0, 0).unwrap();

        assert_eq!(time_range(&[b, a], now), (a, b));
        assert_eq!(time_range(&[a], now), (a, a + Duration::hours(1)));
        assert_eq!(time_range(&[], now), (now - Duration::days(1), now));
    }

    #[test]
    fn test_parse_css_color() {
        let color = parse_css_color("rgba(75, 192, 192, 1)").unwrap();
        assert_eq!((color.0, color.1, color.2), (75, 192, 192));
        assert_eq!(color.3, 1.0);

        let color = parse_css_color("rgb(10,20,30)").unwrap();
        assert_eq!((color.0, color.1, color.2, color.3), (10, 20, 30, 1.0));

        assert!(parse_css_color("#4bc0c0").is_none());
        assert!(parse_css_color("rgba(300, 0, 0, 1)").is_none());
    }

    #[test]
    fn test_resolve_series_rejects_unknown_timestamps() {
        let mut spec = build_chart(Default::default());
        spec.data[0].x = vec![Timestamp::Text("soon".to_string())];
        spec.data[0].y = vec![1.0];

        let err = render_png(&spec.data, &spec.layout, 320, 240).unwrap_err();
        assert!(matches!(err, PlotError::InvalidTimestamp(ref t) if t == "soon"));
    }

    #[test]
    fn test_resolve_series_pairs_in_order() {
        let mut spec = build_chart(Default::default());
        spec.data[0].x = vec![
            Timestamp::Millis(1_700_003_600_000),
            Timestamp::Text("2023-11-14 22:13:20".to_string()),
        ];
        spec.data[0].y = vec![151.0, 150.2];

        let series = resolve_series(&spec.data).unwrap();
        assert_eq!(series[0][0].0.timestamp(), 1_700_003_600);
        assert_eq!(series[0][1].0.timestamp(), 1_700_000_000);
        assert_eq!(series[0].iter().map(|(_, p)| *p).collect::<Vec<_>>(), vec![151.0, 150.2]);
    }

    fn small_series_chart() -> ChartSpec {
        let mut spec = build_chart(Default::default());
        spec.data[0].x = vec![
            Timestamp::Millis(1_700_000_000_000),
            Timestamp::Millis(1_700_003_600_000),
        ];
        spec.data[0].y = vec![150.2, 151.0];
        spec
    }

    fn is_png(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn test_render_png_small_series() {
        let spec = small_series_chart();
        let png = render_png(&spec.data, &spec.layout, 320, 240).unwrap();
        assert!(is_png(&png));
    }

    #[test]
    fn test_bare_chart_needs_no_font() {
        let spec = small_series_chart();
        let series = resolve_series(&spec.data).unwrap();
        let x_range = time_range(&[series[0][0].0, series[0][1].0], Utc::now());

        let png = with_temp_png(|path| {
            draw_bare(path, (320, 240), &spec.data, &series, x_range, (0.0, 200.0))
        })
        .unwrap();
        assert!(is_png(&png));
    }

    #[test]
    fn test_temp_png_removed_after_failed_draw() {
        let mut drawn_to = None;
        let result = with_temp_png(|path| {
            fs::write(path, b"partial").unwrap();
            drawn_to = Some(path.to_path_buf());
            Err(PlotError::Drawing("no canvas".to_string()))
        });

        assert!(matches!(result, Err(PlotError::Drawing(_))));
        let path = drawn_to.unwrap();
        assert!(!path.exists(), "{} left behind", path.display());
    }

    #[test]
    fn test_temp_png_removed_after_success() {
        let mut drawn_to = None;
        let bytes = with_temp_png(|path| {
            fs::write(path, b"image").unwrap();
            drawn_to = Some(path.to_path_buf());
            Ok(())
        })
        .unwrap();

        assert_eq!(bytes, b"image");
        assert!(!drawn_to.unwrap().exists());
    }

    #[test]
    fn test_font_errors_are_told_apart() {
        let font = drawing_error::<io::Error>(
            "Failed to build chart",
            DrawingAreaErrorKind::BackendError(DrawingErrorKind::FontError(Box::new(io::Error::new(io::ErrorKind::NotFound, "no sans-serif")))),
        );
        assert!(matches!(font, PlotError::Font(ref m) if m.contains("no sans-serif")));

        let other = drawing_error::<io::Error>("Failed to fill canvas", DrawingAreaErrorKind::LayoutError);
        assert!(matches!(other, PlotError::Drawing(_)));
    }
}
