use std::collections::HashSet;
use chrono::NaiveDate;
use plotters::prelude::*;
use thiserror::Error;
use crate::models::{ChartKind, ChartSeries, ChartSpec, Field, NormalizedTable};

/// Series drawn on the chart, in legend order
const PRICE_FIELDS: [Field; 4] = [Field::Open, Field::High, Field::Low, Field::Close];

/// Upper bound on the number of major x-axis labels, give or take rounding
const MAJOR_LABEL_TARGET: usize = 10;

/// Provider function name to a readable label.
/// "TIME_SERIES_WEEKLY" -> "Weekly"
pub fn interval_label(function_name: &str) -> String {
    let stripped = function_name.strip_prefix("TIME_SERIES_").unwrap_or(function_name);
    title_case(stripped)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_alpha = true;
        } else {
            out.push(c);
            prev_is_alpha = false;
        }
    }
    out
}

pub fn chart_title(symbol: &str, function_name: &str, start: NaiveDate, end: NaiveDate) -> String {
    format!(
        "{} {} Stock Prices ({} \u{2192} {})",
        symbol.to_uppercase(),
        interval_label(function_name),
        start.format("%Y-%m-%d"),
        end.format("%Y-%m-%d"),
    )
}

/// Every `stride`-th label from the start, stride = max(1, len / 10)
pub fn major_labels(labels: &[String]) -> Vec<String> {
    let stride = (labels.len() / MAJOR_LABEL_TARGET).max(1);
    labels.iter().step_by(stride).cloned().collect()
}

/// Project a filtered table into a chart specification
pub fn build(
    table: &NormalizedTable,
    symbol: &str,
    function_name: &str,
    start: NaiveDate,
    end: NaiveDate,
    kind: ChartKind,
) -> ChartSpec {
    let x_labels: Vec<String> = table
        .records
        .iter()
        .map(|r| r.date.format("%Y-%m-%d").to_string())
        .collect();

    let series = PRICE_FIELDS
        .iter()
        .filter(|field| table.has_column(field))
        .filter_map(|field| {
            let values: Vec<Option<f64>> = table.records.iter().map(|r| r.number(field)).collect();
            // Skip columns with nothing numeric to plot
            if values.iter().all(Option::is_none) {
                return None;
            }
            Some(ChartSeries {
                name: field.name().to_string(),
                values,
            })
        })
        .collect();

    ChartSpec {
        title: chart_title(symbol, function_name, start, end),
        kind,
        x_major_labels: major_labels(&x_labels),
        x_labels,
        series,
    }
}

#[derive(Debug, Clone, Error)]
pub enum RenderError {
    #[error("Failed to draw chart: {0}")]
    Draw(String),
}

/// Turns a chart specification into an SVG document
pub trait ChartRenderer: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> Result<String, RenderError>;
}

/// plotters-backed SVG renderer
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
}

impl SvgChartRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::new(1024, 768)
    }
}

/// Split a series into runs of consecutive numeric points so gaps are not bridged
fn contiguous_runs(values: &[Option<f64>]) -> Vec<Vec<(f64, f64)>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (idx, value) in values.iter().enumerate() {
        match value {
            Some(v) => current.push((idx as f64, *v)),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

impl ChartRenderer for SvgChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<String, RenderError> {
        let mut svg = String::new();

        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height)).into_drawing_area();
            root.fill(&WHITE).map_err(|e| RenderError::Draw(format!("Failed to fill canvas: {}", e)))?;

            // Find price range
            let (min_price, max_price) = spec.value_bounds().unwrap_or((0.0, 1.0));

            // Add some padding to the price range
            let padding = if max_price > min_price {
                (max_price - min_price) * 0.1
            } else {
                max_price.abs().max(1.0) * 0.1
            };
            let y_min = match spec.kind {
                ChartKind::Bar => 0.0,
                ChartKind::Line => (min_price - padding).max(0.0),
            };
            let y_max = max_price + padding;

            // One slot per row, centred on its index
            let count = spec.x_labels.len().max(1);
            let major_idx: HashSet<usize> = spec
                .x_labels
                .iter()
                .enumerate()
                .filter(|(_, label)| spec.x_major_labels.contains(label))
                .map(|(idx, _)| idx)
                .collect();

            let mut chart = ChartBuilder::on(&root)
                .caption(&spec.title, ("sans-serif", 28.0).into_font())
                .margin(15)
                .x_label_area_size(70)
                .y_label_area_size(60)
                .build_cartesian_2d(-0.5f64..(count as f64 - 0.5), y_min..y_max)
                .map_err(|e| RenderError::Draw(format!("Failed to build chart: {}", e)))?;

            // Ticks land on every index; only major ones get text
            let x_label_formatter = |x: &f64| {
                let idx = x.round();
                if idx < 0.0 || (x - idx).abs() > 1e-6 || !major_idx.contains(&(idx as usize)) {
                    return String::new();
                }
                spec.x_labels.get(idx as usize).cloned().unwrap_or_default()
            };

            chart
                .configure_mesh()
                .x_labels(count)
                .x_label_formatter(&x_label_formatter)
                .x_label_style(("sans-serif", 12.0).into_font())
                .y_desc("Price")
                .x_desc("Date")
                .draw()
                .map_err(|e| RenderError::Draw(format!("Failed to draw mesh: {}", e)))?;

            let series_count = spec.series.len().max(1) as f64;
            let group_width = 0.8;
            let bar_width = group_width / series_count;

            for (series_idx, series) in spec.series.iter().enumerate() {
                let color = Palette99::pick(series_idx).to_rgba();

                let anno = match spec.kind {
                    ChartKind::Line => {
                        // Draw circle at every point
                        chart
                            .draw_series(series.values.iter().enumerate().filter_map(|(idx, value)| {
                                value.map(|v| Circle::new((idx as f64, v), 3, color.filled()))
                            }))
                            .map_err(|e| RenderError::Draw(format!("Failed to draw point: {}", e)))?;

                        chart
                            .draw_series(
                                contiguous_runs(&series.values)
                                    .into_iter()
                                    .map(|run| PathElement::new(run, color.stroke_width(2))),
                            )
                            .map_err(|e| RenderError::Draw(format!("Failed to draw line: {}", e)))?
                    }
                    ChartKind::Bar => {
                        let offset = -group_width / 2.0 + bar_width * series_idx as f64;
                        chart
                            .draw_series(series.values.iter().enumerate().filter_map(|(idx, value)| {
                                let value = (*value)?;
                                let x0 = idx as f64 + offset;
                                Some(Rectangle::new([(x0, y_min), (x0 + bar_width, value)], color.filled()))
                            }))
                            .map_err(|e| RenderError::Draw(format!("Failed to draw bars: {}", e)))?
                    }
                };

                anno.label(series.name.as_str())
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
            }

            if !spec.series.is_empty() {
                chart
                    .configure_series_labels()
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .draw()
                    .map_err(|e| RenderError::Draw(format!("Failed to draw legend: {}", e)))?;
            }

            root.present().map_err(|e| RenderError::Draw(format!("Failed to render chart: {}", e)))?;
        }

        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FieldValue, NormalizedRecord};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn table_with(rows: usize, fields: &[Field]) -> NormalizedTable {
        let start = date("2024-01-01");
        let records = (0..rows)
            .map(|i| {
                let mut r = NormalizedRecord::new(start + chrono::Duration::days(i as i64));
                for f in fields {
                    r.fields.insert(f.clone(), FieldValue::Decimal(100.0 + i as f64));
                }
                r
            })
            .collect();
        NormalizedTable { columns: fields.to_vec(), records }
    }

    #[test]
    fn test_interval_label() {
        assert_eq!(interval_label("TIME_SERIES_MONTHLY"), "Monthly");
        assert_eq!(interval_label("TIME_SERIES_DAILY"), "Daily");
        assert_eq!(interval_label("TIME_SERIES_WEEKLY"), "Weekly");
        assert_eq!(interval_label("TIME_SERIES_DAILY_ADJUSTED"), "Daily_Adjusted");
    }

    #[test]
    fn test_title_format() {
        let title = chart_title("ibm", "TIME_SERIES_WEEKLY", date("2024-01-02"), date("2024-03-29"));
        assert_eq!(title, "IBM Weekly Stock Prices (2024-01-02 → 2024-03-29)");
    }

    #[test]
    fn test_x_labels_follow_table_order() {
        let t = table_with(3, &[Field::Close]);
        let spec = build(&t, "ibm", "TIME_SERIES_DAILY", date("2024-01-01"), date("2024-01-03"), ChartKind::Line);
        assert_eq!(spec.x_labels, vec!["2024-01-01", "2024-01-02", "2024-01-03"]);
    }

    #[test]
    fn test_major_labels_stride() {
        let labels: Vec<String> = (0..25).map(|i| format!("d{}", i)).collect();
        let majors = major_labels(&labels);
        // stride = 25 / 10 = 2
        assert_eq!(majors.len(), 13);
        assert_eq!(majors[0], "d0");
        assert_eq!(majors[1], "d2");
        assert_eq!(majors[12], "d24");
    }

    #[test]
    fn test_major_labels_small_and_empty() {
        let labels: Vec<String> = (0..7).map(|i| format!("d{}", i)).collect();
        assert_eq!(major_labels(&labels), labels);
        assert!(major_labels(&[]).is_empty());
    }

    #[test]
    fn test_major_labels_are_ordered_subsequence() {
        for n in [1usize, 9, 10, 11, 19, 20, 99, 100, 101, 253] {
            let labels: Vec<String> = (0..n).map(|i| format!("{:04}", i)).collect();
            let majors = major_labels(&labels);
            let stride = (n / 10).max(1);

            assert!(majors.len() <= (n + stride - 1) / stride);
            let mut it = labels.iter();
            assert!(majors.iter().all(|m| it.any(|l| l == m)));
        }
    }

    #[test]
    fn test_series_in_ohlc_order_and_volume_excluded() {
        let t = table_with(2, &[Field::Close, Field::Open, Field::Volume, Field::High, Field::Low]);
        let spec = build(&t, "ibm", "TIME_SERIES_DAILY", date("2024-01-01"), date("2024-01-02"), ChartKind::Bar);

        let names: Vec<&str> = spec.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["open", "high", "low", "close"]);
        assert_eq!(spec.kind, ChartKind::Bar);
        assert!(spec.series.iter().all(|s| s.values.len() == spec.x_labels.len()));
    }

    #[test]
    fn test_missing_column_is_omitted() {
        let t = table_with(2, &[Field::Close]);
        let spec = build(&t, "ibm", "TIME_SERIES_DAILY", date("2024-01-01"), date("2024-01-02"), ChartKind::Line);

        assert_eq!(spec.series.len(), 1);
        assert!(spec.series("open").is_none());
    }

    #[test]
    fn test_all_text_column_is_omitted_partial_kept_with_gaps() {
        let mut t = table_with(2, &[Field::Open, Field::Close]);
        for r in &mut t.records {
            r.fields.insert(Field::Open, FieldValue::Text("None".to_string()));
        }
        t.records[0].fields.insert(Field::Close, FieldValue::Text("-".to_string()));

        let spec = build(&t, "ibm", "TIME_SERIES_DAILY", date("2024-01-01"), date("2024-01-02"), ChartKind::Line);

        assert!(spec.series("open").is_none());
        assert_eq!(spec.series("close").unwrap().values, vec![None, Some(101.0)]);
        assert!(spec.series.iter().all(|s| s.values.iter().any(Option::is_some)));
    }

    #[test]
    fn test_contiguous_runs_split_on_gaps() {
        let runs = contiguous_runs(&[Some(1.0), Some(2.0), None, None, Some(3.0)]);
        assert_eq!(runs, vec![vec![(0.0, 1.0), (1.0, 2.0)], vec![(4.0, 3.0)]]);
        assert!(contiguous_runs(&[None, None]).is_empty());
    }

    fn spec_of(kind: ChartKind, rows: usize, series: &[(&str, Vec<Option<f64>>)]) -> ChartSpec {
        let x_labels: Vec<String> = (0..rows).map(|i| format!("2024-01-{:02}", i + 2)).collect();
        ChartSpec {
            title: "IBM Daily Stock Prices".to_string(),
            kind,
            x_major_labels: major_labels(&x_labels),
            x_labels,
            series: series
                .iter()
                .map(|(name, values)| ChartSeries { name: name.to_string(), values: values.clone() })
                .collect(),
        }
    }

    fn text_count(svg: &str, text: &str) -> usize {
        svg.matches(&format!(">{}</text>", text)).count()
    }

    #[test]
    fn test_render_line_chart() {
        let spec = spec_of(
            ChartKind::Line,
            3,
            &[("open", vec![Some(100.0), Some(101.0), Some(102.0)]), ("close", vec![Some(100.5), None, Some(103.0)])],
        );
        let svg = SvgChartRenderer::default().render(&spec).unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("IBM Daily Stock Prices"));
        // One legend entry per series
        assert_eq!(text_count(&svg, "open"), 1);
        assert_eq!(text_count(&svg, "close"), 1);
        assert!(svg.contains("2024-01-02"));
        // A marker per numeric value
        assert_eq!(svg.matches("<circle").count(), 5);
    }

    #[test]
    fn test_render_single_row_line_is_visible() {
        let spec = spec_of(ChartKind::Line, 1, &[("close", vec![Some(107.0)])]);
        let svg = SvgChartRenderer::default().render(&spec).unwrap();

        assert_eq!(svg.matches("<circle").count(), 1);
        assert_eq!(text_count(&svg, "close"), 1);
    }

    #[test]
    fn test_render_bar_chart_draws_one_rect_per_value() {
        let series = [
            ("open", vec![Some(10.0), Some(11.0), None]),
            ("close", vec![Some(10.5), Some(11.5), Some(12.0)]),
        ];
        let renderer = SvgChartRenderer::new(800, 600);
        let bar = renderer.render(&spec_of(ChartKind::Bar, 3, &series)).unwrap();
        let line = renderer.render(&spec_of(ChartKind::Line, 3, &series)).unwrap();

        assert!(bar.contains("IBM Daily Stock Prices"));
        assert_eq!(text_count(&bar, "open"), 1);
        assert_eq!(text_count(&bar, "close"), 1);
        assert!(!bar.contains("<circle"));
        // Background and legend boxes are common to both kinds
        assert_eq!(bar.matches("<rect").count() - line.matches("<rect").count(), 5);
    }

    #[test]
    fn test_render_only_major_labels() {
        let values: Vec<Option<f64>> = (0..25).map(|i| Some(100.0 + i as f64)).collect();
        let spec = spec_of(ChartKind::Line, 25, &[("close", values)]);
        let svg = SvgChartRenderer::default().render(&spec).unwrap();

        // stride 2: index 0 is major, index 1 is not
        assert!(svg.contains("2024-01-02"));
        assert!(!svg.contains("2024-01-03"));
    }
}
