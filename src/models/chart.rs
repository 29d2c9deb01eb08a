//! Chart generation models

use chrono::NaiveDate;

/// Rendering mode of a chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

impl ChartKind {
    /// Anything other than "bar" renders as a line chart
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("bar") {
            ChartKind::Bar
        } else {
            ChartKind::Line
        }
    }

    pub fn as_param(&self) -> &'static str {
        match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
        }
    }
}

/// A named price series aligned with the chart's x labels
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub name: String,
    /// One entry per x label; `None` where the row has no numeric value
    pub values: Vec<Option<f64>>,
}

/// Everything the renderer needs to draw a chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x_labels: Vec<String>,
    pub x_major_labels: Vec<String>,
    pub series: Vec<ChartSeries>,
}

impl ChartSpec {
    #[cfg(test)]
    pub fn series(&self, name: &str) -> Option<&ChartSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    /// Smallest and largest plotted value across all series
    pub fn value_bounds(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .flat_map(|s| s.values.iter().flatten().copied())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

/// What the user asked for on one form submission
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    pub symbol: String,
    pub interval: super::Interval,
    pub kind: ChartKind,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Output of a successful pipeline run
#[derive(Debug, Clone)]
pub struct RenderedChart {
    pub spec: ChartSpec,
    pub svg: String,
}
