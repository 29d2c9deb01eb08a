use axum::extract::State;
use axum::response::Html;
use axum::Form;
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use crate::models::{ChartKind, ChartRequest, Interval};
use crate::services::pipeline_service;
use super::page::{render_page, PageView};
use super::AppState;

/// Fields posted by the chart form. All optional; empty strings count as absent.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ChartForm {
    pub symbol: Option<String>,
    pub series: Option<String>,
    pub chart_type: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("Please select a symbol.")]
    MissingSymbol,
    #[error("Invalid {field} date '{value}'. Use YYYY-MM-DD.")]
    InvalidDate { field: &'static str, value: String },
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: &Option<String>) -> Result<Option<NaiveDate>, FormError> {
    non_empty(value)
        .map(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| FormError::InvalidDate {
                field,
                value: raw.to_string(),
            })
        })
        .transpose()
}

impl ChartForm {
    /// Validate the submission into a pipeline request.
    /// Interval and chart type never fail: unknown values fall back to daily / line.
    pub fn to_request(&self) -> Result<ChartRequest, FormError> {
        let symbol = non_empty(&self.symbol).ok_or(FormError::MissingSymbol)?;

        Ok(ChartRequest {
            symbol: symbol.to_string(),
            interval: non_empty(&self.series).map(Interval::from_param).unwrap_or_default(),
            kind: non_empty(&self.chart_type).map(ChartKind::from_param).unwrap_or_default(),
            start: parse_date("start", &self.start)?,
            end: parse_date("end", &self.end)?,
        })
    }

    /// Page state echoing the user's selections back into the form
    fn to_view(&self) -> PageView {
        PageView {
            symbol: non_empty(&self.symbol).map(str::to_string),
            interval: non_empty(&self.series).map(Interval::from_param).unwrap_or_default(),
            kind: non_empty(&self.chart_type).map(ChartKind::from_param).unwrap_or_default(),
            start: non_empty(&self.start).unwrap_or_default().to_string(),
            end: non_empty(&self.end).unwrap_or_default().to_string(),
            ..PageView::default()
        }
    }
}

/// GET /
pub async fn show(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.symbols, &PageView::default()))
}

/// POST /
pub async fn submit(State(state): State<AppState>, Form(form): Form<ChartForm>) -> Html<String> {
    info!(
        "📈 Form submitted: symbol={:?} series={:?} chart_type={:?} start={:?} end={:?}",
        form.symbol, form.series, form.chart_type, form.start, form.end
    );

    let mut view = form.to_view();

    let request = match form.to_request() {
        Ok(request) => request,
        Err(e) => {
            warn!("Rejected form submission: {}", e);
            view.notice = Some(e.to_string());
            return Html(render_page(&state.symbols, &view));
        }
    };

    if !state.symbols.contains(&request.symbol) {
        debug!("Symbol {} is not in the catalog, querying anyway", request.symbol);
    }

    match pipeline_service::run(state.client.as_ref(), state.renderer.as_ref(), &request).await {
        Ok(chart) => {
            debug!("Showing '{}' ({} rows)", chart.spec.title, chart.spec.x_labels.len());
            view.chart_svg = Some(chart.svg);
        }
        Err(e) => {
            warn!("No chart for {}: {}", request.symbol, e);
            view.notice = Some(e.user_message());
        }
    }

    Html(render_page(&state.symbols, &view))
}
