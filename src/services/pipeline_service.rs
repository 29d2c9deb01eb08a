use std::future::Future;
use tracing::{debug, info, warn};
use crate::api::alphavantage::{AlphaVantageClient, ApiError, FetchOutcome};
use crate::models::{ChartRequest, Interval, RenderedChart};
use crate::services::chart_service::{self, ChartRenderer};
use crate::services::{range_service, series_service};
use crate::utils::ChartError;

/// Anything that can produce a raw series for a symbol and interval
pub trait SeriesSource: Send + Sync {
    fn fetch(&self, symbol: &str, interval: Interval) -> impl Future<Output = Result<FetchOutcome, ApiError>> + Send;
}

impl SeriesSource for AlphaVantageClient {
    fn fetch(&self, symbol: &str, interval: Interval) -> impl Future<Output = Result<FetchOutcome, ApiError>> + Send {
        self.fetch_series(symbol, interval)
    }
}

/// Fetch, normalize, filter, build and render one chart.
///
/// Stages run strictly in order; the first failure ends the run.
pub async fn run<S, R>(source: &S, renderer: &R, request: &ChartRequest) -> Result<RenderedChart, ChartError>
where
    S: SeriesSource,
    R: ChartRenderer,
{
    let outcome = source.fetch(&request.symbol, request.interval).await?;

    let Some(raw) = outcome.series else {
        warn!("No data returned for {} / {}", request.symbol, outcome.interval);
        return Err(ChartError::FetchFailure {
            symbol: request.symbol.clone(),
            interval: outcome.interval,
        });
    };
    debug!("Fetched {} raw rows for {}", raw.len(), request.symbol);

    let table = series_service::normalize(&raw)?;

    let filtered = range_service::filter(table, request.start, request.end).map_err(|e| {
        warn!("Table became empty after date filter for {}: {}", request.symbol, e);
        e
    })?;

    let spec = chart_service::build(
        &filtered.table,
        &request.symbol,
        outcome.interval.function_name(),
        filtered.effective_start,
        filtered.effective_end,
        request.kind,
    );

    let svg = renderer.render(&spec)?;
    info!(
        "✓ Rendered {} chart for {} ({} rows, {} series, {} bytes)",
        request.kind.as_param(),
        request.symbol,
        spec.x_labels.len(),
        spec.series.len(),
        svg.len()
    );

    Ok(RenderedChart { spec, svg })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::alphavantage::models::{extract_series, ContainsSubstring};
    use crate::models::{ChartKind, ChartSpec};
    use crate::services::chart_service::RenderError;
    use chrono::NaiveDate;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        body: Value,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn new(body: Value) -> Self {
            Self { body, calls: AtomicUsize::new(0) }
        }
    }

    impl SeriesSource for FakeSource {
        fn fetch(&self, _symbol: &str, interval: Interval) -> impl Future<Output = Result<FetchOutcome, ApiError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let series = extract_series(self.body.clone(), &ContainsSubstring::default());
            async move { Ok(FetchOutcome { series, interval }) }
        }
    }

    struct FailingSource;

    impl SeriesSource for FailingSource {
        fn fetch(&self, _symbol: &str, _interval: Interval) -> impl Future<Output = Result<FetchOutcome, ApiError>> + Send {
            async { Err(ApiError::Request("connection refused".to_string())) }
        }
    }

    struct StubRenderer;

    impl ChartRenderer for StubRenderer {
        fn render(&self, spec: &ChartSpec) -> Result<String, RenderError> {
            Ok(format!("<svg><title>{}</title></svg>", spec.title))
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn daily_body() -> Value {
        json!({
            "Meta Data": {"1. Information": "Daily Prices", "2. Symbol": "IBM"},
            "Time Series (Daily)": {
                "2024-01-02": {"1. open":"100.0","2. high":"105.0","3. low":"99.0","4. close":"104.0","5. volume":"1000"},
                "2024-01-03": {"1. open":"104.0","2. high":"108.0","3. low":"103.0","4. close":"107.0","5. volume":"1200"}
            }
        })
    }

    fn request(start: Option<&str>, end: Option<&str>) -> ChartRequest {
        ChartRequest {
            symbol: "ibm".to_string(),
            interval: Interval::Daily,
            kind: ChartKind::Line,
            start: start.map(date),
            end: end.map(date),
        }
    }

    #[tokio::test]
    async fn test_daily_scenario_with_start_bound() {
        let source = FakeSource::new(daily_body());
        let chart = run(&source, &StubRenderer, &request(Some("2024-01-03"), None)).await.unwrap();
        let spec = &chart.spec;

        assert_eq!(spec.x_labels, vec!["2024-01-03"]);
        assert_eq!(spec.x_major_labels, vec!["2024-01-03"]);
        assert_eq!(spec.series("open").unwrap().values, vec![Some(104.0)]);
        assert_eq!(spec.series("high").unwrap().values, vec![Some(108.0)]);
        assert_eq!(spec.series("low").unwrap().values, vec![Some(103.0)]);
        assert_eq!(spec.series("close").unwrap().values, vec![Some(107.0)]);
        assert_eq!(spec.series.len(), 4);
        assert!(spec.title.contains("Daily Stock Prices (2024-01-03 → 2024-01-03)"));
        assert!(spec.title.starts_with("IBM "));
        assert!(chart.svg.starts_with("<svg>"));
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_window_uses_data_extent() {
        let source = FakeSource::new(daily_body());
        let chart = run(&source, &StubRenderer, &request(None, None)).await.unwrap();

        assert_eq!(chart.spec.x_labels, vec!["2024-01-02", "2024-01-03"]);
        assert!(chart.spec.title.ends_with("(2024-01-02 → 2024-01-03)"));
    }

    #[tokio::test]
    async fn test_error_payload_is_fetch_failure() {
        let source = FakeSource::new(json!({
            "Error Message": "Invalid API call. Please retry or visit the documentation."
        }));
        let err = run(&source, &StubRenderer, &request(None, None)).await.unwrap_err();

        assert!(matches!(err, ChartError::FetchFailure { interval: Interval::Daily, .. }));
    }

    #[tokio::test]
    async fn test_window_outside_data_is_empty_after_filter() {
        let source = FakeSource::new(daily_body());

        let err = run(&source, &StubRenderer, &request(Some("2023-01-01"), Some("2023-12-31"))).await.unwrap_err();
        assert!(matches!(err, ChartError::EmptyAfterFilter(_)));

        let err = run(&source, &StubRenderer, &request(Some("2024-02-01"), None)).await.unwrap_err();
        assert!(matches!(err, ChartError::EmptyAfterFilter(_)));
    }

    #[tokio::test]
    async fn test_empty_series_block_is_empty_after_filter() {
        let source = FakeSource::new(json!({"Time Series (Daily)": {}}));
        let err = run(&source, &StubRenderer, &request(None, None)).await.unwrap_err();

        assert!(matches!(err, ChartError::EmptyAfterFilter(_)));
    }

    #[tokio::test]
    async fn test_bad_date_key_is_normalize_error() {
        let source = FakeSource::new(json!({
            "Time Series (Daily)": {"yesterday": {"4. close": "1.0"}}
        }));
        let err = run(&source, &StubRenderer, &request(None, None)).await.unwrap_err();

        assert!(matches!(err, ChartError::Normalize(_)));
    }

    #[tokio::test]
    async fn test_transport_error_is_provider_error() {
        let err = run(&FailingSource, &StubRenderer, &request(None, None)).await.unwrap_err();
        assert!(matches!(err, ChartError::Provider(ApiError::Request(_))));
    }

    #[tokio::test]
    async fn test_monthly_ohlc_only_bar_chart() {
        let source = FakeSource::new(json!({
            "Monthly Time Series": {
                "2024-01-31": {"1. open":"10","2. high":"12","3. low":"9","4. close":"11"},
                "2024-02-29": {"1. open":"11","2. high":"13","3. low":"10","4. close":"12.5"}
            }
        }));
        let req = ChartRequest {
            interval: Interval::Monthly,
            kind: ChartKind::Bar,
            ..request(None, None)
        };
        let chart = run(&source, &StubRenderer, &req).await.unwrap();

        assert_eq!(chart.spec.kind, ChartKind::Bar);
        assert!(chart.spec.title.contains("Monthly Stock Prices"));
        assert_eq!(chart.spec.series("close").unwrap().values, vec![Some(11.0), Some(12.5)]);
    }
}
