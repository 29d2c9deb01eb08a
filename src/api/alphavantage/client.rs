use std::time::Duration;
use reqwest::Client as HttpClient;
use serde_json::Value;
use super::models::{extract_series, ApiError, ContainsSubstring, FetchOutcome, RawSeries, SeriesKeySelector};
use crate::models::Interval;
use tracing::{debug, warn};

/// Alpha Vantage API client for historical price series
pub struct AlphaVantageClient {
    http_client: HttpClient,
    api_key: String,
    base_url: String,
    selector: Box<dyn SeriesKeySelector>,
}

impl AlphaVantageClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.alphavantage.co/query";

    /// Create a new client against `base_url`
    pub fn with_base_url(api_key: String, base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            base_url,
            selector: Box::new(ContainsSubstring::default()),
        })
    }

    /// Replace the strategy used to find the series block in a response
    pub fn with_selector(mut self, selector: Box<dyn SeriesKeySelector>) -> Self {
        self.selector = selector;
        self
    }

    /// GET ?function=TIME_SERIES_*&symbol=...&apikey=...
    ///
    /// Sends exactly one request. A response without a series block is not an
    /// error: it yields `series: None` and the full body is logged.
    ///
    /// # Returns
    /// * `Ok(FetchOutcome)` - Raw series (if present) and the resolved interval
    /// * `Err(ApiError)` - Transport failure, non-2xx status or a non-JSON body
    pub async fn fetch_series(&self, symbol: &str, interval: Interval) -> Result<FetchOutcome, ApiError> {
        let function = interval.function_name();
        debug!("Requesting {} for {}", function, symbol);

        let response = self.http_client
            .get(&self.base_url)
            .query(&[("function", function), ("symbol", symbol), ("apikey", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ApiError::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            warn!("Provider returned {}: {}", status, body_text);
            return Err(ApiError::Http(status.as_u16(), body_text));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ApiError::Deserialization(format!("Failed to parse response: {}", e)))?;

        if let Value::Object(map) = &body {
            debug!("API response keys: {:?}", map.keys().collect::<Vec<_>>());
        }

        let series = self.series_from_body(symbol, function, body);
        Ok(FetchOutcome { series, interval })
    }

    /// Pick the series block out of a decoded body, logging the full body when there is none
    fn series_from_body(&self, symbol: &str, function: &str, body: Value) -> Option<RawSeries> {
        let series = extract_series(body.clone(), self.selector.as_ref());
        if series.is_none() {
            warn!("No time series found in response for {} ({}). Full response: {}", symbol, function, body);
        }
        series
    }
}
