use serde_json::{Map, Value};
use thiserror::Error;
use crate::models::Interval;

/// Raw series block: ISO date keys mapped to objects of prefixed field names
pub type RawSeries = Map<String, Value>;

/// Result of a single fetch. `series` is `None` when the provider answered
/// without a time series block (error, info or rate-limit payloads).
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub series: Option<RawSeries>,
    pub interval: Interval,
}

/// Strategy for locating the series block among the response's top-level keys
pub trait SeriesKeySelector: Send + Sync {
    fn select<'a>(&self, response: &'a Map<String, Value>) -> Option<&'a str>;
}

/// Picks the first top-level key containing a fixed, case-sensitive substring.
/// Tolerates "Time Series (Daily)" as well as "Weekly Time Series".
#[derive(Debug, Clone)]
pub struct ContainsSubstring(pub String);

impl Default for ContainsSubstring {
    fn default() -> Self {
        ContainsSubstring("Time Series".to_string())
    }
}

impl SeriesKeySelector for ContainsSubstring {
    fn select<'a>(&self, response: &'a Map<String, Value>) -> Option<&'a str> {
        response
            .keys()
            .find(|key| key.contains(self.0.as_str()))
            .map(String::as_str)
    }
}

/// Pull the series block out of a decoded response body.
/// Returns `None` if the body is not an object, no key matches, or the
/// matching value is not an object.
pub fn extract_series(response: Value, selector: &dyn SeriesKeySelector) -> Option<RawSeries> {
    let Value::Object(mut body) = response else {
        return None;
    };

    let key = selector.select(&body)?.to_string();
    match body.remove(&key) {
        Some(Value::Object(series)) => Some(series),
        _ => None,
    }
}

/// Comprehensive error type for provider calls
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Non-2xx HTTP status
    #[error("HTTP Error ({0}): {1}")]
    Http(u16, String),
    /// Network/request error, including timeouts
    #[error("Request Error: {0}")]
    Request(String),
    /// Body was not valid JSON
    #[error("Deserialization Error: {0}")]
    Deserialization(String),
}
