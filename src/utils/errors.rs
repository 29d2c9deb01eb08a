use thiserror::Error;
use crate::api::alphavantage::ApiError;
use crate::models::Interval;
use crate::services::chart_service::RenderError;
use crate::services::range_service::EmptyWindow;
use crate::services::series_service::NormalizeError;

/// Everything that can stop a chart from being produced for one request
#[derive(Debug, Clone, Error)]
pub enum ChartError {
    /// Provider answered, but without a time series block
    #[error("no time series returned for {symbol} ({interval})")]
    FetchFailure { symbol: String, interval: Interval },
    #[error("provider request failed: {0}")]
    Provider(#[from] ApiError),
    #[error("could not normalize time series: {0}")]
    Normalize(#[from] NormalizeError),
    #[error("empty after date filter: {0}")]
    EmptyAfterFilter(#[from] EmptyWindow),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl ChartError {
    /// Short, end-user safe description. Never includes provider payloads.
    pub fn user_message(&self) -> String {
        match self {
            ChartError::FetchFailure { symbol, .. } => {
                format!("No price data is available for {}.", symbol.to_uppercase())
            }
            ChartError::Provider(_) => {
                "The price provider could not be reached. Please try again.".to_string()
            }
            ChartError::Normalize(_) => {
                "The price provider returned data in an unexpected format.".to_string()
            }
            ChartError::EmptyAfterFilter(_) => {
                "No prices fall inside the selected date range.".to_string()
            }
            ChartError::Render(_) => "The chart could not be drawn.".to_string(),
        }
    }
}
