//! Data models for the charting pipeline
//!
//! These are request-scoped values passed between the fetch, normalize,
//! filter, build and render stages.

pub mod chart;
pub mod interval;
pub mod record;

// Re-export commonly used types for convenience
pub use chart::{ChartKind, ChartRequest, ChartSeries, ChartSpec, RenderedChart};
pub use interval::Interval;
pub use record::{Field, FieldValue, NormalizedRecord, NormalizedTable};
