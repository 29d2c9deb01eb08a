pub mod chart_service;
pub mod pipeline_service;
pub mod range_service;
pub mod series_service;
pub mod symbol_service;

pub use chart_service::SvgChartRenderer;
pub use symbol_service::SymbolCatalog;
