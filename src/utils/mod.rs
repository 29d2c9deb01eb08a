pub mod errors;
pub mod html;

pub use errors::ChartError;
pub use html::escape_html;
