//! Reporting sink for finished research runs.
//!
//! Takes the immutable record list a run hands over and derives everything
//! an operator looks at afterwards: numeric prices, a flat CSV export,
//! summary statistics, the data behind the visual summary panels, and
//! wholesale-to-retail profitability estimates.

pub mod error;
pub mod export;
pub mod price;
pub mod profit;
pub mod stats;

pub use error::ReportError;
pub use export::{export_csv, export_file_name, read_csv, write_csv, CsvRow};
pub use price::parse_price;
pub use profit::{estimate_profitability, Opportunity, Profitability, VIABLE_MARGIN_PCT};
pub use stats::{panel_data, summarize, PanelData, PriceStats, SummaryStats, TopProduct};
