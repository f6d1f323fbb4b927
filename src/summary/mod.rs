//! The monthly summary: totals, fixed versus variable entries, spending per
//! category against its budget and a daily series for charts.

mod aggregation;
mod handlers;

pub use aggregation::{CategoryStat, DailyTotals, Summary, summarize};
pub use handlers::{get_summary_endpoint, load_summary};
