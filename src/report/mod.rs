pub mod baseline;
pub mod drilldown;
pub mod id;
pub mod planner;
pub mod rollup;

pub use baseline::{BaselineProvider, FlatBaseline, SyntheticBaseline};
pub use drilldown::resolve_report;
pub use id::ReportId;
pub use planner::{plan_reports, sort_reports};
pub use rollup::summarize;
