pub mod builder;
pub mod filter;
pub mod period;

pub use builder::ClassQuery;
pub use filter::{RawReportFilter, ReportFilter};
pub use period::{PeriodKey, PeriodSource};
