use serde::Deserialize;

use crate::error::{Error, Result};
use crate::query::builder::ClassQuery;
use crate::query::period::PeriodKey;

/// Report list filters exactly as they arrive from a caller (query string, CLI).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReportFilter {
    pub month: Option<String>,
    pub year: Option<String>,
    pub course_id: Option<String>,
    pub teacher_id: Option<String>,
}

/// Validated report list filters. Absent fields place no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub month: Option<u32>,
    pub year: Option<i32>,
    pub course_id: Option<i64>,
    pub teacher_id: Option<i64>,
}

impl ReportFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate raw filter values.
    ///
    /// Empty or whitespace-only values count as absent. Anything else must be
    /// an integer, and `month` must fall in 1..=12.
    pub fn from_raw(raw: &RawReportFilter) -> Result<Self> {
        let month = parse_field::<u32>("month", raw.month.as_deref())?;
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(Error::InvalidInput(format!(
                    "month must be between 1 and 12, got {m}"
                )));
            }
        }
        Ok(Self {
            month,
            year: parse_field("year", raw.year.as_deref())?,
            course_id: parse_field("course_id", raw.course_id.as_deref())?,
            teacher_id: parse_field("teacher_id", raw.teacher_id.as_deref())?,
        })
    }

    /// The class-level part of the filter, pushed down to the record store.
    pub fn class_query(&self) -> ClassQuery {
        let mut query = ClassQuery::new();
        if let Some(id) = self.course_id {
            query = query.course(id);
        }
        if let Some(id) = self.teacher_id {
            query = query.teacher(id);
        }
        query
    }

    /// The period part of the filter, checked after period derivation.
    pub fn matches_period(&self, period: PeriodKey) -> bool {
        self.month.map_or(true, |m| m == period.month)
            && self.year.map_or(true, |y| y == period.year)
    }
}

fn parse_field<T: std::str::FromStr>(name: &str, value: Option<&str>) -> Result<Option<T>> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(|_| {
            Error::InvalidInput(format!("{name} must be an integer, got '{v}'"))
        }),
    }
}
