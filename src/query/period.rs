use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};

static RE_MONTH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());

/// The (month, year) bucket a class is reported under.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PeriodKey {
    pub year: i32,
    pub month: u32,
}

/// Which step of the fallback chain produced a period key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSource {
    FirstSession,
    ClassStart,
    Today,
}

impl PeriodKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::new(date.year(), date.month())
    }

    /// Derive the period for a class.
    ///
    /// Earliest session date first, then the class start date, then `today`.
    pub fn derive(
        session_dates: impl IntoIterator<Item = NaiveDate>,
        start_date: Option<NaiveDate>,
        today: NaiveDate,
    ) -> (Self, PeriodSource) {
        if let Some(first) = session_dates.into_iter().min() {
            return (Self::of(first), PeriodSource::FirstSession);
        }
        if let Some(start) = start_date {
            return (Self::of(start), PeriodSource::ClassStart);
        }
        (Self::of(today), PeriodSource::Today)
    }

    /// Parse a `YYYY-MM` key.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(caps) = RE_MONTH.captures(s) {
            let year: i32 = caps[1].parse().unwrap();
            let month: u32 = caps[2].parse().unwrap();
            if (1..=12).contains(&month) {
                return Ok(Self::new(year, month));
            }
        }
        Err(Error::InvalidInput(format!("unrecognized period: {s}")))
    }

    pub fn to_key(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

impl std::fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_key())
    }
}
