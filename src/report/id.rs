use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

static RE_REPORT_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^PERF-(\d+)$").unwrap());

/// Identifier of a performance report: `PERF-<classId>`.
///
/// The id carries the class key; [`ReportId::class_id`] is the only way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportId(i64);

impl ReportId {
    pub const PREFIX: &'static str = "PERF-";

    pub fn for_class(class_id: i64) -> Self {
        Self(class_id)
    }

    pub fn class_id(self) -> i64 {
        self.0
    }

    /// Parse `PERF-<digits>`. Surrounding whitespace is ignored; nothing else is.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        RE_REPORT_ID
            .captures(s)
            .and_then(|caps| caps[1].parse::<i64>().ok())
            .map(Self)
            .ok_or_else(|| Error::InvalidInput(format!("malformed report id: {s}")))
    }

    pub fn format(self) -> String {
        format!("{}{}", Self::PREFIX, self.0)
    }
}

impl std::fmt::Display for ReportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", Self::PREFIX, self.0)
    }
}

impl FromStr for ReportId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for ReportId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
