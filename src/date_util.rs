use chrono::NaiveDate;

/// Parse a stored date column.
///
/// Accepts a bare `YYYY-MM-DD` date as well as datetime text whose first ten
/// characters are the date (`2025-01-15T09:00:00Z`, `2025-01-15 09:00:00`).
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Today's date in the server's local timezone.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_date() {
        assert_eq!(
            parse_date("2025-03-09"),
            NaiveDate::from_ymd_opt(2025, 3, 9)
        );
    }

    #[test]
    fn test_parse_datetime_prefix() {
        assert_eq!(
            parse_date("2025-03-09T08:30:00Z"),
            NaiveDate::from_ymd_opt(2025, 3, 9)
        );
        assert_eq!(
            parse_date("2025-03-09 08:30:00"),
            NaiveDate::from_ymd_opt(2025, 3, 9)
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date("2025-13-01"), None);
    }
}
