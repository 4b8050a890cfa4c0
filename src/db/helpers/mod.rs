use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn parse_datetime(value: &str, field: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .with_context(|| format!("failed to parse {field}"))
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .with_context(|| format!("failed to parse {field} '{value}'"))
}

pub fn parse_optional_date(value: Option<String>, field: &str) -> Result<Option<NaiveDate>> {
    match value {
        Some(raw) => parse_date(&raw, field).map(Some),
        None => Ok(None),
    }
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored category label back into its enum.
pub fn parse_category<T>(value: &str, field: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .with_context(|| format!("invalid {field} stored in database"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::Weather;

    #[test]
    fn dates_round_trip_through_text() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(format_date(date), "2026-03-09");
        assert_eq!(parse_date("2026-03-09", "entry_date").unwrap(), date);
        assert!(parse_date("09/03/2026", "entry_date").is_err());
        assert_eq!(parse_optional_date(None, "birth_date").unwrap(), None);
    }

    #[test]
    fn stored_categories_parse_or_fail_loudly() {
        let weather: Weather = parse_category("Cloudy", "weather").unwrap();
        assert_eq!(weather, Weather::Cloudy);
        assert!(parse_category::<Weather>("Foggy", "weather").is_err());
    }
}
