use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, de::Error};

/// Parses a calendar date or a full ISO-8601 timestamp.
///
/// Timestamps keep the calendar date as written in their own offset, so
/// `2026-03-02T00:00:00Z` and `2026-03-02T23:30:00+06:00` both land on March 2.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn date_or_timestamp<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| {
        D::Error::custom(format!(
            "invalid date {raw:?}, expected YYYY-MM-DD or an ISO-8601 timestamp"
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap()
    }

    #[test]
    fn accepts_plain_dates_and_timestamps() {
        assert_eq!(parse_date("2026-03-02"), Some(march(2)));
        assert_eq!(parse_date("2026-03-02T00:00:00Z"), Some(march(2)));
        assert_eq!(parse_date("2026-03-02T00:00:00.000Z"), Some(march(2)));
        assert_eq!(parse_date("2026-03-02T23:30:00+06:00"), Some(march(2)));
        assert_eq!(parse_date("2026-03-02T09:15:00"), Some(march(2)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date("02/03/2026"), None);
        assert_eq!(parse_date("2026-02-30"), None);
        assert_eq!(parse_date(""), None);
    }
}
