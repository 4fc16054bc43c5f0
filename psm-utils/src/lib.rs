//! Shared utility functions for PSM crates.

/// Date utility functions
pub mod dates {
    use chrono::{DateTime, Local, NaiveDate, SecondsFormat, TimeZone, Utc};

    /// Calendar date of a UTC instant as seen from `tz`.
    pub fn calendar_date_in<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
        instant.with_timezone(tz).date_naive()
    }

    /// True when both instants fall on the same calendar day in `tz`.
    pub fn same_day_in<Tz: TimeZone>(a: &DateTime<Utc>, b: &DateTime<Utc>, tz: &Tz) -> bool {
        calendar_date_in(a, tz) == calendar_date_in(b, tz)
    }

    /// Same year/month/day in the process's local time zone.
    ///
    /// Daily maxima roll over at local midnight, matching what an operator
    /// in the city sees on their wall clock.
    pub fn same_local_day(a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        same_day_in(a, b, &Local)
    }

    /// Storage form of a timestamp: RFC 3339, UTC, millisecond precision.
    pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
        instant.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Parse a timestamp written by [`format_timestamp`] (any RFC 3339 offset is accepted).
    pub fn parse_timestamp(s: &str) -> anyhow::Result<DateTime<Utc>> {
        Ok(DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
    }

    /// Human-readable local time, "YYYY-MM-DD HH:MM".
    pub fn display_local(instant: &DateTime<Utc>) -> String {
        instant
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M")
            .to_string()
    }

}
