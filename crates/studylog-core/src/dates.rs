use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::{
    error::{StatsError, StatsResult},
    model::Granularity,
};

/// Fixed-width, zero-padded. Range filters compare these strings
/// lexicographically, so the format must not change.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Strict: rejects unpadded fields such as `2024-3-5`, which chrono would
/// otherwise accept but which break string ordering.
pub fn parse_iso(value: &str) -> StatsResult<NaiveDate> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, ISO_DATE_FORMAT)?;
    if format_iso(date) != value {
        return Err(StatsError::InvalidDate(format!("{value} is not YYYY-MM-DD")));
    }
    Ok(date)
}

pub fn format_iso(date: NaiveDate) -> String {
    date.format(ISO_DATE_FORMAT).to_string()
}

pub fn today(offset: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&offset).date_naive()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn ending_at(end: NaiveDate, granularity: Granularity) -> Self {
        Self::trailing(end, granularity.lookback_days() as u64)
    }

    pub fn trailing(end: NaiveDate, lookback_days: u64) -> Self {
        let start = end.checked_sub_days(Days::new(lookback_days)).unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    pub fn start_iso(&self) -> String {
        format_iso(self.start)
    }

    pub fn end_iso(&self) -> String {
        format_iso(self.end)
    }

    pub fn day(&self, index: u64) -> Option<NaiveDate> {
        self.start.checked_add_days(Days::new(index))
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(|day| *day <= self.end)
    }

    /// First instant of the start day through the last millisecond of the
    /// end day, both in `offset`.
    pub fn instant_bounds(&self, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
        let end_of_day =
            NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
        (
            local_instant(offset, self.start, NaiveTime::MIN),
            local_instant(offset, self.end, end_of_day),
        )
    }
}

fn local_instant(offset: FixedOffset, day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    offset
        .from_local_datetime(&day.and_time(time))
        .single()
        .map(|moment| moment.with_timezone(&Utc))
        .unwrap_or_else(|| day.and_time(time).and_utc())
}

/// Round half away from zero to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(value: &str) -> NaiveDate {
        parse_iso(value).expect("valid date")
    }

    #[test]
    fn week_window_spans_seven_days() {
        let window = DateWindow::ending_at(date("2024-03-10"), Granularity::Week);
        assert_eq!(window.start_iso(), "2024-03-04");
        assert_eq!(window.days().count(), 7);
    }

    #[test]
    fn month_window_crosses_month_boundary() {
        let window = DateWindow::ending_at(date("2024-03-10"), Granularity::Month);
        assert_eq!(window.start_iso(), "2024-02-11");
        assert_eq!(window.days().count(), 29);
    }

    #[test]
    fn iso_strings_sort_like_dates() {
        let earlier = format_iso(date("2024-09-30"));
        let later = format_iso(date("2024-10-01"));
        assert!(earlier < later);
        assert!(parse_iso("2024-9-30").is_err());
    }

    #[test]
    fn instant_bounds_follow_offset() {
        let window = DateWindow::ending_at(date("2024-03-10"), Granularity::Week);
        let offset = FixedOffset::east_opt(2 * 3600).expect("offset");
        let (from, to) = window.instant_bounds(offset);
        assert_eq!(from.to_rfc3339(), "2024-03-03T22:00:00+00:00");
        assert_eq!(to.to_rfc3339(), "2024-03-10T21:59:59.999+00:00");
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round1(7.0), 7.0);
        assert_eq!(round1(7.25), 7.3);
        assert_eq!(round1(52.0 / 7.0), 7.4);
        assert_eq!(round1(-0.25), -0.3);
        assert_eq!(average(&[]), 0.0);
    }
}
