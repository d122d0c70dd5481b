//! Date range for filtering events.
//!
//! Accepted `-d` expressions:
//! - `today`
//! - `YYYY-MM-DD`
//! - `YYYY-MM-DD:YYYY-MM-DD` (both days included)
//! - `YYYY-MM-DDThh:mm:YYYY-MM-DDThh:mm` (exact instants)
//!
//! The `:` range separator collides with the `:` inside `hh:mm`. Every `T`
//! introduces exactly one time colon, so the separator is the first colon
//! with a balanced colon/`T` count on both sides.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::fmt;

use crate::error::DateParseError;
use crate::event::resolve_wall_clock;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Half-open interval `[from, to)` with `from < to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
}

/// One side of a range expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bound {
    Day(NaiveDate),
    Instant(NaiveDateTime),
}

impl DateRange {
    /// Returns `None` unless `from < to`.
    pub fn new(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> Option<Self> {
        (from < to).then_some(DateRange { from, to })
    }

    /// Parse a `-d` expression against the local timezone and the current time.
    pub fn parse(expr: &str) -> Result<Self, DateParseError> {
        Self::parse_at(expr, &Local::now())
    }

    /// Parse a `-d` expression. `now` supplies both the timezone days are
    /// resolved in and the date `today` refers to.
    pub fn parse_at<Tz: TimeZone>(expr: &str, now: &DateTime<Tz>) -> Result<Self, DateParseError> {
        let trimmed = expr.trim();
        let tz = now.timezone();

        if trimmed.eq_ignore_ascii_case("today") {
            let today = now.date_naive();
            let from = day_start(&tz, today, expr, trimmed)?;
            let to = day_start(&tz, next_day(today, expr, trimmed)?, expr, trimmed)?;
            return checked(expr, from, to);
        }

        if let Some((left, right)) = split_range(trimmed) {
            let from = match parse_bound(expr, left)? {
                Bound::Day(d) => day_start(&tz, d, expr, left)?,
                Bound::Instant(dt) => resolve_local(&tz, dt, expr, left)?,
            };
            let to = match parse_bound(expr, right)? {
                Bound::Day(d) => day_start(&tz, next_day(d, expr, right)?, expr, right)?,
                Bound::Instant(dt) => resolve_local(&tz, dt, expr, right)?,
            };
            return checked(expr, from, to);
        }

        let day = NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
            DateParseError::new(
                expr,
                trimmed,
                "expected 'today', YYYY-MM-DD, YYYY-MM-DD:YYYY-MM-DD or YYYY-MM-DDThh:mm:YYYY-MM-DDThh:mm",
            )
        })?;
        let from = day_start(&tz, day, expr, trimmed)?;
        let to = day_start(&tz, next_day(day, expr, trimmed)?, expr, trimmed)?;
        checked(expr, from, to)
    }

    pub fn from(&self) -> DateTime<FixedOffset> {
        self.from
    }

    pub fn to(&self) -> DateTime<FixedOffset> {
        self.to
    }

    /// `from <= instant < to`
    pub fn contains(&self, instant: DateTime<FixedOffset>) -> bool {
        self.from <= instant && instant < self.to
    }

    /// Whether `[start, end)` intersects this range. A zero-length interval
    /// intersects iff its single point lies inside the range.
    pub fn overlaps(&self, start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> bool {
        if start == end {
            return self.contains(start);
        }
        start < self.to && end > self.from
    }

    /// Whether the all-day span `[first, end)` intersects this range.
    ///
    /// Days have no offset of their own, so they are compared on the wall
    /// clock the range was parsed in. Each bound carries the offset in force
    /// at that bound, which keeps ranges across a DST change exact.
    pub fn overlaps_days(&self, first: NaiveDate, end: NaiveDate) -> bool {
        let start = first.and_time(NaiveTime::MIN);
        let end = end.and_time(NaiveTime::MIN);
        let (from, to) = (self.from.naive_local(), self.to.naive_local());

        if start == end {
            return from <= start && start < to;
        }
        start < to && end > from
    }

    /// Get `from` as an RFC3339 string.
    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    /// Get `to` as an RFC3339 string.
    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.from, self.to)
    }
}

fn checked(
    expr: &str,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
) -> Result<DateRange, DateParseError> {
    DateRange::new(from, to)
        .ok_or_else(|| DateParseError::new(expr, expr.trim(), "range end must be after its start"))
}

/// Find the `:` that separates two date-or-datetime tokens.
fn split_range(s: &str) -> Option<(&str, &str)> {
    let t_count = s.matches('T').count();
    if s.matches(':').count() != t_count + 1 {
        return None;
    }

    let balanced = |side: &str| side.matches(':').count() == side.matches('T').count();

    s.match_indices(':')
        .map(|(idx, _)| (&s[..idx], &s[idx + 1..]))
        .find(|(left, right)| balanced(left) && balanced(right))
}

fn parse_bound(expr: &str, token: &str) -> Result<Bound, DateParseError> {
    let parsed = if token.contains('T') {
        NaiveDateTime::parse_from_str(token, DATETIME_FORMAT)
            .ok()
            .map(Bound::Instant)
    } else {
        NaiveDate::parse_from_str(token, DATE_FORMAT).ok().map(Bound::Day)
    };

    parsed.ok_or_else(|| DateParseError::new(expr, token, "expected YYYY-MM-DD or YYYY-MM-DDThh:mm"))
}

fn next_day(day: NaiveDate, expr: &str, token: &str) -> Result<NaiveDate, DateParseError> {
    day.succ_opt()
        .ok_or_else(|| DateParseError::new(expr, token, "date out of range"))
}

fn day_start<Tz: TimeZone>(
    tz: &Tz,
    day: NaiveDate,
    expr: &str,
    token: &str,
) -> Result<DateTime<FixedOffset>, DateParseError> {
    resolve_local(tz, day.and_time(NaiveTime::MIN), expr, token)
}

fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
    expr: &str,
    token: &str,
) -> Result<DateTime<FixedOffset>, DateParseError> {
    resolve_wall_clock(tz, naive)
        .ok_or_else(|| DateParseError::new(expr, token, "nonexistent local time"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn cet_at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        cet().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn now() -> DateTime<FixedOffset> {
        cet_at(2026, 2, 10, 15, 30)
    }

    #[test]
    fn today_spans_the_current_local_day() {
        let range = DateRange::parse_at("today", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 10, 0, 0));
        assert_eq!(range.to(), cet_at(2026, 2, 11, 0, 0));
    }

    #[test]
    fn today_is_case_insensitive_and_trimmed() {
        let range = DateRange::parse_at("  Today ", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 10, 0, 0));
    }

    #[test]
    fn today_in_local_zone_is_one_day() {
        let range = DateRange::parse("today").unwrap();
        let local_today = Local::now().date_naive();
        assert_eq!(range.from().date_naive(), local_today);
        assert!(range.from() < range.to());
    }

    #[test]
    fn single_date_is_one_calendar_day() {
        let range = DateRange::parse_at("2026-02-01", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 1, 0, 0));
        assert_eq!(range.to(), cet_at(2026, 2, 2, 0, 0));
        assert_eq!(range.to() - range.from(), Duration::hours(24));
    }

    #[test]
    fn date_range_includes_last_day() {
        let range = DateRange::parse_at("2026-02-01:2026-02-28", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 1, 0, 0));
        assert_eq!(range.to(), cet_at(2026, 3, 1, 0, 0));
    }

    #[test]
    fn same_day_range_is_not_zero_width() {
        let range = DateRange::parse_at("2026-02-01:2026-02-01", &now()).unwrap();
        assert_eq!(range.to() - range.from(), Duration::hours(24));
    }

    #[test]
    fn datetime_range_is_exact() {
        let range = DateRange::parse_at("2026-02-01T09:00:2026-02-01T17:00", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 1, 9, 0));
        assert_eq!(range.to(), cet_at(2026, 2, 1, 17, 0));
        assert_eq!(range.to() - range.from(), Duration::hours(8));
    }

    #[test]
    fn separator_is_not_a_time_colon() {
        assert_eq!(
            split_range("2026-02-01T09:00:2026-02-01T17:00"),
            Some(("2026-02-01T09:00", "2026-02-01T17:00"))
        );
        assert_eq!(
            split_range("2026-02-01:2026-02-28"),
            Some(("2026-02-01", "2026-02-28"))
        );
        assert_eq!(split_range("2026-02-01"), None);
        assert_eq!(split_range("2026-02-01T09:00"), None);
    }

    #[test]
    fn mixed_date_and_datetime_range() {
        let range = DateRange::parse_at("2026-02-01T09:00:2026-02-02", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 1, 9, 0));
        assert_eq!(range.to(), cet_at(2026, 2, 3, 0, 0));

        let range = DateRange::parse_at("2026-02-01:2026-02-02T12:00", &now()).unwrap();
        assert_eq!(range.from(), cet_at(2026, 2, 1, 0, 0));
        assert_eq!(range.to(), cet_at(2026, 2, 2, 12, 0));
    }

    #[test]
    fn garbage_names_the_whole_input() {
        let err = DateRange::parse_at("not-a-date", &now()).unwrap_err();
        assert_eq!(err.offending, "not-a-date");
        assert_eq!(err.input, "not-a-date");
    }

    #[test]
    fn bad_range_side_is_named() {
        let err = DateRange::parse_at("2026-02-01:2026-13-01", &now()).unwrap_err();
        assert_eq!(err.offending, "2026-13-01");

        let err = DateRange::parse_at("2026-02-01T25:00:2026-02-02T10:00", &now()).unwrap_err();
        assert_eq!(err.offending, "2026-02-01T25:00");
    }

    #[test]
    fn single_datetime_is_rejected() {
        let err = DateRange::parse_at("2026-02-01T09:00", &now()).unwrap_err();
        assert_eq!(err.offending, "2026-02-01T09:00");
    }

    #[test]
    fn reversed_range_is_rejected() {
        assert!(DateRange::parse_at("2026-02-10:2026-02-01", &now()).is_err());
        assert!(DateRange::parse_at("2026-02-01T10:00:2026-02-01T10:00", &now()).is_err());
    }

    #[test]
    fn dst_transition_day_is_23_hours() {
        let amsterdam = chrono_tz::Europe::Amsterdam
            .with_ymd_and_hms(2026, 3, 29, 12, 0, 0)
            .unwrap();
        let range = DateRange::parse_at("2026-03-29", &amsterdam).unwrap();
        assert_eq!(range.to() - range.from(), Duration::hours(23));
        assert_eq!(range.from().offset().local_minus_utc(), 3600);
        assert_eq!(range.to().offset().local_minus_utc(), 7200);
    }

    #[test]
    fn time_inside_dst_gap_moves_forward() {
        let amsterdam = chrono_tz::Europe::Amsterdam
            .with_ymd_and_hms(2026, 3, 29, 12, 0, 0)
            .unwrap();
        let range = DateRange::parse_at("2026-03-29T02:30:2026-03-29T04:00", &amsterdam).unwrap();
        assert_eq!(range.from().naive_local().to_string(), "2026-03-29 03:30:00");
        assert_eq!(range.to() - range.from(), Duration::minutes(30));
    }

    #[test]
    fn half_hour_dst_gap_moves_by_half_an_hour() {
        let lord_howe = chrono_tz::Australia::Lord_Howe
            .with_ymd_and_hms(2026, 10, 1, 12, 0, 0)
            .unwrap();
        let range = DateRange::parse_at("2026-10-04T02:15:2026-10-04T04:00", &lord_howe).unwrap();
        assert_eq!(range.from().naive_local().to_string(), "2026-10-04 02:45:00");
        assert_eq!(range.to() - range.from(), Duration::minutes(75));
    }

    #[test]
    fn day_overlap_uses_local_dates_across_dst_end() {
        let amsterdam = chrono_tz::Europe::Amsterdam
            .with_ymd_and_hms(2026, 10, 20, 12, 0, 0)
            .unwrap();
        let range = DateRange::parse_at("2026-10-25:2026-10-26", &amsterdam).unwrap();
        let day = |d| NaiveDate::from_ymd_opt(2026, 10, d).unwrap();

        assert!(range.overlaps_days(day(25), day(26)));
        assert!(range.overlaps_days(day(26), day(27)));
        assert!(range.overlaps_days(day(24), day(26)));
        assert!(!range.overlaps_days(day(27), day(28)));
        assert!(!range.overlaps_days(day(24), day(25)));
    }

    #[test]
    fn overlap_is_half_open() {
        let range = DateRange::parse_at("2026-02-02", &now()).unwrap();
        assert!(range.overlaps(cet_at(2026, 2, 1, 23, 0), cet_at(2026, 2, 2, 1, 0)));
        assert!(!range.overlaps(cet_at(2026, 2, 1, 22, 0), cet_at(2026, 2, 2, 0, 0)));
        assert!(!range.overlaps(cet_at(2026, 2, 3, 0, 0), cet_at(2026, 2, 3, 1, 0)));
    }

    #[test]
    fn zero_length_overlap_uses_containment() {
        let range = DateRange::parse_at("2026-02-02", &now()).unwrap();
        let midnight = cet_at(2026, 2, 2, 0, 0);
        let next_midnight = cet_at(2026, 2, 3, 0, 0);
        assert!(range.overlaps(midnight, midnight));
        assert!(!range.overlaps(next_midnight, next_midnight));
    }

    #[test]
    fn proptest_datetime_range_round_trip() {
        proptest!(|(
            year in 1970i32..2100,
            month in 1u32..=12,
            day in 1u32..=28,
            hour in 0u32..24,
            minute in 0u32..60,
            span in 1i64..200_000,
        )| {
            let start = NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(hour, minute, 0)
                .unwrap();
            let end = start + Duration::minutes(span);
            let expr = format!(
                "{}:{}",
                start.format(DATETIME_FORMAT),
                end.format(DATETIME_FORMAT)
            );

            let range = DateRange::parse_at(&expr, &now());
            prop_assert!(range.is_ok(), "failed to parse {}", expr);
            let range = range.unwrap();
            prop_assert_eq!(range.from().naive_local(), start);
            prop_assert_eq!(range.to().naive_local(), end);
        });
    }
}
