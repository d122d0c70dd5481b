//! Provider-neutral event types.
//!
//! Every provider (feed, local file, Google API) converts what it fetched into
//! these types before filtering. Timed values always carry an explicit offset;
//! all-day values carry a calendar date and nothing else.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset,
    TimeZone, Utc,
};
use serde::Serialize;
use std::fmt;

use crate::error::EventError;
use crate::hashtag::extract_hashtags;

/// A calendar event (provider-neutral)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    /// Opaque id, unique within one fetch
    pub id: String,
    pub title: String,
    /// Free text; the field hashtags are read from
    pub description: String,
    pub start: EventTime,
    /// Exclusive end. All-day events end on the day after their last day.
    pub end: EventTime,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EventTime {
    DateTime(DateTime<FixedOffset>),
    Date(NaiveDate),
}

impl EventTime {
    /// Resolve to an instant. Dates resolve to midnight at `offset`.
    pub fn instant(&self, offset: FixedOffset) -> DateTime<FixedOffset> {
        match self {
            EventTime::DateTime(dt) => *dt,
            EventTime::Date(d) => midnight_at(*d, offset),
        }
    }

    /// Calendar date this value falls on, in its own offset.
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::DateTime(dt) => dt.date_naive(),
            EventTime::Date(d) => *d,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, EventTime::Date(_))
    }

    fn offset(&self) -> Option<FixedOffset> {
        match self {
            EventTime::DateTime(dt) => Some(*dt.offset()),
            EventTime::Date(_) => None,
        }
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventTime::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Midnight of `date` at a fixed offset. Never ambiguous.
pub(crate) fn midnight_at(date: NaiveDate, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = date.and_time(NaiveTime::MIN);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

/// Place a wall-clock time in `tz`. Ambiguous times take the earlier
/// instant; times inside a DST gap move forward by the length of the gap.
pub(crate) fn resolve_wall_clock<Tz: TimeZone>(
    tz: &Tz,
    naive: NaiveDateTime,
) -> Option<DateTime<FixedOffset>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.fixed_offset()),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.fixed_offset()),
        LocalResult::None => {
            // Read the wall clock with the offset in force before the gap
            let before = tz
                .from_local_datetime(&(naive - Duration::hours(3)))
                .earliest()?
                .offset()
                .fix();
            let utc = naive - Duration::seconds(i64::from(before.local_minus_utc()));
            Some(tz.from_utc_datetime(&utc).fixed_offset())
        }
    }
}

impl Event {
    /// Build an event, checking `end >= start`.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        start: EventTime,
        end: EventTime,
        location: Option<String>,
    ) -> Result<Self, EventError> {
        let event = Event {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            start,
            end,
            location,
        };

        let (s, e) = event.interval_at(event.reference_offset());
        if e < s {
            return Err(EventError::EndBeforeStart(event.title));
        }

        Ok(event)
    }

    /// Offset used when an all-day value needs an instant and no other
    /// context is available: the offset of whichever bound is timed, else UTC.
    pub fn reference_offset(&self) -> FixedOffset {
        self.start
            .offset()
            .or_else(|| self.end.offset())
            .unwrap_or_else(|| Utc.fix())
    }

    /// `[start, end)` as instants, with all-day bounds resolved at `offset`.
    pub fn interval_at(&self, offset: FixedOffset) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        (self.start.instant(offset), self.end.instant(offset))
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_date()
    }

    pub fn duration(&self) -> Duration {
        let (start, end) = self.interval_at(self.reference_offset());
        end - start
    }

    pub fn duration_hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }

    /// Duration as `H:MM`
    pub fn duration_formatted(&self) -> String {
        let total_minutes = self.duration().num_minutes();
        format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
    }

    /// Hashtags found in the description, in order of appearance.
    pub fn hashtags(&self) -> Vec<String> {
        extract_hashtags(&self.description)
    }

    /// Text searched by hashtag expressions: title, then description.
    pub fn search_text(&self) -> String {
        format!("{}\n{}", self.title, self.description)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cet() -> FixedOffset {
        FixedOffset::east_opt(3600).unwrap()
    }

    fn at(h: u32, m: u32) -> EventTime {
        EventTime::DateTime(cet().with_ymd_and_hms(2026, 2, 1, h, m, 0).unwrap())
    }

    fn timed(start: EventTime, end: EventTime) -> Event {
        Event::new("uid-1", "Test Meeting", "A test meeting #billable #client", start, end, None)
            .unwrap()
    }

    #[test]
    fn duration_in_hours() {
        let event = timed(at(9, 0), at(10, 30));
        assert_eq!(event.duration_hours(), 1.5);
    }

    #[test]
    fn duration_formatted_with_minutes() {
        let event = timed(at(9, 0), at(10, 30));
        assert_eq!(event.duration_formatted(), "1:30");
    }

    #[test]
    fn duration_formatted_whole_hours() {
        let event = timed(at(9, 0), at(12, 0));
        assert_eq!(event.duration_formatted(), "3:00");
    }

    #[test]
    fn all_day_event_lasts_a_day() {
        let event = Event::new(
            "uid-2",
            "Holiday",
            "",
            EventTime::Date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
            EventTime::Date(NaiveDate::from_ymd_opt(2026, 2, 2).unwrap()),
            None,
        )
        .unwrap();

        assert!(event.is_all_day());
        assert_eq!(event.duration_hours(), 24.0);
        assert_eq!(event.duration_formatted(), "24:00");
    }

    #[test]
    fn zero_duration_is_allowed() {
        let event = timed(at(9, 0), at(9, 0));
        assert_eq!(event.duration(), Duration::zero());
    }

    #[test]
    fn end_before_start_is_rejected() {
        let result = Event::new("uid-3", "Backwards", "", at(10, 0), at(9, 0), None);
        assert_eq!(
            result,
            Err(EventError::EndBeforeStart("Backwards".to_string()))
        );
    }

    #[test]
    fn date_resolves_to_midnight_at_offset() {
        let date = EventTime::Date(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        let instant = date.instant(cet());
        assert_eq!(instant, cet().with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
        assert_eq!(instant.naive_utc().to_string(), "2026-01-31 23:00:00");
    }

    #[test]
    fn wall_clock_in_dst_gap_moves_by_gap_length() {
        // Amsterdam springs forward by an hour, Lord Howe by half an hour
        let amsterdam = NaiveDate::from_ymd_opt(2026, 3, 29)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = resolve_wall_clock(&chrono_tz::Europe::Amsterdam, amsterdam).unwrap();
        assert_eq!(resolved.to_rfc3339(), "2026-03-29T03:30:00+02:00");

        let lord_howe = NaiveDate::from_ymd_opt(2026, 10, 4)
            .unwrap()
            .and_hms_opt(2, 15, 0)
            .unwrap();
        let resolved = resolve_wall_clock(&chrono_tz::Australia::Lord_Howe, lord_howe).unwrap();
        assert_eq!(resolved.to_rfc3339(), "2026-10-04T02:45:00+11:00");
    }

    #[test]
    fn ambiguous_wall_clock_takes_earlier_instant() {
        let naive = NaiveDate::from_ymd_opt(2026, 10, 25)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let resolved = resolve_wall_clock(&chrono_tz::Europe::Amsterdam, naive).unwrap();
        assert_eq!(resolved.to_rfc3339(), "2026-10-25T02:30:00+02:00");
    }

    #[test]
    fn hashtags_come_from_description() {
        let event = timed(at(9, 0), at(10, 0));
        assert_eq!(event.hashtags(), vec!["#billable", "#client"]);
    }

    #[test]
    fn search_text_includes_title() {
        let event = timed(at(9, 0), at(10, 0));
        assert!(event.search_text().starts_with("Test Meeting\n"));
    }
}
