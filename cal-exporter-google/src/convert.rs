//! Google API events into normalized events.

use anyhow::{Result, bail};
use cal_exporter_core::{Event, EventTime};
use chrono::{DateTime, NaiveDate, Offset, TimeZone, Utc};

/// The slice of a Google event this crate reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoogleEventFields {
    pub id: String,
    pub status: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: Option<GoogleTime>,
    pub end: Option<GoogleTime>,
}

/// Either `dateTime` or `date` is set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GoogleTime {
    pub date_time: Option<DateTime<Utc>>,
    pub date: Option<NaiveDate>,
}

impl From<google_calendar::types::Event> for GoogleEventFields {
    fn from(event: google_calendar::types::Event) -> Self {
        let time = |t: &google_calendar::types::EventDateTime| GoogleTime {
            date_time: t.date_time,
            date: t.date,
        };

        GoogleEventFields {
            start: event.start.as_ref().map(time),
            end: event.end.as_ref().map(time),
            id: event.id,
            status: event.status,
            summary: event.summary,
            description: event.description,
            location: event.location,
        }
    }
}

impl GoogleEventFields {
    pub fn is_cancelled(&self) -> bool {
        self.status == "cancelled"
    }

    /// Convert into `tz`. Timed values keep their instant; dates stay all-day.
    pub fn into_event<Tz: TimeZone>(self, tz: &Tz) -> Result<Event> {
        let start = to_event_time(self.start, tz, "start")?;
        let end = to_event_time(self.end, tz, "end")?;

        let title = if self.summary.trim().is_empty() {
            "No Title".to_string()
        } else {
            self.summary
        };
        let location = (!self.location.is_empty()).then_some(self.location);

        Ok(Event::new(
            self.id,
            title,
            self.description,
            start,
            end,
            location,
        )?)
    }
}

fn to_event_time<Tz: TimeZone>(time: Option<GoogleTime>, tz: &Tz, which: &str) -> Result<EventTime> {
    match time {
        Some(GoogleTime {
            date_time: Some(dt),
            ..
        }) => Ok(EventTime::DateTime(dt.with_timezone(tz).fixed_offset())),
        Some(GoogleTime { date: Some(d), .. }) => Ok(EventTime::Date(d)),
        _ => bail!("Event has no {which} time"),
    }
}

/// Drop cancelled entries, convert the rest, sort by start. Entries that fail
/// to convert are skipped.
pub fn to_events<Tz: TimeZone>(raw: Vec<GoogleEventFields>, tz: &Tz) -> Vec<Event> {
    let mut events: Vec<Event> = raw
        .into_iter()
        .filter(|e| !e.is_cancelled())
        .filter_map(|e| {
            let id = e.id.clone();
            e.into_event(tz)
                .map_err(|err| tracing::debug!(id = %id, "skipping Google event: {err:#}"))
                .ok()
        })
        .collect();

    let offset = tz.offset_from_utc_datetime(&Utc::now().naive_utc()).fix();
    events.sort_by_key(|e| e.start.instant(offset));
    events
}
