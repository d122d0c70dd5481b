//! ICS file parsing using the icalendar crate's parser.

use chrono::{Duration, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

use crate::error::FetchError;
use crate::event::{Event, EventTime, resolve_wall_clock};

const DEFAULT_TITLE: &str = "No Title";

/// Parse every VEVENT in `content`, expressing timed values in `tz`.
///
/// Events without a usable DTSTART are skipped. The result is sorted by start.
pub fn parse_calendar<Tz: TimeZone>(content: &str, tz: &Tz) -> Result<Vec<Event>, FetchError> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).map_err(|e| FetchError::Parse(e.to_string()))?;

    let mut vevents = Vec::new();
    for component in &calendar.components {
        collect_vevents(component, &mut vevents);
    }

    let mut events: Vec<Event> = vevents
        .into_iter()
        .enumerate()
        .filter_map(|(index, vevent)| parse_event(vevent, index, tz))
        .collect();

    // Stable: events sharing a start keep document order
    let reference = tz.offset_from_utc_datetime(&Utc::now().naive_utc()).fix();
    events.sort_by_key(|e| e.start.instant(reference));

    Ok(events)
}

fn collect_vevents<'a, 'c>(component: &'a Component<'c>, out: &mut Vec<&'a Component<'c>>) {
    if component.name == "VEVENT" {
        out.push(component);
        return;
    }
    for child in &component.components {
        collect_vevents(child, out);
    }
}

fn parse_event<Tz: TimeZone>(vevent: &Component<'_>, index: usize, tz: &Tz) -> Option<Event> {
    let uid = vevent
        .find_prop("UID")
        .map(|p| p.val.to_string())
        .unwrap_or_else(|| format!("event-{index}"));

    let Some(dtstart) = vevent.find_prop("DTSTART") else {
        tracing::debug!(uid = %uid, "skipping event without DTSTART");
        return None;
    };
    let start = match DatePerhapsTime::try_from(dtstart) {
        Ok(value) => to_event_time(value, tz)?,
        Err(e) => {
            tracing::debug!(uid = %uid, error = ?e, "skipping event with malformed DTSTART");
            return None;
        }
    };

    let end = match vevent.find_prop("DTEND") {
        Some(prop) => match DatePerhapsTime::try_from(prop) {
            Ok(value) => to_event_time(value, tz)?,
            Err(e) => {
                tracing::debug!(uid = %uid, error = ?e, "skipping event with malformed DTEND");
                return None;
            }
        },
        None => {
            let duration = vevent
                .find_prop("DURATION")
                .and_then(|p| parse_duration(p.val.as_ref()));
            default_end(start, duration)?
        }
    };
    let (start, end) = align_kinds(start, end, tz);

    let title = vevent
        .find_prop("SUMMARY")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let description = vevent
        .find_prop("DESCRIPTION")
        .map(|p| unescape_text(p.val.as_ref()))
        .unwrap_or_default();
    let location = vevent
        .find_prop("LOCATION")
        .map(|p| unescape_text(p.val.as_ref()))
        .filter(|s| !s.is_empty());

    match Event::new(uid, title, description, start, end, location) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("{e}, skipping");
            None
        }
    }
}

/// Convert icalendar's DatePerhapsTime into `tz`.
fn to_event_time<Tz: TimeZone>(dpt: DatePerhapsTime, tz: &Tz) -> Option<EventTime> {
    let instant = match dpt {
        DatePerhapsTime::Date(d) => return Some(EventTime::Date(d)),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(dt)) => dt.with_timezone(tz).fixed_offset(),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            resolve_wall_clock(tz, naive)?
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            match tzid.parse::<chrono_tz::Tz>() {
                Ok(zone) => resolve_wall_clock(&zone, date_time)?
                    .with_timezone(tz)
                    .fixed_offset(),
                Err(_) => {
                    tracing::debug!(tzid = %tzid, "unknown TZID, treating time as floating");
                    resolve_wall_clock(tz, date_time)?
                }
            }
        }
    };
    Some(EventTime::DateTime(instant))
}

fn default_end(start: EventTime, duration: Option<Duration>) -> Option<EventTime> {
    match start {
        EventTime::DateTime(dt) => Some(EventTime::DateTime(
            dt + duration.unwrap_or_else(|| Duration::hours(1)),
        )),
        EventTime::Date(d) => {
            let days = duration.map_or(1, |dur| dur.num_days().max(1));
            d.checked_add_signed(Duration::days(days)).map(EventTime::Date)
        }
    }
}

/// A date on one side and a timed value on the other: the date becomes
/// local midnight so both sides are comparable.
fn align_kinds<Tz: TimeZone>(start: EventTime, end: EventTime, tz: &Tz) -> (EventTime, EventTime) {
    let to_midnight = |d: NaiveDate| -> EventTime {
        match resolve_wall_clock(tz, d.and_time(NaiveTime::MIN)) {
            Some(dt) => EventTime::DateTime(dt),
            None => EventTime::Date(d),
        }
    };

    match (start, end) {
        (EventTime::Date(d), EventTime::DateTime(_)) => (to_midnight(d), end),
        (EventTime::DateTime(_), EventTime::Date(d)) => (start, to_midnight(d)),
        _ => (start, end),
    }
}

/// Parse an RFC 5545 DURATION (`PT1H30M`, `P1D`). Negative values are ignored.
fn parse_duration(value: &str) -> Option<Duration> {
    if value.starts_with('-') {
        return None;
    }
    let duration = iso8601::duration(value.trim_start_matches('+')).ok()?;
    let std_duration: std::time::Duration = duration.into();
    Duration::from_std(std_duration).ok()
}

/// Undo RFC 5545 TEXT escaping.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
