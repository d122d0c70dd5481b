//! Date and hashtag filtering over normalized events.

use crate::date_range::DateRange;
use crate::event::{Event, EventTime};
use crate::hashtag::HashtagExpression;

/// A date range plus a hashtag expression.
#[derive(Debug, Clone)]
pub struct EventFilter {
    range: DateRange,
    hashtags: HashtagExpression,
}

impl EventFilter {
    pub fn new(range: DateRange, hashtags: HashtagExpression) -> Self {
        EventFilter { range, hashtags }
    }

    pub fn hashtags(&self) -> &HashtagExpression {
        &self.hashtags
    }

    /// Whether the event's interval intersects the range.
    ///
    /// All-day events are compared by local date. A date paired with a timed
    /// bound resolves at that bound's offset.
    pub fn in_range(&self, event: &Event) -> bool {
        match (event.start, event.end) {
            (EventTime::Date(first), EventTime::Date(end)) => self.range.overlaps_days(first, end),
            _ => {
                let (start, end) = event.interval_at(event.reference_offset());
                self.range.overlaps(start, end)
            }
        }
    }

    pub fn includes(&self, event: &Event) -> bool {
        self.in_range(event) && self.hashtags.matches_event(event)
    }

    /// Keep matching events, preserving input order.
    pub fn apply(&self, events: Vec<Event>) -> Vec<Event> {
        events.into_iter().filter(|e| self.includes(e)).collect()
    }

    /// Only the date half of the filter.
    pub fn apply_range(&self, events: Vec<Event>) -> Vec<Event> {
        events.into_iter().filter(|e| self.in_range(e)).collect()
    }

    /// Only the hashtag half of the filter.
    pub fn apply_hashtags(&self, events: Vec<Event>) -> Vec<Event> {
        events
            .into_iter()
            .filter(|e| self.hashtags.matches_event(e))
            .collect()
    }
}
