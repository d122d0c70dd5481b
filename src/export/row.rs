//! The tabular projection shared by the file formats.

use cal_exporter_core::{Event, EventTime};

/// Spreadsheet column titles.
pub const HEADERS: [&str; 9] = [
    "Date",
    "Start Time",
    "End Time",
    "Duration (h)",
    "Duration",
    "Summary",
    "Description",
    "Location",
    "Hashtags",
];

/// Spreadsheet column widths, in characters.
pub const COLUMN_WIDTHS: [u32; 9] = [12, 10, 10, 12, 10, 40, 50, 30, 30];

pub const ALL_DAY: &str = "all-day";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_hours: f64,
    pub duration_formatted: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub hashtags: String,
}

impl Row {
    pub fn from_event(event: &Event) -> Self {
        let (start_time, end_time) = match (event.start, event.end) {
            (EventTime::Date(_), _) => (ALL_DAY.to_string(), String::new()),
            (start, end) => (clock(start), clock(end)),
        };

        Row {
            date: event.start.date().format("%Y-%m-%d").to_string(),
            start_time,
            end_time,
            duration_hours: round2(event.duration_hours()),
            duration_formatted: event.duration_formatted(),
            summary: event.title.clone(),
            description: event.description.clone(),
            location: event.location.clone().unwrap_or_default(),
            hashtags: event.hashtags().join(", "),
        }
    }

    pub fn cells(&self) -> [Cell; 9] {
        [
            Cell::Text(self.date.clone()),
            Cell::Text(self.start_time.clone()),
            Cell::Text(self.end_time.clone()),
            Cell::Number(self.duration_hours),
            Cell::Text(self.duration_formatted.clone()),
            Cell::Text(self.summary.clone()),
            Cell::Text(self.description.clone()),
            Cell::Text(self.location.clone()),
            Cell::Text(self.hashtags.clone()),
        ]
    }
}

fn clock(time: EventTime) -> String {
    match time {
        EventTime::DateTime(dt) => dt.format("%H:%M").to_string(),
        EventTime::Date(_) => String::new(),
    }
}

pub fn rows(events: &[Event]) -> Vec<Row> {
    events.iter().map(Row::from_event).collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of durations, rounded to two decimals.
pub fn total_hours(events: &[Event]) -> f64 {
    round2(events.iter().map(Event::duration_hours).sum())
}

/// The two summary lines under a spreadsheet table.
pub fn totals(events: &[Event]) -> [[Cell; 2]; 2] {
    [
        [
            Cell::Text("Total Events:".to_string()),
            Cell::Number(events.len() as f64),
        ],
        [
            Cell::Text("Total Hours:".to_string()),
            Cell::Number(total_hours(events)),
        ],
    ]
}

/// Hours as a plain decimal (`1.5`, `2.0`).
pub fn format_hours(value: f64) -> String {
    format!("{:?}", round2(value))
}

/// Cut `text` to at most `max` characters, ending in `...` when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}
