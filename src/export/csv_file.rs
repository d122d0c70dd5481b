use cal_exporter_core::Event;

use super::RenderError;
use super::row::{format_hours, rows};

const CSV_HEADER: [&str; 9] = [
    "date",
    "start_time",
    "end_time",
    "duration_hours",
    "duration_formatted",
    "summary",
    "description",
    "location",
    "hashtags",
];

pub fn render(events: &[Event]) -> Result<Vec<u8>, RenderError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for row in rows(events) {
        writer.write_record([
            row.date.as_str(),
            row.start_time.as_str(),
            row.end_time.as_str(),
            format_hours(row.duration_hours).as_str(),
            row.duration_formatted.as_str(),
            row.summary.as_str(),
            row.description.as_str(),
            row.location.as_str(),
            row.hashtags.as_str(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| RenderError::Io(e.into_error()))
}
