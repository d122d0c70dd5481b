use cal_exporter_core::Event;
use serde::Serialize;

use super::RenderError;
use super::row::{round2, total_hours};

#[derive(Serialize)]
struct Document<'a> {
    events: Vec<JsonEvent<'a>>,
    summary: Summary,
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    summary: &'a str,
    start: String,
    end: String,
    duration_hours: f64,
    duration_formatted: String,
    description: &'a str,
    location: &'a str,
    hashtags: String,
}

#[derive(Serialize)]
struct Summary {
    total_events: usize,
    total_hours: f64,
}

impl<'a> From<&'a Event> for JsonEvent<'a> {
    fn from(event: &'a Event) -> Self {
        JsonEvent {
            summary: &event.title,
            start: event.start.to_string(),
            end: event.end.to_string(),
            duration_hours: round2(event.duration_hours()),
            duration_formatted: event.duration_formatted(),
            description: &event.description,
            location: event.location.as_deref().unwrap_or(""),
            hashtags: event.hashtags().join(", "),
        }
    }
}

pub fn render(events: &[Event]) -> Result<Vec<u8>, RenderError> {
    let document = Document {
        events: events.iter().map(JsonEvent::from).collect(),
        summary: Summary {
            total_events: events.len(),
            total_hours: total_hours(events),
        },
    };

    let mut bytes = serde_json::to_vec_pretty(&document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_events;
    use serde_json::Value;

    #[test]
    fn document_shape() {
        let value: Value = serde_json::from_slice(&render(&sample_events()).unwrap()).unwrap();

        assert_eq!(value["summary"]["total_events"], 2);
        assert_eq!(value["summary"]["total_hours"], 25.5);

        let first = &value["events"][0];
        assert_eq!(first["summary"], "Client call");
        assert_eq!(first["start"], "2026-02-01T09:00:00+01:00");
        assert_eq!(first["end"], "2026-02-01T10:30:00+01:00");
        assert_eq!(first["duration_hours"], 1.5);
        assert_eq!(first["duration_formatted"], "1:30");
        assert_eq!(first["location"], "Room 4");
        assert_eq!(first["hashtags"], "#billable, #clientA");

        let holiday = &value["events"][1];
        assert_eq!(holiday["start"], "2026-02-01");
        assert_eq!(holiday["location"], "");
    }

    #[test]
    fn non_ascii_is_kept_verbatim() {
        let mut events = sample_events();
        events[0].title = "Réunion 会議".to_string();
        let out = String::from_utf8(render(&events).unwrap()).unwrap();
        assert!(out.contains("Réunion 会議"));
    }

    #[test]
    fn empty_document() {
        let value: Value = serde_json::from_slice(&render(&[]).unwrap()).unwrap();
        assert_eq!(value["events"], Value::Array(vec![]));
        assert_eq!(value["summary"]["total_events"], 0);
    }
}
