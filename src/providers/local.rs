use cal_exporter_core::ics::parse_calendar;
use cal_exporter_core::{Event, FetchError};
use chrono::{Local, TimeZone};
use std::path::Path;

/// Read and parse a local `.ics` file in the local timezone.
pub fn read_local(path: &Path) -> Result<Vec<Event>, FetchError> {
    read_local_in(path, &Local)
}

pub fn read_local_in<Tz: TimeZone>(path: &Path, tz: &Tz) -> Result<Vec<Event>, FetchError> {
    if !path.exists() {
        return Err(FetchError::FileNotFound(path.to_path_buf()));
    }

    let is_ics = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ics"));
    if !is_ics {
        return Err(FetchError::NotIcs(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| FetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Read iCal file");

    parse_calendar(&contents, tz)
}
