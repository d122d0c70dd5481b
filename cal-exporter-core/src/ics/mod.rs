//! `.ics` parsing into normalized events.
//!
//! Shared by the feed and local-file providers.

mod parse;

pub use parse::parse_calendar;
