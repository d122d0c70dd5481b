//! Core types for cal-exporter.
//!
//! This crate holds everything between a calendar source and an output sink:
//! - `event`: the normalized `Event` every provider produces
//! - `date_range`: the `-d` expression parser
//! - `hashtag`: the `-s` expression compiler and evaluator
//! - `filter`: the pipeline that combines both over an event sequence
//! - `ics`: `.ics` parsing into normalized events
//! - `error`: the error taxonomy shared by providers and the CLI

pub mod date_range;
pub mod error;
pub mod event;
pub mod filter;
pub mod hashtag;
pub mod ics;

pub use date_range::DateRange;
pub use error::{DateParseError, EventError, FetchError, FilterSyntaxError};
pub use event::{Event, EventTime};
pub use filter::EventFilter;
pub use hashtag::{HashtagExpression, extract_hashtags};
