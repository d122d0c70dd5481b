//! Calendar sources: iCal feeds, local `.ics` files and Google Calendar.

mod feed;
mod local;

pub use feed::FeedFetcher;
pub use local::read_local;

use cal_exporter_core::{DateRange, Event, FetchError};
use cal_exporter_google::{GoogleFetcher, TokenStore};
use std::path::PathBuf;
use std::time::Duration;

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An iCal feed over HTTP(S)
    Feed { url: String },
    /// A `.ics` file on disk
    Local { path: PathBuf },
    /// A Google Calendar id (`primary`, `...@group.calendar.google.com`)
    Google { calendar_id: String },
}

/// Settings the providers need besides the source itself.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub credentials: PathBuf,
    pub tokens: TokenStore,
}

impl Source {
    /// Classify a `-c` value. URLs that look like iCal feeds are fetched
    /// directly; anything else is taken to be a Google calendar id.
    pub fn detect(descriptor: &str) -> Source {
        let descriptor = descriptor.trim();
        let lower = descriptor.to_ascii_lowercase();

        if lower.starts_with("webcal://") {
            return Source::Feed {
                url: format!("https://{}", &descriptor["webcal://".len()..]),
            };
        }

        let is_http = lower.starts_with("http://") || lower.starts_with("https://");
        if is_http && (lower.contains(".ics") || lower.contains("ical")) {
            return Source::Feed {
                url: descriptor.to_string(),
            };
        }

        Source::Google {
            calendar_id: descriptor.to_string(),
        }
    }

    /// Short label for log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Source::Feed { .. } => "iCal feed",
            Source::Local { .. } => "local file",
            Source::Google { .. } => "Google Calendar",
        }
    }

    /// Fetch every event the source has. `range` is a hint: Google only
    /// returns events inside it, the other sources return everything.
    pub async fn fetch(&self, options: &FetchOptions, range: &DateRange) -> Result<Vec<Event>, FetchError> {
        match self {
            Source::Feed { url } => FeedFetcher::new(options.timeout)?.fetch(url).await,
            Source::Local { path } => read_local(path),
            Source::Google { calendar_id } => {
                GoogleFetcher::new(&options.credentials, options.tokens.clone())
                    .fetch(calendar_id, range)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ics_url_is_a_feed() {
        assert_eq!(
            Source::detect("https://example.com/basic.ics"),
            Source::Feed {
                url: "https://example.com/basic.ics".to_string()
            }
        );
    }

    #[test]
    fn google_ical_url_is_a_feed() {
        let url = "https://calendar.google.com/calendar/ical/abc%40group.calendar.google.com/private-123/basic.ics";
        assert!(matches!(Source::detect(url), Source::Feed { .. }));
        assert!(matches!(
            Source::detect("HTTP://Example.com/ICAL/export"),
            Source::Feed { .. }
        ));
    }

    #[test]
    fn webcal_becomes_https() {
        assert_eq!(
            Source::detect("webcal://example.com/cal.ics"),
            Source::Feed {
                url: "https://example.com/cal.ics".to_string()
            }
        );
    }

    #[test]
    fn anything_else_is_a_google_calendar_id() {
        assert_eq!(
            Source::detect("primary"),
            Source::Google {
                calendar_id: "primary".to_string()
            }
        );
        assert!(matches!(
            Source::detect("team@group.calendar.google.com"),
            Source::Google { .. }
        ));
        assert!(matches!(
            Source::detect("https://example.com/calendar"),
            Source::Google { .. }
        ));
    }
}
