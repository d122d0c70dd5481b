use cal_exporter_core::ics::parse_calendar;
use cal_exporter_core::{Event, FetchError};
use chrono::Local;
use std::time::Duration;

/// Downloads and parses iCal feeds.
pub struct FeedFetcher {
    client: reqwest::Client,
}

impl FeedFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cal-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                source: Box::new(e),
            })?;

        Ok(FeedFetcher { client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<Event>, FetchError> {
        let network = |e: reqwest::Error| FetchError::Network {
            url: url.to_string(),
            source: Box::new(e),
        };

        let body = self
            .client
            .get(url)
            .send()
            .await
            .map_err(network)?
            .error_for_status()
            .map_err(network)?
            .text()
            .await
            .map_err(network)?;

        tracing::debug!(url, bytes = body.len(), "Downloaded iCal feed");

        parse_calendar(&body, &Local)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const FEED: &str = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:TEST\r\nBEGIN:VEVENT\r\nUID:b\r\nSUMMARY:Second\r\nDTSTART:20260201T120000Z\r\nEND:VEVENT\r\nBEGIN:VEVENT\r\nUID:a\r\nSUMMARY:First\r\nDESCRIPTION:#billable\r\nDTSTART:20260201T090000Z\r\nDTEND:20260201T100000Z\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";

    #[tokio::test]
    async fn fetches_and_parses_feed() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/basic.ics")
            .with_status(200)
            .with_header("content-type", "text/calendar")
            .with_body(FEED)
            .create_async()
            .await;

        let url = format!("{}/basic.ics", server.url());
        let events = FeedFetcher::new(Duration::from_secs(5))
            .unwrap()
            .fetch(&url)
            .await
            .unwrap();

        mock.assert_async().await;
        let titles: Vec<&str> = events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(events[0].hashtags(), vec!["#billable"]);
    }

    #[tokio::test]
    async fn http_error_is_a_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.ics")
            .with_status(404)
            .create_async()
            .await;

        let url = format!("{}/missing.ics", server.url());
        let err = FeedFetcher::new(Duration::from_secs(5))
            .unwrap()
            .fetch(&url)
            .await
            .unwrap_err();

        match err {
            FetchError::Network { url: failed, .. } => assert_eq!(failed, url),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_a_parse_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken.ics")
            .with_status(200)
            .with_body("<html>not a calendar</html>")
            .create_async()
            .await;

        let url = format!("{}/broken.ics", server.url());
        let result = FeedFetcher::new(Duration::from_secs(5))
            .unwrap()
            .fetch(&url)
            .await;

        // Either rejected outright or yields nothing usable
        match result {
            Err(FetchError::Parse(_)) => {}
            Ok(events) => assert!(events.is_empty()),
            Err(other) => panic!("unexpected error {other:?}"),
        }
    }
}
