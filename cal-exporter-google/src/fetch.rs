//! Listing events from one Google calendar.

use anyhow::{Context, Result};
use cal_exporter_core::{DateRange, Event, FetchError};
use chrono::Local;
use google_calendar::Client;
use google_calendar::types::OrderBy;
use std::path::PathBuf;

use crate::auth;
use crate::convert::{GoogleEventFields, to_events};
use crate::credentials::{GoogleCredentials, TokenStore};

/// Fetches events for a calendar id, bounded by a date range.
#[derive(Debug, Clone)]
pub struct GoogleFetcher {
    credentials_path: PathBuf,
    tokens: TokenStore,
}

impl GoogleFetcher {
    pub fn new(credentials_path: impl Into<PathBuf>, tokens: TokenStore) -> Self {
        GoogleFetcher {
            credentials_path: credentials_path.into(),
            tokens,
        }
    }

    pub async fn fetch(&self, calendar_id: &str, range: &DateRange) -> Result<Vec<Event>, FetchError> {
        let creds = GoogleCredentials::load(&self.credentials_path)?;

        let tokens = auth::valid_tokens(&creds, &self.tokens)
            .await
            .map_err(|e| FetchError::Auth {
                message: format!("could not obtain a Google access token for '{calendar_id}'"),
                source: e.into(),
            })?;

        let client = auth::client(&creds, &tokens);
        let raw = list_events(&client, calendar_id, range)
            .await
            .map_err(|e| FetchError::Network {
                url: format!("https://www.googleapis.com/calendar/v3/calendars/{calendar_id}/events"),
                source: e.into(),
            })?;

        tracing::debug!(count = raw.len(), "Google returned events");

        Ok(to_events(raw, &Local))
    }
}

async fn list_events(
    client: &Client,
    calendar_id: &str,
    range: &DateRange,
) -> Result<Vec<GoogleEventFields>> {
    let time_min = range.from_rfc3339();
    let time_max = range.to_rfc3339();

    let response = client
        .events()
        .list_all(
            calendar_id,
            "",
            0,
            OrderBy::default(),
            &[],
            "", // search query
            &[],
            false,
            false,
            true, // expand recurring events into instances
            &time_max,
            &time_min,
            "",
            "",
        )
        .await
        .context("Failed to fetch events")?;

    Ok(response.body.into_iter().map(GoogleEventFields::from).collect())
}
