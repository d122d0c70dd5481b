//! Google Calendar provider for cal-exporter.
//!
//! Credentials are the OAuth client file downloaded from Google Cloud Console.
//! Tokens live in a [`TokenStore`] whose path the caller chooses.

mod auth;
mod convert;
mod credentials;
mod fetch;

pub use auth::SCOPES;
pub use convert::{GoogleEventFields, GoogleTime};
pub use credentials::{GoogleCredentials, StoredTokens, TokenStore};
pub use fetch::GoogleFetcher;
