//! OAuth client credentials and the on-disk token store.

use anyhow::{Context, Result};
use cal_exporter_core::FetchError;
use chrono::{DateTime, Duration, Utc};
use google_calendar::AccessToken;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tokens expiring within this window are refreshed before use.
const REFRESH_MARGIN_SECS: i64 = 60;

/// Google OAuth client credentials (user-provided).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoogleCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Accepted credentials file shapes: the JSON Google Cloud Console hands out
/// for installed and web clients, or just the two fields.
#[derive(Deserialize)]
#[serde(untagged)]
enum CredentialsFile {
    Installed { installed: GoogleCredentials },
    Web { web: GoogleCredentials },
    Flat(GoogleCredentials),
}

impl GoogleCredentials {
    pub fn load(path: &Path) -> Result<Self, FetchError> {
        if !path.exists() {
            return Err(FetchError::Credentials(format!(
                "Google credentials not found at {}.\n\n\
                Download an OAuth client (Desktop app) from\n\
                https://console.cloud.google.com/apis/credentials and save it there,\n\
                or pass its location with --credentials.",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            FetchError::Credentials(format!("Failed to read {}: {e}", path.display()))
        })?;

        Self::from_json(&contents).map_err(|e| {
            FetchError::Credentials(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    pub fn from_json(contents: &str) -> serde_json::Result<Self> {
        let file: CredentialsFile = serde_json::from_str(contents)?;
        Ok(match file {
            CredentialsFile::Installed { installed } => installed,
            CredentialsFile::Web { web } => web,
            CredentialsFile::Flat(creds) => creds,
        })
    }
}

/// Tokens persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredTokens {
    pub fn from_access_token(token: &AccessToken) -> Self {
        let expires_at = (token.expires_in > 0)
            .then(|| Utc::now() + Duration::seconds(token.expires_in));

        StoredTokens {
            access_token: token.access_token.clone(),
            refresh_token: token.refresh_token.clone(),
            expires_at,
        }
    }

    /// Expired, or expiring within the refresh margin. Tokens without a known
    /// expiry are assumed valid.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|at| at - now <= Duration::seconds(REFRESH_MARGIN_SECS))
    }
}

/// Token file location, passed in explicitly by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TokenStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no token file exists yet.
    pub fn load(&self) -> Result<Option<StoredTokens>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read tokens from {}", self.path.display()))?;

        let tokens: StoredTokens = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse tokens from {}", self.path.display()))?;

        Ok(Some(tokens))
    }

    pub fn save(&self, tokens: &StoredTokens) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write tokens to {}", self.path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }
}
