//! Installed-app OAuth flow and token refresh.

use anyhow::{Context, Result};
use chrono::Utc;
use google_calendar::Client;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

use crate::credentials::{GoogleCredentials, StoredTokens, TokenStore};

pub const SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.readonly"];

const REDIRECT_PORT: u16 = 8085;

pub fn redirect_uri() -> String {
    format!("http://localhost:{}/callback", REDIRECT_PORT)
}

fn redirect_address() -> String {
    format!("127.0.0.1:{}", REDIRECT_PORT)
}

/// API client for already-valid tokens.
pub fn client(creds: &GoogleCredentials, tokens: &StoredTokens) -> Client {
    Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        redirect_uri(),
        tokens.access_token.clone(),
        tokens.refresh_token.clone(),
    )
}

/// Load tokens from `store`, refreshing or re-authorizing as needed. Whatever
/// ends up valid is written back.
pub async fn valid_tokens(creds: &GoogleCredentials, store: &TokenStore) -> Result<StoredTokens> {
    let tokens = match store.load()? {
        Some(tokens) if !tokens.needs_refresh(Utc::now()) => return Ok(tokens),
        Some(tokens) => {
            tracing::debug!("Access token expired, refreshing");
            match refresh(creds, &tokens).await {
                Ok(refreshed) => refreshed,
                Err(e) => {
                    tracing::warn!("Token refresh failed ({e:#}), re-authorizing");
                    authorize(creds).await?
                }
            }
        }
        None => authorize(creds).await?,
    };

    store.save(&tokens)?;
    Ok(tokens)
}

pub async fn refresh(creds: &GoogleCredentials, tokens: &StoredTokens) -> Result<StoredTokens> {
    let access_token = client(creds, tokens)
        .refresh_access_token()
        .await
        .context("Failed to refresh token")?;

    let mut refreshed = StoredTokens::from_access_token(&access_token);

    // Google typically doesn't return a new refresh_token on refresh
    if refreshed.refresh_token.is_empty() {
        refreshed.refresh_token = tokens.refresh_token.clone();
    }

    Ok(refreshed)
}

/// Run the browser consent flow and exchange the code for tokens.
pub async fn authorize(creds: &GoogleCredentials) -> Result<StoredTokens> {
    let scopes: Vec<String> = SCOPES.iter().map(|s| s.to_string()).collect();

    let mut client = Client::new(
        creds.client_id.clone(),
        creds.client_secret.clone(),
        redirect_uri(),
        String::new(),
        String::new(),
    );

    let auth_url = client.user_consent_url(&scopes);

    tracing::info!("Open this URL in your browser to authorize access:\n\n{auth_url}\n");

    if open::that(&auth_url).is_err() {
        tracing::info!("Could not open browser automatically, please copy the URL above");
    }

    let (code, state) = wait_for_callback().await?;

    tracing::debug!("Received authorization code, exchanging for tokens");

    let access_token = client
        .get_access_token(&code, &state)
        .await
        .context("Failed to exchange authorization code")?;

    tracing::info!("Authorization successful");

    Ok(StoredTokens::from_access_token(&access_token))
}

async fn wait_for_callback() -> Result<(String, String)> {
    let listener = TcpListener::bind(redirect_address())
        .await
        .context("Failed to bind OAuth callback listener")?;

    let (stream, _) = listener
        .accept()
        .await
        .context("Failed to accept OAuth callback")?;

    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader
        .read_line(&mut request_line)
        .await
        .context("Failed to read OAuth callback request line")?;

    let (code, state) = parse_callback(&request_line)?;

    let response = "HTTP/1.1 200 OK\r\n\
        Content-Type: text/html\r\n\
        Connection: close\r\n\
        \r\n\
        <html><body>\
        <h1>Authorization complete</h1>\
        <p>You can close this window and return to the terminal.</p>\
        </body></html>";

    let mut stream = reader.into_inner();
    stream
        .write_all(response.as_bytes())
        .await
        .context("Failed to write OAuth callback response")?;
    stream.flush().await?;

    Ok((code, state))
}

/// Pull `code` and `state` out of `GET /callback?code=..&state=.. HTTP/1.1`.
fn parse_callback(request_line: &str) -> Result<(String, String)> {
    let url_part = request_line
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("Invalid HTTP request"))?;

    let url = url::Url::parse(&format!("http://localhost{}", url_part))?;

    let param = |name: &str| {
        url.query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.to_string())
    };

    if let Some(error) = param("error") {
        anyhow::bail!("Authorization was denied: {error}");
    }

    let code = param("code").ok_or_else(|| anyhow::anyhow!("No code in callback"))?;
    let state = param("state").unwrap_or_default();

    Ok((code, state))
}
