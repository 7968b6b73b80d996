//! # Spotify Integration Module
//!
//! This module provides the interface to the Spotify Web API used by the
//! analyzer. It handles all HTTP communication with Spotify: reading playlists
//! and their tracks, resolving artist genres, reading the current user's
//! profile and playlists, and refreshing access tokens.
//!
//! ## Architecture
//!
//! ```text
//! Application Layer (HTTP API, CLI, Management)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (token refresh)
//!     ├── Playlist Operations (metadata, paginated tracks, user playlists)
//!     ├── Artist Operations (batched genre lookups)
//!     └── User Operations (profile)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! All requests go through a [`SpotifyClient`], which owns a single
//! connection-pooling [`reqwest::Client`] together with the API and token
//! endpoint URLs. Both URLs come from the configuration and can be overridden,
//! which is how the integration tests point the client at a local fake.
//!
//! ## Error Handling
//!
//! ### Rate Limiting and Transient Failures
//! - **429 Too Many Requests**: waits for `Retry-After` seconds (up to 120)
//!   and retries
//! - **502 Bad Gateway / 503 Service Unavailable**: retried with a short,
//!   growing delay
//! - At most [`MAX_ATTEMPTS`] attempts are made per request
//!
//! ### Upstream Errors
//! - **401 Unauthorized** becomes [`SpotifyError::Unauthorized`] so callers can
//!   ask the user to authenticate again
//! - Any other non-2xx status becomes [`SpotifyError::Status`] carrying the
//!   message from Spotify's error body where one is present
//!
//! ## Concurrency
//!
//! Playlists and artist batches are fetched concurrently by joining futures
//! in place. Nothing is spawned, so dropping the caller's future (for example
//! when an HTTP client disconnects) cancels every in-flight upstream request.
//!
//! ## API Coverage
//!
//! - `GET /me` - Current user's profile
//! - `GET /me/playlists` - Current user's playlists
//! - `GET /playlists/{id}` - Playlist metadata with the first page of tracks
//! - `GET /playlists/{id}/tracks` - Further track pages (via `next` links)
//! - `GET /artists?ids=...` - Up to 50 artists per request, for genre tags
//! - `POST /api/token` - Token refresh

pub mod artists;
pub mod auth;
pub mod playlists;
pub mod user;

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{config, error::SpotifyError};

/// Maximum number of attempts for a single request, including the first one.
pub const MAX_ATTEMPTS: u32 = 3;

/// Longest `Retry-After` delay the client is willing to wait for.
const MAX_RETRY_AFTER_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    api_url: String,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl SpotifyClient {
    pub fn new(api_url: impl Into<String>, token_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            client_id: None,
            client_secret: None,
        }
    }

    /// Builds a client from the environment configuration.
    pub fn from_env() -> Self {
        Self::new(config::spotify_apiurl(), config::spotify_apitoken_url())
            .with_credentials(config::spotify_client_id(), config::spotify_client_secret())
    }

    pub fn with_credentials(
        mut self,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        self.client_id = client_id;
        self.client_secret = client_secret;
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Issues an authenticated GET and decodes the JSON body.
    ///
    /// Retries rate-limited and transient gateway failures up to
    /// [`MAX_ATTEMPTS`] times; every other non-2xx status is returned as an
    /// error right away.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, SpotifyError> {
        let mut attempt = 0;

        loop {
            attempt += 1;
            debug!(url, attempt, "GET");
            let response = self.http.get(url).bearer_auth(token).send().await?;

            if response.status().is_success() {
                return Ok(response.json::<T>().await?);
            }

            if attempt < MAX_ATTEMPTS {
                if let Some(delay) = retry_delay(&response, attempt) {
                    warn!(
                        url,
                        status = response.status().as_u16(),
                        delay_secs = delay.as_secs(),
                        "Spotify request failed, retrying"
                    );
                    sleep(delay).await;
                    continue;
                }
            }

            return Err(error_from_response(response).await);
        }
    }
}

fn retry_delay(response: &Response, attempt: u32) -> Option<Duration> {
    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1);
            (retry_after <= MAX_RETRY_AFTER_SECS).then(|| Duration::from_secs(retry_after))
        }
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE => {
            Some(Duration::from_secs(attempt as u64))
        }
        _ => None,
    }
}

/// Converts a non-2xx response into a [`SpotifyError`].
pub(crate) async fn error_from_response(response: Response) -> SpotifyError {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return SpotifyError::Unauthorized;
    }

    let body = response.text().await.unwrap_or_default();
    let message = upstream_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    });

    SpotifyError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Extracts the human readable message from a Spotify error body.
///
/// The Web API answers `{"error": {"status": .., "message": ..}}` while the
/// accounts service answers `{"error": .., "error_description": ..}`.
fn upstream_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())
        .map(str::to_string)
}
