use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::{
    error::SpotifyError,
    spotify::{SpotifyClient, error_from_response},
    types::Token,
};

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Refreshes an expired access token using a refresh token.
///
/// Exchanges a refresh token for a new access token when the current token
/// has expired. This allows the application to keep using the Web API
/// without sending the user through the authorization flow again.
///
/// # Arguments
///
/// * `client` - Spotify client carrying the token URL and client credentials
/// * `refresh_token` - Refresh token obtained during the original authorization
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Token)` - New token with a fresh access token and expiry
/// - `Err(SpotifyError)` - Network failure or rejected refresh
///
/// # Token Response
///
/// The new token contains:
/// - Fresh access token for API requests
/// - The rotated refresh token if Spotify returned one, otherwise the old one
/// - Expiry computed from `expires_in` (one hour when missing)
///
/// # Client Authentication
///
/// With a client secret configured the request authenticates with HTTP basic
/// auth; otherwise only the client ID is sent in the form body, as public
/// (PKCE) clients do.
///
/// # Error Conditions
///
/// A `400` or `401` from the token endpoint means the refresh token is no
/// longer usable and is reported as [`SpotifyError::SessionExpired`].
pub async fn refresh_token(
    client: &SpotifyClient,
    refresh_token: &str,
) -> Result<Token, SpotifyError> {
    debug!("Refreshing access token");

    let mut form = vec![
        ("grant_type", "refresh_token".to_string()),
        ("refresh_token", refresh_token.to_string()),
    ];
    if let Some(client_id) = &client.client_id {
        form.push(("client_id", client_id.clone()));
    }

    let mut request = client.http.post(&client.token_url).form(&form);
    if let (Some(id), Some(secret)) = (&client.client_id, &client.client_secret) {
        request = request.basic_auth(id, Some(secret));
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        let err = error_from_response(response).await;
        warn!(status = status.as_u16(), "Token refresh failed: {}", err);
        return Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => SpotifyError::SessionExpired,
            _ => err,
        });
    }

    let json = response.json::<RefreshResponse>().await?;

    Ok(Token {
        access_token: json.access_token,
        refresh_token: json
            .refresh_token
            .or_else(|| Some(refresh_token.to_string())),
        scope: json.scope,
        expires_at: Some(Utc::now().timestamp() + json.expires_in.unwrap_or(3600)),
    })
}
