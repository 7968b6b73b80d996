use chrono::Utc;

use crate::{
    config, error, info, management::TokenManager, spotify::SpotifyClient, success,
    types::Token, warning,
};

pub async fn store_token(
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
) {
    let token = Token {
        access_token,
        refresh_token,
        scope: None,
        expires_at: expires_in.map(|secs| Utc::now().timestamp() + secs),
    };

    match TokenManager::new(token).persist().await {
        Ok(_) => success!(
            "Token stored at {}",
            TokenManager::token_path().display()
        ),
        Err(e) => error!("Failed to store token. Err: {}", e),
    }
}

/// Resolves an access token for a CLI command or exits.
///
/// The stored token wins over `SPOTIFY_ACCESS_TOKEN`. A refreshed token is
/// saved again so the next run can use it.
pub(crate) async fn access_token(client: &SpotifyClient) -> String {
    let mut manager = match TokenManager::load().await {
        Ok(manager) => manager,
        Err(_) => match config::spotify_access_token() {
            Some(access_token) => TokenManager::new(Token {
                access_token,
                refresh_token: None,
                scope: None,
                expires_at: None,
            }),
            None => error!(
                "No Spotify token found. Run `splyzer token --access-token <TOKEN>` or set SPOTIFY_ACCESS_TOKEN"
            ),
        },
    };

    let token = match manager.get_valid_token(client).await {
        Ok(token) => token,
        Err(e) => error!("Failed to get a valid token. Err: {}", e),
    };

    if manager.was_refreshed() {
        info!("Access token refreshed");
        if let Err(e) = manager.persist().await {
            warning!("Failed to store refreshed token. Err: {}", e);
        }
    }

    token
}
