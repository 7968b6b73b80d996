use std::path::PathBuf;

use chrono::Utc;

use crate::{
    error::SpotifyError,
    spotify::{self, SpotifyClient},
    types::Token,
};

/// Tokens this close to their expiry are refreshed before use.
pub const EXPIRY_BUFFER_SECS: i64 = 5 * 60;

pub struct TokenManager {
    token: Token,
    refreshed: bool,
}

impl TokenManager {
    pub fn new(token: Token) -> Self {
        TokenManager {
            token,
            refreshed: false,
        }
    }

    pub async fn load() -> Result<Self, String> {
        let path = Self::token_path();
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self::new(token))
    }

    pub async fn persist(&self) -> Result<(), String> {
        let path = Self::token_path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(path, json).await.map_err(|e| e.to_string())
    }

    /// Returns an access token that is safe to use right now.
    ///
    /// Refreshing is an explicit step done here, before any data is fetched.
    /// A token without a known expiry is used as is.
    pub async fn get_valid_token(&mut self, client: &SpotifyClient) -> Result<String, SpotifyError> {
        if self.is_expired() {
            let Some(refresh_token) = self.token.refresh_token.clone() else {
                return Err(SpotifyError::SessionExpired);
            };

            self.token = spotify::auth::refresh_token(client, &refresh_token).await?;
            self.refreshed = true;
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        self.token
            .expires_at
            .is_some_and(|expires_at| now >= expires_at - EXPIRY_BUFFER_SECS)
    }

    /// Whether [`get_valid_token`](Self::get_valid_token) replaced the token.
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    pub fn token_path() -> PathBuf {
        let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("splyzer/cache/token.json");
        path
    }
}
