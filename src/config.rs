//! Environment-driven settings for splyzer.
//!
//! Every value is read from the process environment on each call. At startup
//! [`load_env`] may fill the environment from `<data_local_dir>/splyzer/.env`;
//! variables already exported always win over the file, and unset variables
//! fall back to the `DEFAULT_*` constants below where a default makes sense.

use std::{env, path::PathBuf};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:3000";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_API_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Returns the path of the `.env` file inside the local data directory.
///
/// - Linux: `~/.local/share/splyzer/.env`
/// - macOS: `~/Library/Application Support/splyzer/.env`
/// - Windows: `%LOCALAPPDATA%/splyzer/.env`
pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("splyzer/.env");
    path
}

/// Reads `<data_local_dir>/splyzer/.env` into the process environment.
///
/// The directory is created on first run so `build.rs` and users have a
/// place to drop the file. No file is fine: everything can come from the
/// environment or a default. Already exported variables are left untouched.
///
/// # Errors
///
/// Fails when the directory cannot be created or an existing `.env` cannot
/// be parsed.
///
/// ```
/// if let Err(e) = splyzer::config::load_env().await {
///     eprintln!("Cannot load environment: {}", e);
/// }
/// ```
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the address the HTTP server binds to.
///
/// Reads `SERVER_ADDRESS` and falls back to `127.0.0.1:3000`.
///
/// # Example
///
/// ```
/// let addr = server_addr(); // e.g., "127.0.0.1:3000"
/// ```
pub fn server_addr() -> String {
    env::var("SERVER_ADDRESS").unwrap_or_else(|_| DEFAULT_SERVER_ADDRESS.to_string())
}

/// Returns the Spotify API client ID.
///
/// Reads `SPOTIFY_API_AUTH_CLIENT_ID`, the id of the app registered in the
/// Spotify developer dashboard. Only token refreshes send it.
pub fn spotify_client_id() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_ID")
        .ok()
        .filter(|v| !v.is_empty())
}

/// Returns the Spotify API client secret.
///
/// Retrieves the `SPOTIFY_API_AUTH_CLIENT_SECRET` environment variable. When
/// present, token refresh requests authenticate with HTTP basic auth using
/// client ID and secret.
///
/// Never log this value.
pub fn spotify_client_secret() -> Option<String> {
    env::var("SPOTIFY_API_AUTH_CLIENT_SECRET")
        .ok()
        .filter(|v| !v.is_empty())
}

/// Returns the Spotify Web API base URL.
///
/// Reads `SPOTIFY_API_URL` and falls back to `https://api.spotify.com/v1`.
/// Overriding it is mostly useful to point the application at a local fake
/// of the API.
pub fn spotify_apiurl() -> String {
    env::var("SPOTIFY_API_URL").unwrap_or_else(|_| DEFAULT_SPOTIFY_API_URL.to_string())
}

/// Returns the Spotify OAuth token URL used for refreshing access tokens.
///
/// Reads `SPOTIFY_API_TOKEN_URL` and falls back to
/// `https://accounts.spotify.com/api/token`.
pub fn spotify_apitoken_url() -> String {
    env::var("SPOTIFY_API_TOKEN_URL")
        .unwrap_or_else(|_| DEFAULT_SPOTIFY_API_TOKEN_URL.to_string())
}

/// Returns an access token provided through `SPOTIFY_ACCESS_TOKEN`.
///
/// The CLI uses it when no token has been stored with `splyzer token`.
pub fn spotify_access_token() -> Option<String> {
    env::var("SPOTIFY_ACCESS_TOKEN")
        .ok()
        .filter(|v| !v.is_empty())
}
