use crate::{error::SpotifyError, spotify::SpotifyClient, types::UserProfile};

/// Retrieves the profile of the user owning the access token.
///
/// Also serves as the cheapest way to check whether a token is still
/// accepted by Spotify.
pub async fn get_current_user(
    client: &SpotifyClient,
    token: &str,
) -> Result<UserProfile, SpotifyError> {
    client.get_json(&client.endpoint("/me"), token).await
}
