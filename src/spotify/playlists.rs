use futures::future::try_join_all;
use tracing::debug;

use crate::{
    error::SpotifyError,
    spotify::SpotifyClient,
    types::{Paging, Playlist, PlaylistData, PlaylistInfo, PlaylistItem, PlaylistSummary},
};

/// Maximum page size accepted by `/me/playlists`.
pub const MAX_PLAYLISTS_LIMIT: u32 = 50;

/// Retrieves a playlist together with all of its track items.
///
/// Fetches the playlist object, which embeds the first page of tracks, and
/// then follows the `next` links one page at a time until Spotify reports no
/// further pages. Pages are fetched sequentially because each request depends
/// on the previous page's `next` link.
///
/// # Arguments
///
/// * `client` - Spotify client used for the requests
/// * `token` - Valid access token for Spotify API authentication
/// * `playlist_id` - Spotify ID of the playlist
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(PlaylistData)` - Playlist metadata and every track item in order
/// - `Err(SpotifyError)` - Network error, API error, or authentication failure
///
/// # Track Items
///
/// Items whose `track` is `null` (deleted or region-restricted tracks) are
/// returned unchanged; they are filtered out later during normalization.
///
/// # Example
///
/// ```
/// let data = get_playlist(&client, token, "37i9dQZF1DXcBWIGoYBM5M").await?;
/// println!("{} has {} tracks", data.playlist.name, data.tracks.len());
/// ```
pub async fn get_playlist(
    client: &SpotifyClient,
    token: &str,
    playlist_id: &str,
) -> Result<PlaylistData, SpotifyError> {
    let url = client.endpoint(&format!("/playlists/{}", playlist_id));
    let playlist = client.get_json::<Playlist>(&url, token).await?;

    let mut tracks = playlist.tracks.items;
    let mut next = playlist.tracks.next;

    while let Some(next_url) = next {
        let page = client
            .get_json::<Paging<PlaylistItem>>(&next_url, token)
            .await?;
        tracks.extend(page.items);
        next = page.next;
    }

    debug!(playlist_id, tracks = tracks.len(), "Fetched playlist");

    Ok(PlaylistData {
        playlist: PlaylistInfo {
            id: playlist.id,
            name: playlist.name,
            description: playlist.description,
            owner: playlist.owner,
            followers: playlist.followers,
            images: playlist.images,
        },
        tracks,
    })
}

/// Retrieves several playlists concurrently.
///
/// Issues one request chain per playlist and waits for all of them. The
/// first failure aborts the remaining requests and is returned. Results keep
/// the order of `playlist_ids`.
pub async fn get_playlists(
    client: &SpotifyClient,
    token: &str,
    playlist_ids: &[String],
) -> Result<Vec<PlaylistData>, SpotifyError> {
    try_join_all(
        playlist_ids
            .iter()
            .map(|id| get_playlist(client, token, id)),
    )
    .await
}

/// Retrieves a page of the current user's playlists.
///
/// `limit` is clamped to the 1-50 range Spotify accepts.
pub async fn get_user_playlists(
    client: &SpotifyClient,
    token: &str,
    offset: u32,
    limit: u32,
) -> Result<Paging<PlaylistSummary>, SpotifyError> {
    let url = client.endpoint(&format!(
        "/me/playlists?offset={offset}&limit={limit}",
        offset = offset,
        limit = limit.clamp(1, MAX_PLAYLISTS_LIMIT)
    ));
    client.get_json(&url, token).await
}

/// Case-insensitive match against playlist name, description and owner.
///
/// An empty or blank query matches every playlist.
pub fn matches_query(playlist: &PlaylistSummary, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }

    let contains = |field: Option<&str>| field.is_some_and(|v| v.to_lowercase().contains(&query));

    contains(Some(playlist.name.as_str()))
        || contains(playlist.description.as_deref())
        || contains(playlist.owner_name())
}
