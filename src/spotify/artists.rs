use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::debug;

use crate::{
    analysis::GenreLookup,
    error::SpotifyError,
    spotify::SpotifyClient,
    types::{Artist, PlaylistData, SeveralArtistsResponse},
};

/// Maximum number of artist IDs accepted by `/artists`.
pub const ARTIST_BATCH_SIZE: usize = 50;

/// Retrieves full artist objects for up to 50 artist IDs.
///
/// # Arguments
///
/// * `client` - Spotify client used for the request
/// * `token` - Valid access token for Spotify API authentication
/// * `ids` - Artist IDs, at most [`ARTIST_BATCH_SIZE`]
///
/// # Returns
///
/// Returns the artists Spotify knows about. Unknown IDs come back as `null`
/// from the API and are skipped.
pub async fn get_several_artists(
    client: &SpotifyClient,
    token: &str,
    ids: &[String],
) -> Result<Vec<Artist>, SpotifyError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let url = client.endpoint(&format!("/artists?ids={}", ids.join(",")));
    let response = client.get_json::<SeveralArtistsResponse>(&url, token).await?;

    Ok(response.artists.into_iter().flatten().collect())
}

/// Collects the distinct artist IDs of all tracks, in first-seen order.
pub fn collect_artist_ids(playlists: &[PlaylistData]) -> Vec<String> {
    let mut seen = HashSet::new();
    playlists
        .iter()
        .flat_map(|p| p.tracks.iter())
        .filter_map(|item| item.track.as_ref())
        .flat_map(|t| t.artists.iter())
        .filter_map(|a| a.id.clone())
        .filter(|id| !id.is_empty() && seen.insert(id.clone()))
        .collect()
}

/// Resolves genre tags for every artist appearing in the playlists.
///
/// Artist IDs are deduplicated and split into batches of
/// [`ARTIST_BATCH_SIZE`]. Batches are requested concurrently; since the
/// results are merged into a lookup keyed by artist ID, batch order does not
/// matter.
pub async fn resolve_artist_genres(
    client: &SpotifyClient,
    token: &str,
    playlists: &[PlaylistData],
) -> Result<GenreLookup, SpotifyError> {
    let ids = collect_artist_ids(playlists);
    let batches = try_join_all(
        ids.chunks(ARTIST_BATCH_SIZE)
            .map(|chunk| get_several_artists(client, token, chunk)),
    )
    .await?;

    let lookup: GenreLookup = batches
        .into_iter()
        .flatten()
        .map(|artist| (artist.id, artist.genres))
        .collect();

    debug!(artists = ids.len(), resolved = lookup.len(), "Resolved artist genres");
    Ok(lookup)
}
