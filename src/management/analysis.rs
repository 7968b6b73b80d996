use tracing::{info, warn};

use crate::{
    analysis::{self, GenreLookup},
    error::SpotifyError,
    spotify::{self, SpotifyClient},
    types::{AnalysisOptions, AnalysisResult},
};

/// Fetches the playlists, resolves artist genres and aggregates the tracks.
///
/// Playlist failures abort the analysis. Genre lookups only enrich the
/// result, so a failed lookup is logged and the analysis continues without
/// genres, unless the failure means the token is no longer accepted.
pub async fn run_analysis(
    client: &SpotifyClient,
    token: &str,
    playlist_ids: &[String],
    options: &AnalysisOptions,
) -> Result<AnalysisResult, SpotifyError> {
    let playlists = spotify::playlists::get_playlists(client, token, playlist_ids).await?;

    let genres = if options.genres_enabled() {
        match spotify::artists::resolve_artist_genres(client, token, &playlists).await {
            Ok(genres) => genres,
            Err(e) if e.is_auth() => return Err(e),
            Err(e) => {
                warn!("Continuing without genres: {}", e);
                GenreLookup::new()
            }
        }
    } else {
        GenreLookup::new()
    };

    let result = analysis::aggregate_playlists(playlist_ids, &playlists, &genres, options);
    info!(
        playlists = playlist_ids.len(),
        tracks = result.statistics.total_tracks,
        "Analysis completed"
    );

    Ok(result)
}
