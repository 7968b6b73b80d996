//! # Playlist Analysis
//!
//! Pure aggregation over tracks that have already been fetched from Spotify.
//! Nothing in here performs I/O, so every function can be exercised directly
//! from tests with hand-built [`Track`] values.
//!
//! The flow is always the same:
//!
//! 1. [`normalize_tracks`] flattens the playlists, drops `null` track entries
//!    (deleted or region-restricted tracks) and attaches artist genre tags
//!    from the lookup table built by the fetcher.
//! 2. [`aggregate`] runs the individual statistics from [`stats`] and
//!    [`popularity`] and assembles an [`AnalysisResult`].
//!
//! Malformed per-track data never raises: missing albums, release dates,
//! durations or popularity values are defaulted or skipped field by field.
//!
//! ## Artist keys
//!
//! Unique artists are counted by Spotify id (`uniqueArtistsById`) while the
//! per-artist distribution is keyed by display name (`artistsByName`). Two
//! artists sharing a display name are merged in the distribution but still
//! counted separately as unique artists.

pub mod popularity;
pub mod stats;

use std::collections::HashMap;

use crate::types::{
    AnalysisInsights, AnalysisOptions, AnalysisResult, PlaylistData, PlaylistStatistics, Track,
};

pub use popularity::popularity_insights;
pub use stats::{
    average_track_duration, count_artists, count_genres, count_unique_albums,
    count_unique_artists, top_tracks, year_distribution,
};

/// Artist id to genre tags, as resolved through the artists endpoint.
pub type GenreLookup = HashMap<String, Vec<String>>;

/// Flattens the track lists of all playlists into one sequence.
///
/// Entries without a track are dropped. Artists found in `genres` get their
/// tags replaced by the looked-up ones; artists missing from the lookup keep
/// whatever tags were embedded in the track.
pub fn normalize_tracks(playlists: &[PlaylistData], genres: &GenreLookup) -> Vec<Track> {
    playlists
        .iter()
        .flat_map(|p| p.tracks.iter())
        .filter_map(|item| item.track.clone())
        .map(|mut track| {
            for artist in track.artists.iter_mut() {
                if let Some(tags) = artist.id.as_ref().and_then(|id| genres.get(id)) {
                    artist.genres = tags.clone();
                }
            }
            track
        })
        .collect()
}

pub fn aggregate(
    playlist_ids: &[String],
    tracks: &[Track],
    options: &AnalysisOptions,
) -> AnalysisResult {
    let genre_distribution = count_genres(tracks);
    let mut artists_by_name = count_artists(tracks);
    artists_by_name.truncate(options.artists());

    let popularity_insights = popularity_insights(tracks);

    let statistics = PlaylistStatistics {
        total_tracks: tracks.len(),
        total_duration: stats::total_duration(tracks),
        average_popularity: popularity::average_popularity(tracks).round() as u32,
        most_common_genre: genre_distribution.first().map(|g| g.genre.clone()),
        unique_albums: count_unique_albums(tracks),
        unique_artists_by_id: count_unique_artists(tracks),
        avg_track_duration: average_track_duration(tracks),
    };

    AnalysisResult {
        playlist_ids: playlist_ids.to_vec(),
        statistics,
        insights: AnalysisInsights {
            genre_distribution,
            artists_by_name,
            year_distribution: year_distribution(tracks),
            top_tracks: top_tracks(tracks, options.top_tracks()),
            popularity_insights,
        },
    }
}

/// Normalizes the fetched playlists and aggregates them in one step.
pub fn aggregate_playlists(
    playlist_ids: &[String],
    playlists: &[PlaylistData],
    genres: &GenreLookup,
    options: &AnalysisOptions,
) -> AnalysisResult {
    let tracks = normalize_tracks(playlists, genres);
    aggregate(playlist_ids, &tracks, options)
}
