use tabled::Table;

use crate::{
    cli::{spinner, token::access_token},
    error, info, management,
    spotify::SpotifyClient,
    success,
    types::{
        AnalysisOptions, AnalysisResult, DistributionTableRow, TrackSummary, TrackTableRow,
    },
    utils, warning,
};

/// Number of rows printed for the artist and genre tables.
const REPORT_ROWS: usize = 10;

pub async fn analyze(playlists: Vec<String>, json: bool, top: Option<usize>, no_genres: bool) {
    let mut playlist_ids: Vec<String> = Vec::with_capacity(playlists.len());
    for input in &playlists {
        match utils::parse_playlist_id(input) {
            Some(id) => playlist_ids.push(id),
            None => error!("Invalid playlist id: {}", input),
        }
    }

    if playlist_ids.is_empty() {
        error!("No playlists to analyze");
    }

    let client = SpotifyClient::from_env();
    let token = access_token(&client).await;
    let options = AnalysisOptions {
        include_genre_analysis: Some(!no_genres),
        top_tracks_limit: top,
        artist_limit: None,
    };

    let pb = spinner(format!("Analyzing {} playlist(s)...", playlist_ids.len()));
    let result = management::run_analysis(&client, &token, &playlist_ids, &options).await;
    pb.finish_and_clear();

    let result = match result {
        Ok(result) => result,
        Err(e) => error!("Analysis failed. Err: {}", e),
    };

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Failed to serialize analysis. Err: {}", e),
        }
        return;
    }

    print_report(&result);
}

fn print_report(result: &AnalysisResult) {
    let stats = &result.statistics;
    let insights = &result.insights;

    success!(
        "Analyzed {} tracks from {} playlist(s)",
        stats.total_tracks,
        result.playlist_ids.len()
    );

    if stats.total_tracks == 0 {
        warning!("The selected playlists contain no playable tracks");
        return;
    }

    info!(
        "Total duration: {}",
        utils::format_total_duration(stats.total_duration)
    );
    info!(
        "Average track duration: {}",
        utils::format_duration(stats.avg_track_duration * 1000)
    );
    info!("Average popularity: {}", stats.average_popularity);
    info!(
        "Unique artists: {}, unique albums: {}",
        stats.unique_artists_by_id, stats.unique_albums
    );
    if let Some(genre) = &stats.most_common_genre {
        info!("Most common genre: {}", genre);
    }

    info!("Top tracks");
    println!("{}", Table::new(track_rows(&insights.top_tracks)));

    info!("Top artists");
    let artists = insights
        .artists_by_name
        .iter()
        .take(REPORT_ROWS)
        .map(|a| DistributionTableRow {
            label: a.name.clone(),
            count: a.track_count,
        });
    println!("{}", Table::new(artists));

    if !insights.genre_distribution.is_empty() {
        info!("Top genres");
        let genres = insights
            .genre_distribution
            .iter()
            .take(REPORT_ROWS)
            .map(|g| DistributionTableRow {
                label: g.genre.clone(),
                count: g.count,
            });
        println!("{}", Table::new(genres));
    }

    if !insights.year_distribution.is_empty() {
        info!("Release years");
        let years = insights.year_distribution.iter().map(|y| DistributionTableRow {
            label: y.year.to_string(),
            count: y.count,
        });
        println!("{}", Table::new(years));
    }

    let popularity = &insights.popularity_insights;
    if !popularity.popularity_distribution.is_empty() {
        info!("Popularity");
        let buckets = popularity
            .popularity_distribution
            .iter()
            .map(|b| DistributionTableRow {
                label: b.range.clone(),
                count: b.count,
            });
        println!("{}", Table::new(buckets));
    }

    if !popularity.trending_tracks.is_empty() {
        info!("Trending tracks");
        println!("{}", Table::new(track_rows(&popularity.trending_tracks)));
    }

    if !popularity.vintage_tracks.is_empty() {
        info!("Vintage tracks");
        println!("{}", Table::new(track_rows(&popularity.vintage_tracks)));
    }
}

fn track_rows(tracks: &[TrackSummary]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .map(|t| TrackTableRow {
            name: t.name.clone(),
            artists: t.artists.clone(),
            album: t.album.clone().unwrap_or_default(),
            popularity: t.popularity.map(|p| p.to_string()).unwrap_or_default(),
            duration: t
                .duration_ms
                .map(utils::format_duration)
                .unwrap_or_default(),
        })
        .collect()
}
