use crate::types::{PopularityBucket, PopularityInsights, Track, TrackSummary};

pub const TRENDING_THRESHOLD: u32 = 70;
pub const VINTAGE_THRESHOLD: u32 = 30;
pub const HIGHLIGHT_LIMIT: usize = 10;

const BUCKETS: [(u32, u32); 5] = [(0, 20), (21, 40), (41, 60), (61, 80), (81, 100)];

/// Mean popularity over tracks that carry one, 0.0 when none do.
pub fn average_popularity(tracks: &[Track]) -> f64 {
    let scores: Vec<u32> = tracks.iter().filter_map(Track::popularity_score).collect();
    if scores.is_empty() {
        return 0.0;
    }

    scores.iter().map(|p| *p as f64).sum::<f64>() / scores.len() as f64
}

pub fn popularity_distribution(tracks: &[Track]) -> Vec<PopularityBucket> {
    let mut buckets: Vec<PopularityBucket> = BUCKETS
        .iter()
        .map(|(min, max)| PopularityBucket {
            range: format!("{}-{}", min, max),
            min: *min,
            max: *max,
            count: 0,
        })
        .collect();

    for popularity in tracks.iter().filter_map(Track::popularity_score) {
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| popularity >= b.min && popularity <= b.max)
        {
            bucket.count += 1;
        }
    }

    buckets
}

/// Tracks at or above the trending threshold, most popular first.
pub fn trending_tracks(tracks: &[Track]) -> Vec<TrackSummary> {
    let mut trending: Vec<(&Track, u32)> = tracks
        .iter()
        .filter_map(|t| t.popularity_score().map(|p| (t, p)))
        .filter(|(_, p)| *p >= TRENDING_THRESHOLD)
        .collect();
    trending.sort_by(|a, b| b.1.cmp(&a.1));

    trending
        .into_iter()
        .take(HIGHLIGHT_LIMIT)
        .map(|(t, _)| TrackSummary::from(t))
        .collect()
}

/// Tracks at or below the vintage threshold, oldest release first. Tracks
/// whose year cannot be parsed sort as year 0.
pub fn vintage_tracks(tracks: &[Track]) -> Vec<TrackSummary> {
    let mut vintage: Vec<&Track> = tracks
        .iter()
        .filter(|t| {
            t.popularity_score()
                .is_some_and(|p| p <= VINTAGE_THRESHOLD)
        })
        .collect();
    vintage.sort_by_key(|t| t.release_year().unwrap_or(0));

    vintage
        .into_iter()
        .take(HIGHLIGHT_LIMIT)
        .map(TrackSummary::from)
        .collect()
}

pub fn popularity_insights(tracks: &[Track]) -> PopularityInsights {
    if tracks.is_empty() {
        return PopularityInsights::default();
    }

    PopularityInsights {
        average_popularity: average_popularity(tracks),
        popularity_distribution: popularity_distribution(tracks),
        trending_tracks: trending_tracks(tracks),
        vintage_tracks: vintage_tracks(tracks),
    }
}
