use std::collections::{BTreeMap, HashMap, HashSet};

use crate::types::{ArtistCount, GenreCount, Track, TrackSummary, YearCount};

/// Counting keyed by first appearance, so ties keep input order after a stable sort.
#[derive(Default)]
struct OrderedCounter {
    index: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl OrderedCounter {
    fn add(&mut self, key: &str) {
        match self.index.get(key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key.to_string(), self.counts.len());
                self.counts.push((key.to_string(), 1));
            }
        }
    }

    fn into_sorted_desc(self) -> Vec<(String, usize)> {
        let mut counts = self.counts;
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Number of distinct album ids. Tracks without an album id are ignored.
pub fn count_unique_albums(tracks: &[Track]) -> usize {
    tracks
        .iter()
        .filter_map(Track::album_id)
        .collect::<HashSet<_>>()
        .len()
}

/// Number of distinct artists, keyed by artist id and falling back to the
/// display name when the id is missing.
pub fn count_unique_artists(tracks: &[Track]) -> usize {
    tracks
        .iter()
        .flat_map(|t| t.artists.iter())
        .map(|a| a.id.as_deref().filter(|id| !id.is_empty()).unwrap_or(a.name.as_str()))
        .collect::<HashSet<_>>()
        .len()
}

/// Average duration in whole seconds. Missing durations count as zero.
pub fn average_track_duration(tracks: &[Track]) -> u64 {
    if tracks.is_empty() {
        return 0;
    }

    let total: u64 = tracks.iter().map(|t| t.duration_ms.unwrap_or(0)).sum();
    (total as f64 / tracks.len() as f64 / 1000.0).round() as u64
}

pub fn total_duration(tracks: &[Track]) -> u64 {
    tracks.iter().map(|t| t.duration_ms.unwrap_or(0)).sum()
}

pub fn year_distribution(tracks: &[Track]) -> Vec<YearCount> {
    let mut years: BTreeMap<i32, usize> = BTreeMap::new();
    for year in tracks.iter().filter_map(Track::release_year) {
        *years.entry(year).or_insert(0) += 1;
    }

    years
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Most popular tracks first. Equal popularity keeps the input order.
pub fn top_tracks(tracks: &[Track], limit: usize) -> Vec<TrackSummary> {
    let mut sorted: Vec<&Track> = tracks.iter().collect();
    sorted.sort_by_key(|t| std::cmp::Reverse(t.popularity_score().unwrap_or(0)));

    sorted
        .into_iter()
        .take(limit)
        .map(TrackSummary::from)
        .collect()
}

/// Counts every (track, artist, genre) occurrence, so two artists on one
/// track sharing a genre add two to that genre.
pub fn count_genres(tracks: &[Track]) -> Vec<GenreCount> {
    let mut counter = OrderedCounter::default();
    for genre in tracks
        .iter()
        .flat_map(|t| t.artists.iter())
        .flat_map(|a| a.genres.iter())
    {
        counter.add(genre);
    }

    counter
        .into_sorted_desc()
        .into_iter()
        .map(|(genre, count)| GenreCount { genre, count })
        .collect()
}

/// Track count per artist display name. Distinct artists sharing a name are
/// merged into one entry.
pub fn count_artists(tracks: &[Track]) -> Vec<ArtistCount> {
    let mut counter = OrderedCounter::default();
    for artist in tracks.iter().flat_map(|t| t.artists.iter()) {
        counter.add(&artist.name);
    }

    counter
        .into_sorted_desc()
        .into_iter()
        .map(|(name, track_count)| ArtistCount { name, track_count })
        .collect()
}
