use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tabled::Tabled;

// Upstream track data is not trusted to be well typed. The helpers below
// decode through `Value` so a malformed field only loses that field instead
// of failing the whole page.

/// Decodes an optional field, treating `null` or a value of the wrong type
/// as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Like [`lenient`], falling back to the type's default.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + DeserializeOwned,
{
    Ok(lenient(deserializer)?.unwrap_or_default())
}

/// Decodes a list element by element, skipping elements that do not decode.
/// Anything other than an array yields an empty list.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// Unix timestamp (seconds) after which the access token is no longer valid.
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackArtist {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "lenient_items")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackAlbum {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Track {
    #[serde(deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(deserialize_with = "nullable")]
    pub name: String,
    #[serde(deserialize_with = "lenient_items")]
    pub artists: Vec<TrackArtist>,
    #[serde(deserialize_with = "lenient")]
    pub album: Option<TrackAlbum>,
    #[serde(deserialize_with = "lenient")]
    pub duration_ms: Option<u64>,
    #[serde(deserialize_with = "lenient")]
    pub popularity: Option<u32>,
}

impl Track {
    /// Popularity if present and inside the 0-100 scale.
    pub fn popularity_score(&self) -> Option<u32> {
        self.popularity.filter(|p| *p <= 100)
    }

    pub fn album_id(&self) -> Option<&str> {
        self.album
            .as_ref()
            .and_then(|a| a.id.as_deref())
            .filter(|id| !id.is_empty())
    }

    pub fn release_date(&self) -> Option<&str> {
        self.album.as_ref().and_then(|a| a.release_date.as_deref())
    }

    /// Year taken from the first four characters of the album release date.
    pub fn release_year(&self) -> Option<i32> {
        let date = self.release_date()?;
        let year = date.get(..4)?.parse::<i32>().ok()?;
        (year > 0).then_some(year)
    }

    pub fn artist_names(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistItem {
    #[serde(default, deserialize_with = "lenient")]
    pub added_at: Option<String>,
    /// `None` for deleted or region-restricted tracks, and for entries that
    /// are not a track object at all.
    #[serde(default, deserialize_with = "lenient")]
    pub track: Option<Track>,
}

/// One page of a Spotify list endpoint. Items that fail to decode are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Paging<T> {
    #[serde(default = "Vec::new", deserialize_with = "lenient_items")]
    pub items: Vec<T>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub offset: Option<u64>,
    #[serde(default)]
    pub limit: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistOwner {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TracksRef {
    #[serde(default)]
    pub total: Option<u64>,
}

/// Playlist as listed by `/me/playlists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    #[serde(default, deserialize_with = "nullable")]
    pub images: Vec<Image>,
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub tracks: Option<TracksRef>,
}

impl PlaylistSummary {
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().and_then(|o| o.display_name.as_deref())
    }
}

/// Full playlist object as returned by `/playlists/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub owner: Option<PlaylistOwner>,
    #[serde(default)]
    pub followers: Option<Followers>,
    #[serde(default, deserialize_with = "nullable")]
    pub images: Vec<Image>,
    pub tracks: Paging<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistInfo {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<PlaylistOwner>,
    pub followers: Option<Followers>,
    pub images: Vec<Image>,
}

/// Playlist metadata together with every track page concatenated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistData {
    pub playlist: PlaylistInfo,
    pub tracks: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default, deserialize_with = "nullable")]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    #[serde(default, deserialize_with = "lenient_items")]
    pub artists: Vec<Option<Artist>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub images: Vec<Image>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub followers: Option<Followers>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisOptions {
    pub include_genre_analysis: Option<bool>,
    pub top_tracks_limit: Option<usize>,
    pub artist_limit: Option<usize>,
}

impl AnalysisOptions {
    pub const DEFAULT_TOP_TRACKS: usize = 10;
    pub const DEFAULT_ARTIST_LIMIT: usize = 20;

    pub fn genres_enabled(&self) -> bool {
        self.include_genre_analysis.unwrap_or(true)
    }

    pub fn top_tracks(&self) -> usize {
        self.top_tracks_limit.unwrap_or(Self::DEFAULT_TOP_TRACKS)
    }

    pub fn artists(&self) -> usize {
        self.artist_limit.unwrap_or(Self::DEFAULT_ARTIST_LIMIT)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub id: Option<String>,
    pub name: String,
    pub artists: String,
    pub popularity: Option<u32>,
    pub duration_ms: Option<u64>,
    pub album: Option<String>,
    pub release_date: Option<String>,
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            name: track.name.clone(),
            artists: track.artist_names(),
            popularity: track.popularity_score(),
            duration_ms: track.duration_ms,
            album: track.album.as_ref().and_then(|a| a.name.clone()),
            release_date: track.release_date().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreCount {
    pub genre: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistCount {
    pub name: String,
    pub track_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularityBucket {
    pub range: String,
    pub min: u32,
    pub max: u32,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularityInsights {
    pub average_popularity: f64,
    pub popularity_distribution: Vec<PopularityBucket>,
    pub trending_tracks: Vec<TrackSummary>,
    pub vintage_tracks: Vec<TrackSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistStatistics {
    pub total_tracks: usize,
    pub total_duration: u64,
    pub average_popularity: u32,
    pub most_common_genre: Option<String>,
    pub unique_albums: usize,
    pub unique_artists_by_id: usize,
    pub avg_track_duration: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisInsights {
    pub genre_distribution: Vec<GenreCount>,
    pub artists_by_name: Vec<ArtistCount>,
    pub year_distribution: Vec<YearCount>,
    pub top_tracks: Vec<TrackSummary>,
    pub popularity_insights: PopularityInsights,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub playlist_ids: Vec<String>,
    pub statistics: PlaylistStatistics,
    pub insights: AnalysisInsights,
}

#[derive(Tabled)]
pub struct PlaylistTableRow {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub tracks: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub artists: String,
    pub album: String,
    pub popularity: String,
    pub duration: String,
}

#[derive(Tabled)]
pub struct DistributionTableRow {
    pub label: String,
    pub count: usize,
}
