use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use splyzer::{
    api::PlaylistsResponse,
    server::{self, AppState},
    spotify::SpotifyClient,
    types::AnalysisResult,
};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct FakeSpotify {
    base: String,
    // Playlist id to number of requests seen
    hits: Arc<Mutex<HashMap<String, usize>>>,
    // Number of ids in each artists request
    artist_batches: Arc<Mutex<Vec<usize>>>,
}

impl FakeSpotify {
    fn record_hit(&self, id: &str) -> usize {
        let mut hits = self.hits.lock().unwrap();
        let count = hits.entry(id.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    fn hits(&self, id: &str) -> usize {
        self.hits.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    matches!(
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok()),
        Some("Bearer valid-token") | Some("Bearer fresh-token")
    )
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
    )
        .into_response()
}

fn track(id: &str, name: &str, artist: (&str, &str), album: (&str, &str), popularity: u32) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{ "id": artist.0, "name": artist.1 }],
        "album": { "id": album.0, "name": "Album", "release_date": album.1 },
        "duration_ms": 180_000 + popularity as u64 * 1000,
        "popularity": popularity
    })
}

fn playlist(id: &str, items: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "id": id,
        "name": id,
        "owner": { "id": "me", "display_name": "Me" },
        "tracks": { "items": items, "next": null, "total": total }
    })
}

fn failure(status: StatusCode, retry_after: Option<&'static str>) -> Response {
    let body = Json(json!({ "error": { "status": status.as_u16(), "message": "try later" } }));
    match retry_after {
        Some(secs) => (status, [(header::RETRY_AFTER, secs)], body).into_response(),
        None => (status, body).into_response(),
    }
}

async fn fake_playlist(
    State(fake): State<FakeSpotify>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let hit = fake.record_hit(&id);
    match id.as_str() {
        "flaky" if hit == 1 => failure(StatusCode::SERVICE_UNAVAILABLE, None),
        "limited" if hit == 1 => failure(StatusCode::TOO_MANY_REQUESTS, Some("0")),
        "down" => failure(StatusCode::SERVICE_UNAVAILABLE, None),
        "throttled" => failure(StatusCode::TOO_MANY_REQUESTS, Some("600")),
        "flaky" | "limited" => Json(playlist(&id, Vec::new())).into_response(),
        "crowd" => {
            let items = (0..60)
                .map(|i| {
                    let artist = format!("c{}", i);
                    let name = format!("ct{}", i);
                    let item = track(&name, "Crowd", (artist.as_str(), "Crowd"), ("cal", "2010"), 50);
                    json!({ "track": item })
                })
                .collect();
            Json(playlist("crowd", items)).into_response()
        }
        "malformed" => Json(playlist(
            "malformed",
            vec![
                json!({ "track": track("t1", "First", ("a1", "Alpha"), ("al1", "2020-05-01"), 80) }),
                json!({ "track": { "id": "bad", "name": "Bad", "popularity": -1, "duration_ms": "long" } }),
                json!({ "track": 5 }),
                json!({
                    "track": {
                        "id": "t3",
                        "name": "Third",
                        "artists": [null, { "id": "a2", "name": "Beta" }],
                        "popularity": 40
                    }
                }),
            ],
        ))
        .into_response(),
        "mix" => Json(json!({
            "id": "mix",
            "name": "Mix",
            "owner": { "id": "me", "display_name": "Me" },
            "tracks": {
                "items": [
                    { "added_at": null, "track": null },
                    { "track": track("t1", "First", ("a1", "Alpha"), ("al1", "2020-05-01"), 80) }
                ],
                "next": format!("{}/v1/playlists/mix/tracks?offset=2", fake.base),
                "total": 3
            }
        }))
        .into_response(),
        "revoked" => unauthorized(),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "status": 500, "message": "boom" } })),
        )
            .into_response(),
    }
}

async fn fake_playlist_tracks(headers: HeaderMap, Path(_id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({
        "items": [
            { "track": track("t2", "Second", ("a2", "Beta"), ("al2", "1999"), 20) }
        ],
        "next": null,
        "total": 3
    }))
    .into_response()
}

async fn fake_artists(
    State(fake): State<FakeSpotify>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let ids: Vec<&str> = query
        .get("ids")
        .map(|ids| ids.split(',').collect())
        .unwrap_or_default();
    fake.artist_batches.lock().unwrap().push(ids.len());

    let artists: Vec<Value> = ids
        .into_iter()
        .map(|id| match id {
            "a1" => json!({ "id": "a1", "name": "Alpha", "genres": ["synthpop"] }),
            "a2" => json!({ "id": "a2", "name": "Beta", "genres": ["synthpop", "ambient"] }),
            id if id.starts_with('c') => json!({ "id": id, "name": "Crowd", "genres": ["crowdcore"] }),
            _ => Value::Null,
        })
        .collect();

    Json(json!({ "artists": artists })).into_response()
}

async fn fake_my_playlists(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({
        "items": [
            {
                "id": "pl1",
                "name": "Chill Vibes",
                "owner": { "id": "me", "display_name": "Me" },
                "images": null,
                "tracks": { "total": 12 }
            },
            {
                "id": "pl2",
                "name": "Workout",
                "description": "High energy",
                "owner": { "id": "me", "display_name": "Me" },
                "tracks": { "total": 30 }
            }
        ],
        "next": null,
        "total": 2
    }))
    .into_response()
}

async fn fake_me(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    Json(json!({
        "id": "me",
        "display_name": "Test User",
        "email": "me@example.com",
        "images": [{ "url": "https://img.example.com/me.png" }]
    }))
    .into_response()
}

async fn fake_token(Form(form): Form<HashMap<String, String>>) -> Response {
    let valid_grant = form.get("grant_type").map(String::as_str) == Some("refresh_token")
        && form.get("refresh_token").map(String::as_str) == Some("refresh-1");

    if !valid_grant {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "invalid_grant", "error_description": "Refresh token revoked" })),
        )
            .into_response();
    }

    Json(json!({
        "access_token": "fresh-token",
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn spawn_fake_spotify() -> FakeSpotify {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let fake = FakeSpotify {
        base: format!("http://{}", listener.local_addr().unwrap()),
        ..Default::default()
    };

    let app = Router::new()
        .route("/v1/playlists/{id}", get(fake_playlist))
        .route("/v1/playlists/{id}/tracks", get(fake_playlist_tracks))
        .route("/v1/artists", get(fake_artists))
        .route("/v1/me", get(fake_me))
        .route("/v1/me/playlists", get(fake_my_playlists))
        .route("/token", post(fake_token))
        .with_state(fake.clone());

    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    fake
}

// Starts the fake upstream and the service, returns the service base URL
async fn spawn_app() -> String {
    spawn_app_with_upstream().await.0
}

async fn spawn_app_with_upstream() -> (String, FakeSpotify) {
    let upstream = spawn_fake_spotify().await;
    let client = SpotifyClient::new(
        format!("{}/v1", upstream.base),
        format!("{}/token", upstream.base),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let app = server::router(AppState::new(client));

    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (base, upstream)
}

async fn analyze(base: &str, playlist_id: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .bearer_auth("valid-token")
        .json(&json!({ "playlistIds": [playlist_id] }))
        .send()
        .await
        .unwrap()
}

fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_health() {
    let base = spawn_app().await;

    let response = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "splyzer");
}

#[tokio::test]
async fn test_analysis_requires_session() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .json(&json!({ "playlistIds": ["mix"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Not authenticated");
}

#[tokio::test]
async fn test_analysis_rejects_empty_ids() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/analysis", base))
        .header(header::COOKIE, "spotify_access_token=valid-token")
        .json(&json!({ "playlistIds": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "No playlists to analyze");

    let response = client
        .post(format!("{}/api/analysis", base))
        .header(header::COOKIE, "spotify_access_token=valid-token")
        .json(&json!({ "options": { "topTracksLimit": 5 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(format!("{}/api/analysis", base))
        .header(header::COOKIE, "spotify_access_token=valid-token")
        .json(&json!({ "playlistIds": ["not a playlist!"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analysis_aggregates_all_pages() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .bearer_auth("valid-token")
        .json(&json!({ "playlistIds": ["https://open.spotify.com/playlist/mix?si=1"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result: AnalysisResult = response.json().await.unwrap();
    assert_eq!(result.playlist_ids, vec!["mix".to_string()]);

    // The null item is dropped, the second page is followed
    let stats = &result.statistics;
    assert_eq!(stats.total_tracks, 2);
    assert_eq!(stats.total_duration, 260_000 + 200_000);
    assert_eq!(stats.average_popularity, 50);
    assert_eq!(stats.most_common_genre.as_deref(), Some("synthpop"));
    assert_eq!(stats.unique_albums, 2);
    assert_eq!(stats.unique_artists_by_id, 2);
    assert_eq!(stats.avg_track_duration, 230);

    let insights = &result.insights;
    let genres: Vec<(&str, usize)> = insights
        .genre_distribution
        .iter()
        .map(|g| (g.genre.as_str(), g.count))
        .collect();
    assert_eq!(genres, vec![("synthpop", 2), ("ambient", 1)]);

    let years: Vec<i32> = insights.year_distribution.iter().map(|y| y.year).collect();
    assert_eq!(years, vec![1999, 2020]);

    assert_eq!(insights.top_tracks[0].name, "First");
    assert_eq!(insights.popularity_insights.trending_tracks.len(), 1);
    assert_eq!(insights.popularity_insights.vintage_tracks[0].name, "Second");
}

#[tokio::test]
async fn test_analysis_without_genres() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .bearer_auth("valid-token")
        .json(&json!({
            "playlistIds": ["mix"],
            "options": { "includeGenreAnalysis": false }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let result: AnalysisResult = response.json().await.unwrap();
    assert_eq!(result.statistics.total_tracks, 2);
    assert_eq!(result.statistics.most_common_genre, None);
    assert!(result.insights.genre_distribution.is_empty());
}

#[tokio::test]
async fn test_analysis_upstream_failure() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .bearer_auth("valid-token")
        .json(&json!({ "playlistIds": ["mix", "broken"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Upstream request failed");
    assert!(body["message"].as_str().unwrap().contains("boom"));
}

#[tokio::test]
async fn test_analysis_upstream_unauthorized() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .bearer_auth("valid-token")
        .json(&json!({ "playlistIds": ["revoked"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_refreshed() {
    let base = spawn_app().await;
    let expired_ms = (chrono::Utc::now().timestamp() - 60) * 1000;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .header(
            header::COOKIE,
            format!(
                "spotify_access_token=stale-token; spotify_refresh_token=refresh-1; spotify_token_expires_at={}",
                expired_ms
            ),
        )
        .json(&json!({ "playlistIds": ["mix"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify_access_token=fresh-token"))
    );
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify_refresh_token=refresh-1"))
    );
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify_token_expires_at="))
    );
}

#[tokio::test]
async fn test_expired_session_cannot_be_refreshed() {
    let base = spawn_app().await;
    let expired_ms = (chrono::Utc::now().timestamp() - 60) * 1000;
    let client = reqwest::Client::new();

    // Rejected refresh token
    let response = client
        .post(format!("{}/api/analysis", base))
        .header(
            header::COOKIE,
            format!(
                "spotify_access_token=stale-token; spotify_refresh_token=revoked; spotify_token_expires_at={}",
                expired_ms
            ),
        )
        .json(&json!({ "playlistIds": ["mix"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No refresh token at all
    let response = client
        .post(format!("{}/api/analysis", base))
        .header(
            header::COOKIE,
            format!(
                "spotify_access_token=stale-token; spotify_token_expires_at={}",
                expired_ms
            ),
        )
        .json(&json!({ "playlistIds": ["mix"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_playlist_endpoint() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/playlist/mix", base))
        .bearer_auth("valid-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["playlist"]["name"], "Mix");
    assert_eq!(body["tracks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_dashboard_playlists() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/dashboard/playlists?limit=10", base))
        .bearer_auth("valid-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: PlaylistsResponse = response.json().await.unwrap();
    assert_eq!(page.playlists.len(), 2);
    assert_eq!(page.total, 2);
    assert!(!page.has_more);

    let response = client
        .post(format!("{}/api/dashboard/playlists", base))
        .bearer_auth("valid-token")
        .json(&json!({ "searchQuery": "ENERGY" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let page: PlaylistsResponse = response.json().await.unwrap();
    assert_eq!(page.playlists.len(), 1);
    assert_eq!(page.playlists[0].id, "pl2");
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_auth_check_and_logout() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/api/auth/check", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["authenticated"], false);

    let body: Value = client
        .get(format!("{}/api/auth/check", base))
        .header(header::COOKIE, "spotify_access_token=valid-token")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["authenticated"], true);

    let response = client
        .post(format!("{}/api/auth/logout", base))
        .header(header::COOKIE, "spotify_access_token=valid-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify_access_token=") && c.contains("Max-Age=0"))
    );
}

#[tokio::test]
async fn test_user_endpoint() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/user", base))
        .bearer_auth("valid-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["id"], "me");
    assert_eq!(body["spotifyId"], "me");
    assert_eq!(body["name"], "Test User");
    assert_eq!(body["image"], "https://img.example.com/me.png");
    assert!(body.get("accessToken").is_none());

    let response = client
        .get(format!("{}/api/user", base))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_user() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let body: Value = client
        .get(format!("{}/api/auth/user", base))
        .header(header::COOKIE, "spotify_access_token=valid-token")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["display_name"], "Test User");

    // A token Spotify rejects clears the session
    let response = client
        .get(format!("{}/api/auth/user", base))
        .header(header::COOKIE, "spotify_access_token=bogus-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify_access_token=") && c.contains("Max-Age=0"))
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["authenticated"], false);
    assert!(body.get("user").is_none());
}

#[tokio::test]
async fn test_transient_upstream_failure_is_retried() {
    let (base, upstream) = spawn_app_with_upstream().await;

    let response = analyze(&base, "flaky").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.hits("flaky"), 2);

    let response = analyze(&base, "limited").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(upstream.hits("limited"), 2);
}

#[tokio::test]
async fn test_retries_give_up_after_max_attempts() {
    let (base, upstream) = spawn_app_with_upstream().await;

    let response = analyze(&base, "down").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(upstream.hits("down"), splyzer::spotify::MAX_ATTEMPTS as usize);

    // A Retry-After beyond what the client waits for fails right away
    let response = analyze(&base, "throttled").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(upstream.hits("throttled"), 1);
}

#[tokio::test]
async fn test_artist_lookup_is_batched() {
    let (base, upstream) = spawn_app_with_upstream().await;

    let response = analyze(&base, "crowd").await;
    assert_eq!(response.status(), StatusCode::OK);

    let result: AnalysisResult = response.json().await.unwrap();
    assert_eq!(result.statistics.total_tracks, 60);
    assert_eq!(result.statistics.most_common_genre.as_deref(), Some("crowdcore"));

    let mut batches = upstream.artist_batches.lock().unwrap().clone();
    batches.sort();
    assert_eq!(batches, vec![10, 50]);
}

#[tokio::test]
async fn test_analysis_tolerates_malformed_tracks() {
    let base = spawn_app().await;

    let response = analyze(&base, "malformed").await;
    assert_eq!(response.status(), StatusCode::OK);

    let result: AnalysisResult = response.json().await.unwrap();
    assert_eq!(result.statistics.total_tracks, 3);
    assert_eq!(result.statistics.average_popularity, 60);
    assert_eq!(result.statistics.unique_artists_by_id, 2);
}

#[tokio::test]
async fn test_dashboard_playlists_rejects_bad_query() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/api/dashboard/playlists?offset=abc", base))
        .bearer_auth("valid-token")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid query parameters");
}

#[tokio::test]
async fn test_refresh_cookie_alone_renews_session() {
    let base = spawn_app().await;

    let response = reqwest::Client::new()
        .post(format!("{}/api/analysis", base))
        .header(header::COOKIE, "spotify_refresh_token=refresh-1")
        .json(&json!({ "playlistIds": ["mix"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let cookies = set_cookies(&response);
    assert!(
        cookies
            .iter()
            .any(|c| c.starts_with("spotify_access_token=fresh-token"))
    );
}
