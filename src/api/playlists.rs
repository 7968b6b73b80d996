use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    api::session::Session,
    error::ApiError,
    server::AppState,
    spotify::playlists::{self, MAX_PLAYLISTS_LIMIT},
    types::{PlaylistData, PlaylistSummary},
    utils,
};

#[derive(Debug, Deserialize)]
pub struct PlaylistsQuery {
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPlaylistsRequest {
    #[serde(default)]
    pub search_query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistsResponse {
    pub playlists: Vec<PlaylistSummary>,
    pub total: u64,
    pub has_more: bool,
}

pub async fn playlist(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    Path(raw_id): Path<String>,
) -> Result<(CookieJar, Json<PlaylistData>), ApiError> {
    let id = utils::parse_playlist_id(&raw_id)
        .ok_or_else(|| ApiError::MalformedInput(format!("Invalid playlist id: {}", raw_id)))?;

    let data = playlists::get_playlist(&state.client, session.access_token(), &id).await?;
    Ok((session.write_cookies(jar), Json(data)))
}

pub async fn list_playlists(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    query: Result<Query<PlaylistsQuery>, QueryRejection>,
) -> Result<(CookieJar, Json<PlaylistsResponse>), ApiError> {
    let Query(query) = query.map_err(|e| {
        debug!("Rejected playlists query: {}", e);
        ApiError::MalformedInput("Invalid query parameters".to_string())
    })?;
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(MAX_PLAYLISTS_LIMIT);
    debug!(offset, limit, "Fetching playlists");

    let page =
        playlists::get_user_playlists(&state.client, session.access_token(), offset, limit).await?;

    let response = PlaylistsResponse {
        total: page.total.unwrap_or(page.items.len() as u64),
        has_more: page.next.is_some(),
        playlists: page.items,
    };
    Ok((session.write_cookies(jar), Json(response)))
}

/// Searches the first page of the user's playlists by name, description or
/// owner. A blank query returns the page unfiltered.
pub async fn search_playlists(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    body: Result<Json<SearchPlaylistsRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<PlaylistsResponse>), ApiError> {
    let Json(request) =
        body.map_err(|_| ApiError::MalformedInput("Invalid request body".to_string()))?;
    let query = request.search_query.unwrap_or_default();

    let page = playlists::get_user_playlists(
        &state.client,
        session.access_token(),
        0,
        MAX_PLAYLISTS_LIMIT,
    )
    .await?;

    let response = if query.trim().is_empty() {
        PlaylistsResponse {
            total: page.total.unwrap_or(page.items.len() as u64),
            has_more: page.next.is_some(),
            playlists: page.items,
        }
    } else {
        let matching: Vec<PlaylistSummary> = page
            .items
            .into_iter()
            .filter(|p| playlists::matches_query(p, &query))
            .collect();
        debug!(query = %query, found = matching.len(), "Searched playlists");

        PlaylistsResponse {
            total: matching.len() as u64,
            has_more: false,
            playlists: matching,
        }
    };

    Ok((session.write_cookies(jar), Json(response)))
}
