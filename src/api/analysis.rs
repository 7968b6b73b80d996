use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::warn;

use crate::{
    api::session::Session,
    error::ApiError,
    management,
    server::AppState,
    types::{AnalysisOptions, AnalysisResult},
    utils,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    #[serde(default)]
    pub playlist_ids: Option<Vec<String>>,
    #[serde(default)]
    pub options: Option<AnalysisOptions>,
}

/// Validates the requested playlist IDs. Links and URIs are reduced to IDs.
pub fn playlist_ids_from_request(request: &AnalysisRequest) -> Result<Vec<String>, ApiError> {
    let ids = request.playlist_ids.as_deref().unwrap_or_default();
    if ids.is_empty() {
        return Err(ApiError::MalformedInput(
            "No playlists to analyze".to_string(),
        ));
    }

    ids.iter()
        .map(|raw| {
            utils::parse_playlist_id(raw).ok_or_else(|| {
                ApiError::MalformedInput(format!("Invalid playlist id: {}", raw))
            })
        })
        .collect()
}

pub async fn analysis(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
    body: Result<Json<AnalysisRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<AnalysisResult>), ApiError> {
    let Json(request) = body.map_err(|e| {
        warn!("Rejected analysis request: {}", e);
        ApiError::MalformedInput("Invalid request body".to_string())
    })?;

    let playlist_ids = playlist_ids_from_request(&request)?;
    let options = request.options.unwrap_or_default();

    let result = management::run_analysis(
        &state.client,
        session.access_token(),
        &playlist_ids,
        &options,
    )
    .await
    .inspect_err(|e| warn!("Playlist analysis failed: {}", e))?;

    Ok((session.write_cookies(jar), Json(result)))
}
