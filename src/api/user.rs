use axum::{Json, extract::State};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{api::session::Session, error::ApiError, server::AppState, spotify};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image: String,
    pub spotify_id: String,
}

pub async fn user(
    State(state): State<AppState>,
    session: Session,
    jar: CookieJar,
) -> Result<(CookieJar, Json<UserSummary>), ApiError> {
    let profile = spotify::user::get_current_user(&state.client, session.access_token()).await?;

    let summary = UserSummary {
        id: profile.id.clone(),
        name: profile.display_name,
        email: profile.email,
        image: profile
            .images
            .first()
            .map(|i| i.url.clone())
            .unwrap_or_default(),
        spotify_id: profile.id,
    };
    Ok((session.write_cookies(jar), Json(summary)))
}
