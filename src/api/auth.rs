use axum::{Json, extract::State, http::HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    api::session::{add_token_cookies, clear_token_cookies, token_from_request},
    management::TokenManager,
    server::AppState,
    spotify,
    types::UserProfile,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthCheckResponse {
    pub authenticated: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthUserResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Reports whether the request carries a token at all, without asking Spotify.
pub async fn check(headers: HeaderMap, jar: CookieJar) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        authenticated: token_from_request(&headers, &jar).is_some(),
    })
}

/// Validates the session against Spotify and returns the user's profile.
///
/// An expiring token is refreshed first and the new cookies are written back.
/// When the token cannot be used or refreshed, the session cookies are
/// cleared.
pub async fn user(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> (CookieJar, Json<AuthUserResponse>) {
    let unauthenticated = Json(AuthUserResponse {
        authenticated: false,
        user: None,
    });

    let Some(token) = token_from_request(&headers, &jar) else {
        return (jar, unauthenticated);
    };

    let mut manager = TokenManager::new(token);
    let result = match manager.get_valid_token(&state.client).await {
        Ok(access_token) => spotify::user::get_current_user(&state.client, &access_token).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(user) => {
            let jar = if manager.was_refreshed() {
                add_token_cookies(jar, manager.current_token())
            } else {
                jar
            };
            (
                jar,
                Json(AuthUserResponse {
                    authenticated: true,
                    user: Some(user),
                }),
            )
        }
        Err(e) if e.is_auth() => {
            debug!("Session is no longer valid: {}", e);
            (clear_token_cookies(jar), unauthenticated)
        }
        Err(e) => {
            warn!("Failed to check user authentication: {}", e);
            (jar, unauthenticated)
        }
    }
}

pub async fn logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        clear_token_cookies(jar),
        Json(LogoutResponse { success: true }),
    )
}
