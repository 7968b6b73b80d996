use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::debug;

use crate::{error::ApiError, management::TokenManager, server::AppState, types::Token};

pub const COOKIE_ACCESS_TOKEN: &str = "spotify_access_token";
pub const COOKIE_REFRESH_TOKEN: &str = "spotify_refresh_token";
/// Expiry of the access token in milliseconds since the epoch.
pub const COOKIE_EXPIRES_AT: &str = "spotify_token_expires_at";

const REFRESH_COOKIE_MAX_AGE_DAYS: i64 = 30;

/// Per-request context holding an access token that is valid right now.
///
/// Extracting a `Session` reads the token from the session cookies (or an
/// `Authorization: Bearer` header) and refreshes it first when it is about to
/// expire. Handlers never deal with refreshing themselves.
#[derive(Debug)]
pub struct Session {
    access_token: String,
    refreshed: Option<Token>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refreshed: None,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Adds cookies for a token refreshed during extraction.
    pub fn write_cookies(&self, jar: CookieJar) -> CookieJar {
        match &self.refreshed {
            Some(token) => add_token_cookies(jar, token),
            None => jar,
        }
    }
}

/// Reads the token from the session cookies, falling back to a bearer header.
///
/// The access token cookie lapses together with the access token, while the
/// refresh cookie lives for 30 days. A request carrying only the refresh
/// cookie yields an already expired token, so the refresh pre-step renews it.
pub fn token_from_request(headers: &HeaderMap, jar: &CookieJar) -> Option<Token> {
    let refresh_token = jar
        .get(COOKIE_REFRESH_TOKEN)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty());

    if let Some(access_token) = jar
        .get(COOKIE_ACCESS_TOKEN)
        .map(Cookie::value)
        .filter(|v| !v.is_empty())
    {
        return Some(Token {
            access_token: access_token.to_string(),
            refresh_token,
            scope: None,
            expires_at: jar
                .get(COOKIE_EXPIRES_AT)
                .and_then(|c| c.value().parse::<i64>().ok())
                .map(|ms| ms / 1000),
        });
    }

    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|v| !v.is_empty());

    match (bearer, refresh_token) {
        (Some(access_token), _) => Some(Token {
            access_token: access_token.to_string(),
            refresh_token: None,
            scope: None,
            expires_at: None,
        }),
        (None, Some(refresh_token)) => Some(Token {
            access_token: String::new(),
            refresh_token: Some(refresh_token),
            scope: None,
            expires_at: Some(0),
        }),
        (None, None) => None,
    }
}

fn session_cookie(name: &'static str, value: String, max_age_secs: i64) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

pub fn add_token_cookies(jar: CookieJar, token: &Token) -> CookieJar {
    let now = chrono::Utc::now().timestamp();
    let max_age = token.expires_at.map(|e| e - now).unwrap_or(3600).max(0);

    let mut jar = jar.add(session_cookie(
        COOKIE_ACCESS_TOKEN,
        token.access_token.clone(),
        max_age,
    ));
    if let Some(expires_at) = token.expires_at {
        jar = jar.add(session_cookie(
            COOKIE_EXPIRES_AT,
            (expires_at * 1000).to_string(),
            max_age,
        ));
    }
    if let Some(refresh_token) = &token.refresh_token {
        jar = jar.add(session_cookie(
            COOKIE_REFRESH_TOKEN,
            refresh_token.clone(),
            REFRESH_COOKIE_MAX_AGE_DAYS * 24 * 60 * 60,
        ));
    }
    jar
}

pub fn clear_token_cookies(jar: CookieJar) -> CookieJar {
    [COOKIE_ACCESS_TOKEN, COOKIE_REFRESH_TOKEN, COOKIE_EXPIRES_AT]
        .into_iter()
        .fold(jar, |jar, name| jar.remove(Cookie::build(name).path("/")))
}

impl FromRequestParts<AppState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = token_from_request(&parts.headers, &jar) else {
            debug!("No token in cookies nor headers.");
            return Err(ApiError::AuthRequired);
        };

        let mut manager = TokenManager::new(token);
        let access_token = manager.get_valid_token(&state.client).await?;

        Ok(Session {
            access_token,
            refreshed: manager
                .was_refreshed()
                .then(|| manager.current_token().clone()),
        })
    }
}
