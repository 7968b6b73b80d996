use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failures while talking to the Spotify Web API.
#[derive(Error, Debug)]
pub enum SpotifyError {
    #[error("Request to Spotify failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Spotify rejected the access token")]
    Unauthorized,

    #[error("Spotify responded with status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Access token expired and no refresh token is available")]
    SessionExpired,
}

impl SpotifyError {
    /// Whether the user has to authenticate again to recover.
    pub fn is_auth(&self) -> bool {
        matches!(self, SpotifyError::Unauthorized | SpotifyError::SessionExpired)
    }
}

/// Errors surfaced by the HTTP endpoints.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not authenticated")]
    AuthRequired,

    #[error("{0}")]
    MalformedInput(String),

    #[error("Upstream request failed")]
    UpstreamFetchFailure(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::AuthRequired => StatusCode::UNAUTHORIZED,
            ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::UpstreamFetchFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SpotifyError> for ApiError {
    fn from(err: SpotifyError) -> Self {
        if err.is_auth() {
            ApiError::AuthRequired
        } else {
            ApiError::UpstreamFetchFailure(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.to_string(),
            message: match self {
                ApiError::UpstreamFetchFailure(message) => Some(message),
                _ => None,
            },
        };

        (status, Json(body)).into_response()
    }
}
