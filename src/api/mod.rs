//! # API Module
//!
//! HTTP endpoints of the splyzer web service. Every endpoint answers JSON and
//! forwards the caller's Spotify token to the Web API; none of them keep
//! state between requests.
//!
//! ## Endpoints
//!
//! ### Analysis
//!
//! - [`analysis`] - `POST /api/analysis`, fetches the selected playlists and
//!   returns the aggregated statistics
//!
//! ### Playlists
//!
//! - [`playlist`] - `GET /api/playlist/{id}`, one playlist with all tracks
//! - [`list_playlists`] - `GET /api/dashboard/playlists`, a page of the
//!   user's playlists
//! - [`search_playlists`] - `POST /api/dashboard/playlists`, the user's
//!   playlists filtered by a search query
//!
//! ### Session and User
//!
//! - [`auth_check`] - `GET /api/auth/check`
//! - [`auth_user`] - `GET /api/auth/user`
//! - [`logout`] - `POST /api/auth/logout` and `DELETE /api/auth/user`
//! - [`user`] - `GET /api/user`
//!
//! ### Monitoring
//!
//! - [`health`] - `GET /health`
//!
//! ## Sessions
//!
//! Handlers that need Spotify access take a [`Session`] extractor. It reads
//! the token from the `spotify_access_token` cookie family or from an
//! `Authorization: Bearer` header and refreshes it before the handler runs.
//! A missing or unusable token rejects the request with `401`.
//!
//! ## Errors
//!
//! Failures are answered as `{ "error": .., "message": .. }` with:
//! - `401` when no valid session exists or Spotify rejects the token
//! - `400` when the request body or playlist IDs are invalid
//! - `500` when the upstream request fails

mod analysis;
mod auth;
mod health;
mod playlists;
pub mod session;
mod user;

pub use analysis::AnalysisRequest;
pub use analysis::analysis;
pub use analysis::playlist_ids_from_request;
pub use auth::AuthCheckResponse;
pub use auth::AuthUserResponse;
pub use auth::check as auth_check;
pub use auth::logout;
pub use auth::user as auth_user;
pub use health::health;
pub use playlists::PlaylistsResponse;
pub use playlists::list_playlists;
pub use playlists::playlist;
pub use playlists::search_playlists;
pub use session::Session;
pub use user::UserSummary;
pub use user::user;
