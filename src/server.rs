use axum::{
    Router,
    routing::{get, post},
};
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tracing::info;

use crate::{Res, api, config, spotify::SpotifyClient};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<SpotifyClient>,
}

impl AppState {
    pub fn new(client: SpotifyClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/api/analysis", post(api::analysis))
        .route("/api/playlist/{id}", get(api::playlist))
        .route(
            "/api/dashboard/playlists",
            get(api::list_playlists).post(api::search_playlists),
        )
        .route("/api/user", get(api::user))
        .route("/api/auth/check", get(api::auth_check))
        .route("/api/auth/user", get(api::auth_user).delete(api::logout))
        .route("/api/auth/logout", post(api::logout))
        .with_state(state)
}

pub async fn start_api_server(state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(&config::server_addr())?;
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}
