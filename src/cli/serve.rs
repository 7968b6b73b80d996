use crate::{
    config, error, info,
    server::{self, AppState},
    spotify::SpotifyClient,
    warning,
};

pub async fn serve() {
    if config::spotify_client_id().is_none() {
        warning!("SPOTIFY_API_AUTH_CLIENT_ID is not set, expired sessions cannot be refreshed");
    }

    info!("Starting server on http://{}", config::server_addr());
    let state = AppState::new(SpotifyClient::from_env());
    if let Err(e) = server::start_api_server(state).await {
        error!("Server stopped. Err: {}", e);
    }
}
