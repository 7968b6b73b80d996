//! Spotify Playlist Analyzer Library
//!
//! This library provides functionality for analyzing Spotify playlists. It
//! fetches playlists and their tracks through the Spotify Web API and
//! aggregates them into statistics: genre mix, top artists, release years and
//! popularity buckets. The same analysis is exposed through an HTTP service
//! and a command-line interface.
//!
//! # Modules
//!
//! - `analysis` - Pure aggregation over fetched tracks
//! - `api` - HTTP API endpoints of the web service
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration management and environment variables
//! - `error` - Error types for upstream calls and HTTP responses
//! - `management` - Token handling and analysis orchestration
//! - `server` - HTTP server and routing
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Utility functions and helpers
//!
//! # Example
//!
//! ```
//! use splyzer::{config, server};
//!
//! #[tokio::main]
//! async fn main() -> splyzer::Res<()> {
//!     config::load_env().await?;
//!     let state = server::AppState::new(splyzer::spotify::SpotifyClient::from_env());
//!     server::start_api_server(state).await
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod types;
pub mod utils;

/// Boxed-error result for glue code such as server startup.
///
/// Spotify calls and HTTP handlers use the typed errors in [`error`]
/// instead; this alias is for places where any failure just gets reported.
pub type Res<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Prints an informational line prefixed with a blue `o`.
///
/// Accepts the same arguments as `println!`.
///
/// ```
/// info!("Fetching {} playlists...", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success line prefixed with a green checkmark.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error line prefixed with a red `!` and exits with status 1.
///
/// Only meant for the CLI, where an error leaves nothing useful to do.
/// Server code returns errors instead.
///
/// ```
/// error!("No access token available: {}", err);
/// // unreachable
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning line prefixed with a yellow `!`.
///
/// ```
/// warning!("Skipped {} unavailable tracks", skipped);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
