//! # CLI Module
//!
//! Command-line front end for splyzer. The commands reuse the same Spotify
//! gateway and aggregation code as the web service, but print colored
//! messages and tables instead of answering JSON.
//!
//! ## Commands
//!
//! - [`serve`] - Starts the HTTP service
//! - [`analyze`] - Analyzes one or more playlists and prints a report
//! - [`list_playlists`] - Lists the current user's playlists, optionally filtered
//! - [`store_token`] - Stores an access token for later CLI runs
//!
//! ## Tokens
//!
//! The CLI does not run an OAuth flow. It uses the token saved by
//! `splyzer token` or, when none is stored, the `SPOTIFY_ACCESS_TOKEN`
//! environment variable. A stored token that is about to expire is refreshed
//! before the first request and written back to disk.
//!
//! ## Usage
//!
//! ```bash
//! splyzer token --access-token <TOKEN> --refresh-token <REFRESH> --expires-in 3600
//! splyzer playlists --search chill
//! splyzer analyze 37i9dQZF1DXcBWIGoYBM5M https://open.spotify.com/playlist/37i9dQZF1DX0XUsuxWHRQd
//! splyzer analyze 37i9dQZF1DXcBWIGoYBM5M --json --no-genres
//! splyzer serve
//! ```

mod analyze;
mod playlists;
mod serve;
mod token;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use analyze::analyze;
pub use playlists::list_playlists;
pub use serve::serve;
pub use token::store_token;

fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.into());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
