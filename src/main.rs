use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use splyzer::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Start the HTTP service
    Serve,

    /// Analyze one or more playlists
    Analyze(AnalyzeOptions),

    /// List your playlists
    Playlists(PlaylistsOptions),

    /// Store a Spotify access token for CLI use
    Token(TokenOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct AnalyzeOptions {
    /// Playlist IDs, URIs or open.spotify.com links
    #[clap(required = true, num_args = 1..)]
    pub playlists: Vec<String>,

    /// Print the raw analysis as JSON
    #[clap(long)]
    pub json: bool,

    /// Number of top tracks to include
    #[clap(long)]
    pub top: Option<usize>,

    /// Skip the artist genre lookup
    #[clap(long)]
    pub no_genres: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct PlaylistsOptions {
    /// Filter by name, description or owner
    #[clap(long)]
    pub search: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct TokenOptions {
    #[clap(long)]
    pub access_token: String,

    #[clap(long)]
    pub refresh_token: Option<String>,

    /// Lifetime of the access token in seconds
    #[clap(long)]
    pub expires_in: Option<i64>,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    // the service logs requests; CLI commands only surface warnings
    match cli.command {
        Command::Serve => init_tracing("info"),
        _ => init_tracing("warn"),
    }

    match cli.command {
        Command::Serve => cli::serve().await,
        Command::Analyze(opt) => {
            cli::analyze(opt.playlists, opt.json, opt.top, opt.no_genres).await
        }
        Command::Playlists(opt) => cli::list_playlists(opt.search).await,
        Command::Token(opt) => {
            cli::store_token(opt.access_token, opt.refresh_token, opt.expires_in).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
