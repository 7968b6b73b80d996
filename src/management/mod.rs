mod analysis;
mod auth;

pub use analysis::run_analysis;
pub use auth::EXPIRY_BUFFER_SECS;
pub use auth::TokenManager;
