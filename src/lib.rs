//! HackathonRank - coding-time leaderboards for hackathons
//!
//! Participants sign in with WakaTime; joining a hackathon sums the coding
//! time they logged inside its window and ranks them against each other.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic and the WakaTime client
//! - **Repositories**: Database access
//! - **Models**: Domain records and the generic patch/serialize layer

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_utils;

use axum::{middleware as axum_middleware, Router};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build the application router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::routes())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state)
}
