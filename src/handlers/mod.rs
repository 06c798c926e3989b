//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.

pub mod auth;
pub mod hackathons;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Create all routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(hackathons::routes())
}
