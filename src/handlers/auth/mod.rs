//! Login, OAuth callback and logout

mod handler;
pub mod request;

pub use handler::*;
pub use request::*;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Authentication routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(handler::login))
        .route("/login/callback", get(handler::callback))
        .route("/logout", get(handler::logout))
}
