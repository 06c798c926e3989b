//! Hackathon pages, joining and editing

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{middleware, routing::get, Router};

use crate::{middleware::require_login, state::AppState};

/// Hackathon routes
pub fn routes() -> Router<AppState> {
    let members = Router::new()
        .route("/hackathon/{name}/join", get(handler::join))
        .route("/new/hackathon", get(handler::new_form).post(handler::create))
        .route_layer(middleware::from_fn(require_login));

    Router::new()
        .route("/", get(handler::index))
        .route("/hackathon/{name}", get(handler::show).patch(handler::update))
        .merge(members)
}
