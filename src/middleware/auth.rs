//! Session middleware
//!
//! `session_middleware` resolves the session cookie once per request and
//! stores the user as a [`CurrentUser`] extension. Handlers take the user
//! explicitly through the [`CurrentUser`] or [`OptionalUser`] extractors.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{debug, warn};

use crate::{
    constants::cookies, error::AppError, models::User, services::AuthService, state::AppState,
    utils::login_path,
};

/// The signed-in user
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// The signed-in user, if any (never fails)
pub struct OptionalUser(pub Option<User>);

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalUser(
            parts.extensions.get::<CurrentUser>().map(|u| u.0.clone()),
        ))
    }
}

/// Resolve the session cookie to a user. Invalid or stale cookies, and
/// lookups that fail, leave the request anonymous.
pub async fn session_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = jar.get(cookies::SESSION) {
        let secret = &state.config().session.secret;
        match AuthService::session_user(state.db(), cookie.value(), secret).await {
            Ok(Some(user)) => {
                debug!(path = %request.uri().path(), user_id = %user.id, "Session resolved");
                request.extensions_mut().insert(CurrentUser(user));
            }
            Ok(None) => debug!(path = %request.uri().path(), "Session cookie names no user"),
            Err(e) => warn!(path = %request.uri().path(), error = %e, "Session lookup failed"),
        }
    }

    next.run(request).await
}

/// Send anonymous visitors to the login page, returning here afterwards
pub async fn require_login(request: Request<Body>, next: Next) -> Response {
    if request.extensions().get::<CurrentUser>().is_some() {
        return next.run(request).await;
    }

    let back = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());
    debug!(path = %back, "Login required");

    Redirect::to(&login_path(&back)).into_response()
}
