//! Authentication handler implementations

use axum::{
    extract::{Query, State},
    http::{header::HOST, HeaderMap, HeaderValue},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use url::Url;

use crate::{
    config::Config,
    constants::{cookies, wakatime_paths, CSRF_COOKIE_DAYS, CSRF_TOKEN_LENGTH},
    error::{AppError, AppResult},
    services::{AuthService, OAuthService},
    state::AppState,
    utils::{generate_secure_token, is_safe_url, with_params},
};

use super::request::{CallbackQuery, LoginQuery};

/// Redirect to WakaTime's authorization page
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<LoginQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    let config = state.config();

    let (jar, csrf_token) = match jar.get(cookies::CSRF).map(|c| c.value().to_string()) {
        Some(token) if !token.is_empty() => (jar, token),
        _ => {
            let token = generate_secure_token(CSRF_TOKEN_LENGTH);
            let cookie = Cookie::build((cookies::CSRF, token.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax)
                .secure(config.session.cookie_secure)
                .max_age(time::Duration::days(CSRF_COOKIE_DAYS));
            (jar.add(cookie), token)
        }
    };

    let next = return_path(query.next);
    let state_blob = AuthService::issue_state(&csrf_token, &next, &config.session)?;

    let wakatime = &config.wakatime;
    let authorize = format!("{}{}", wakatime.base_url, wakatime_paths::AUTHORIZE);
    let url = with_params(
        &authorize,
        &[
            ("response_type", "code"),
            ("client_id", wakatime.client_id.as_str()),
            ("redirect_uri", wakatime.redirect_uri.as_str()),
            ("scope", wakatime.scope.as_str()),
            ("state", state_blob.as_str()),
        ],
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid authorize url: {}", e)))?;

    Ok((jar, Redirect::to(url.as_str())))
}

/// Finish the authorization-code flow and start a session
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    let config = state.config();

    let oauth_state = AuthService::verify_state(
        query.state.as_deref(),
        jar.get(cookies::CSRF).map(|c| c.value()),
        &config.session.secret,
    )?;

    if let Some(error) = query.error.as_deref() {
        tracing::error!(error, "WakaTime denied the authorization");
        return Err(AppError::InvalidInput(format!("Authorization failed: {}", error)));
    }
    let code = query
        .code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Missing authorization code".to_string()))?;

    let user = OAuthService::complete_login(&state, code).await?;

    let session = AuthService::issue_session(&user.id, &config.session)?;
    let cookie = Cookie::build((cookies::SESSION, session))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.session.cookie_secure)
        .max_age(time::Duration::hours(config.session.expiry_hours));

    let target = match request_base(&headers, config) {
        Some(base) if is_redirectable(&oauth_state.n) && is_safe_url(&base, &oauth_state.n) => {
            oauth_state.n
        }
        _ => {
            tracing::warn!(next = %oauth_state.n, "Refusing unsafe post-login redirect");
            "/".to_string()
        }
    };

    Ok((jar.add(cookie), Redirect::to(&target)))
}

/// End the session
pub async fn logout(jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(Cookie::build(cookies::SESSION).path("/"));
    (jar, Redirect::to("/"))
}

/// Post-login return path; anything that cannot go into a `Location` header becomes `/`
fn return_path(next: Option<String>) -> String {
    next.filter(|n| is_redirectable(n)).unwrap_or_else(|| "/".to_string())
}

fn is_redirectable(path: &str) -> bool {
    !path.is_empty() && !path.chars().any(char::is_control) && HeaderValue::from_str(path).is_ok()
}

/// Scheme and host the current request was addressed to
fn request_base(headers: &HeaderMap, config: &Config) -> Option<Url> {
    let mut base = Url::parse(&config.server.public_url).ok()?;
    if let Some(host) = headers.get(HOST).and_then(|h| h.to_str().ok()) {
        base = Url::parse(&format!("{}://{}/", base.scheme(), host)).ok()?;
    }
    Some(base)
}
