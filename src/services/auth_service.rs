//! Session tokens and the signed OAuth state blob

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    config::SessionConfig,
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::User,
    utils::constant_time_eq,
};

/// Session cookie claims
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub exp: i64,
    pub iat: i64,
}

/// OAuth `state` round-tripped through WakaTime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthState {
    /// Anti-forgery token, must match the csrftoken cookie
    pub c: String,
    /// Where to go after login
    pub n: String,
    pub exp: i64,
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Sign a session token for `user_id`
    pub fn issue_session(user_id: &Uuid, config: &SessionConfig) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::hours(config.expiry_hours)).timestamp(),
            iat: now.timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))
    }

    /// Verify a session token and return the user id it names
    pub fn verify_session(token: &str, secret: &str) -> AppResult<Uuid> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Uuid::parse_str(&token_data.claims.sub).map_err(|_| AppError::InvalidToken)
    }

    /// Resolve a session token to its user, `None` for stale or foreign tokens
    pub async fn session_user(pool: &PgPool, token: &str, secret: &str) -> AppResult<Option<User>> {
        let user_id = match Self::verify_session(token, secret) {
            Ok(id) => id,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid session cookie");
                return Ok(None);
            }
        };

        UserRepository::find_by_id(pool, &user_id).await
    }

    /// Sign the `state` parameter for an authorization redirect
    pub fn issue_state(csrf_token: &str, next: &str, config: &SessionConfig) -> AppResult<String> {
        let state = OAuthState {
            c: csrf_token.to_string(),
            n: next.to_string(),
            exp: (Utc::now() + Duration::minutes(config.state_expiry_minutes)).timestamp(),
        };

        encode(
            &Header::default(),
            &state,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("State signing failed: {}", e)))
    }

    /// Verify the `state` returned to the callback against the csrftoken cookie.
    /// Every failure is `Forbidden`.
    pub fn verify_state(state: Option<&str>, cookie: Option<&str>, secret: &str) -> AppResult<OAuthState> {
        let forbidden = |reason: &str| {
            tracing::error!(reason, "Rejected OAuth state");
            AppError::Forbidden("Invalid login state".to_string())
        };

        let state = state.filter(|s| !s.is_empty()).ok_or_else(|| forbidden("missing state"))?;
        let cookie = cookie.filter(|c| !c.is_empty()).ok_or_else(|| forbidden("missing csrf cookie"))?;

        let decoded = decode::<OAuthState>(
            state,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| forbidden("bad signature or expired"))?;

        if !constant_time_eq(&decoded.claims.c, cookie) {
            return Err(forbidden("csrf mismatch"));
        }

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{test_config, TEST_SECRET};

    #[test]
    fn test_session_round_trip() {
        let config = test_config().session;
        let user_id = Uuid::new_v4();
        let token = AuthService::issue_session(&user_id, &config).unwrap();
        assert_eq!(AuthService::verify_session(&token, TEST_SECRET).unwrap(), user_id);
        assert!(AuthService::verify_session(&token, "another-secret").is_err());
    }

    #[test]
    fn test_state_accepts_matching_cookie() {
        let config = test_config().session;
        let blob = AuthService::issue_state("abc123", "/hackathon/Jam", &config).unwrap();
        let state = AuthService::verify_state(Some(&blob), Some("abc123"), TEST_SECRET).unwrap();
        assert_eq!(state.n, "/hackathon/Jam");
    }

    #[test]
    fn test_state_rejects_csrf_mismatch_and_missing_cookie() {
        let config = test_config().session;
        let blob = AuthService::issue_state("abc123", "/", &config).unwrap();

        let err = AuthService::verify_state(Some(&blob), Some("zzz999"), TEST_SECRET).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        let err = AuthService::verify_state(Some(&blob), None, TEST_SECRET).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn test_state_rejects_tampering_and_expiry() {
        let mut config = test_config().session;
        let blob = AuthService::issue_state("abc123", "/", &config).unwrap();
        assert!(AuthService::verify_state(Some(&blob), Some("abc123"), "other").is_err());
        assert!(AuthService::verify_state(Some("{\"c\":\"abc123\"}"), Some("abc123"), TEST_SECRET).is_err());

        config.state_expiry_minutes = -5;
        let stale = AuthService::issue_state("abc123", "/", &config).unwrap();
        assert!(AuthService::verify_state(Some(&stale), Some("abc123"), TEST_SECRET).is_err());
    }

    #[test]
    fn test_session_token_is_not_a_state() {
        let config = test_config().session;
        let token = AuthService::issue_session(&Uuid::new_v4(), &config).unwrap();
        assert!(AuthService::verify_state(Some(&token), Some("abc123"), TEST_SECRET).is_err());
    }
}
