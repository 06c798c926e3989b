//! Completing a WakaTime login

use crate::{
    db::repositories::UserRepository,
    error::{AppError, AppResult},
    models::{
        record::{patch, PatchMode},
        User,
    },
    state::AppState,
};

/// OAuth service
pub struct OAuthService;

impl OAuthService {
    /// Exchange `code` for a token, fetch the profile, and upsert the user.
    ///
    /// The profile is applied as a trusted patch so the stored token and
    /// read-only identity fields can be refreshed.
    pub async fn complete_login(state: &AppState, code: &str) -> AppResult<User> {
        let tracker = state.tracker();

        let token = tracker
            .exchange_code(code)
            .await
            .map_err(|e| AppError::TokenExchange(e.to_string()))?;
        tracing::debug!(scope = ?token.scope, "Exchanged authorization code");

        let profile = tracker
            .current_user(&token.access_token)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;

        let pool = state.db();
        let (mut user, created) =
            UserRepository::get_or_create(pool, &profile.id, &token.access_token).await?;

        let fields = profile.user_fields(&token.access_token, &state.config().wakatime.base_url);
        let changes = match fields.as_object() {
            Some(fields) => patch(&mut user, fields, PatchMode::Trusted)?,
            None => return Err(AppError::Internal(anyhow::anyhow!("profile fields are not an object"))),
        };

        if !changes.is_empty() {
            user = UserRepository::save(pool, &user).await?;
        }

        tracing::info!(
            user_id = %user.id,
            wakatime_id = %user.wakatime_id,
            created,
            changed = changes.len(),
            "User logged in"
        );

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::wakatime::{AccessToken, Profile},
        services::wakatime::{MockTimeTracker, UpstreamError},
        test_utils::{db_state, lazy_state, postgres},
    };

    fn access_token(token: &str) -> AccessToken {
        AccessToken {
            access_token: token.to_string(),
            scope: Some("email,read_logged_time".to_string()),
            refresh_token: None,
        }
    }

    fn profile(username: &str) -> Profile {
        Profile {
            id: "wk-42".to_string(),
            email: Some("ada@example.com".to_string()),
            photo: Some("https://wakatime.example/photo/wk-42".to_string()),
            full_name: Some("Ada Lovelace".to_string()),
            username: Some(username.to_string()),
        }
    }

    #[tokio::test]
    async fn test_failed_exchange_is_a_token_exchange_error() {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_exchange_code().returning(|_| {
            Err(UpstreamError::Status {
                status: 401,
                body: "invalid_grant".to_string(),
            })
        });
        tracker.expect_current_user().never();

        let err = OAuthService::complete_login(&lazy_state(tracker), "bad").await.unwrap_err();
        assert!(matches!(err, AppError::TokenExchange(_)));
    }

    #[tokio::test]
    async fn test_failed_profile_is_an_upstream_error() {
        let mut tracker = MockTimeTracker::new();
        tracker.expect_exchange_code().returning(|_| Ok(access_token("tok")));
        tracker.expect_current_user().returning(|_| {
            Err(UpstreamError::Status {
                status: 500,
                body: String::new(),
            })
        });

        let err = OAuthService::complete_login(&lazy_state(tracker), "code").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_repeated_logins_refresh_one_user() {
        let (_container, pool) = postgres().await;

        let mut tracker = MockTimeTracker::new();
        let mut round = 0;
        tracker.expect_exchange_code().times(2).returning(move |_| {
            round += 1;
            Ok(access_token(&format!("tok-{}", round)))
        });
        let mut handles = vec!["ada", "ada_l"].into_iter();
        tracker
            .expect_current_user()
            .times(2)
            .returning(move |_| Ok(profile(handles.next().unwrap_or("ada"))));
        let state = db_state(pool.clone(), tracker);

        let first = OAuthService::complete_login(&state, "code-1").await.unwrap();
        let second = OAuthService::complete_login(&state, "code-2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.wakatime_token, "tok-2");
        assert_eq!(second.username.as_deref(), Some("ada_l"));
        assert_eq!(second.profile_url.as_deref(), Some("https://wakatime.example/@ada_l"));
        assert!(second.modified_at.is_some());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
