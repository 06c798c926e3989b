//! User repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::is_unique_violation,
    error::{AppError, AppResult},
    models::User,
};

/// Repository for user database operations
pub struct UserRepository;

impl UserRepository {
    /// Find user by ID
    pub async fn find_by_id(pool: &PgPool, id: &Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by WakaTime account id
    pub async fn find_by_wakatime_id(pool: &PgPool, wakatime_id: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE wakatime_id = $1"#)
            .bind(wakatime_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find users by ID in one round trip
    pub async fn find_many(pool: &PgPool, ids: &[Uuid]) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = ANY($1)"#)
            .bind(ids)
            .fetch_all(pool)
            .await?;

        Ok(users)
    }

    /// Get the user for a WakaTime account, creating it with `token` when new.
    ///
    /// Returns the user and whether it was created. Concurrent first logins
    /// race on the unique index; the loser re-reads the winner's row.
    pub async fn get_or_create(pool: &PgPool, wakatime_id: &str, token: &str) -> AppResult<(User, bool)> {
        if let Some(user) = Self::find_by_wakatime_id(pool, wakatime_id).await? {
            return Ok((user, false));
        }

        let inserted = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (wakatime_id, wakatime_token)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(wakatime_id)
        .bind(token)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(user) => Ok((user, true)),
            Err(err) if is_unique_violation(&err) => {
                tracing::debug!(wakatime_id, "Lost user creation race, re-reading");
                Self::find_by_wakatime_id(pool, wakatime_id)
                    .await?
                    .map(|user| (user, false))
                    .ok_or_else(|| AppError::NotFound("User not found".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist every mutable column of `user`
    pub async fn save(pool: &PgPool, user: &User) -> AppResult<User> {
        let saved = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                wakatime_token = $2,
                email = $3,
                full_name = $4,
                username = $5,
                profile_url = $6,
                avatar_url = $7,
                modified_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.wakatime_token)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.username)
        .bind(&user.profile_url)
        .bind(&user.avatar_url)
        .bind(user.modified_at)
        .fetch_one(pool)
        .await?;

        Ok(saved)
    }
}
