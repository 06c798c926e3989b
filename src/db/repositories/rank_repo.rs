//! Rank repository

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use super::UserRepository;
use crate::{
    db::is_unique_violation,
    error::{AppError, AppResult},
    models::Rank,
};

/// Repository for leaderboard entries
pub struct RankRepository;

impl RankRepository {
    pub async fn find(pool: &PgPool, user_id: &Uuid, hackathon_id: &Uuid) -> AppResult<Option<Rank>> {
        let rank = sqlx::query_as::<_, Rank>(
            r#"SELECT * FROM ranks WHERE user_id = $1 AND hackathon_id = $2"#,
        )
        .bind(user_id)
        .bind(hackathon_id)
        .fetch_optional(pool)
        .await?;

        Ok(rank)
    }

    /// Get the rank of a user in a hackathon, creating an empty one if needed
    pub async fn get_or_create(pool: &PgPool, user_id: &Uuid, hackathon_id: &Uuid) -> AppResult<Rank> {
        if let Some(rank) = Self::find(pool, user_id, hackathon_id).await? {
            return Ok(rank);
        }

        let inserted = sqlx::query_as::<_, Rank>(
            r#"
            INSERT INTO ranks (user_id, hackathon_id)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(hackathon_id)
        .fetch_one(pool)
        .await;

        match inserted {
            Ok(rank) => Ok(rank),
            Err(err) if is_unique_violation(&err) => Self::find(pool, user_id, hackathon_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Rank not found".to_string())),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save(pool: &PgPool, rank: &Rank) -> AppResult<Rank> {
        let saved = sqlx::query_as::<_, Rank>(
            r#"
            UPDATE ranks
            SET total_seconds = $2, modified_at = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(rank.id)
        .bind(rank.total_seconds)
        .bind(rank.modified_at)
        .fetch_one(pool)
        .await?;

        Ok(saved)
    }

    /// Ranks of a hackathon, most coding time first, with participants loaded
    pub async fn leaderboard(pool: &PgPool, hackathon_id: &Uuid) -> AppResult<Vec<Rank>> {
        let mut ranks = sqlx::query_as::<_, Rank>(
            r#"
            SELECT * FROM ranks
            WHERE hackathon_id = $1
            ORDER BY total_seconds DESC, created_at
            "#,
        )
        .bind(hackathon_id)
        .fetch_all(pool)
        .await?;

        let ids: Vec<Uuid> = ranks.iter().map(|r| r.user_id).collect();
        let mut users: HashMap<Uuid, _> = UserRepository::find_many(pool, &ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        for rank in &mut ranks {
            rank.user = users.remove(&rank.user_id);
        }

        Ok(ranks)
    }
}
