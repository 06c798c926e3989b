//! Hackathon repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::{error::AppResult, models::Hackathon};

/// Repository for hackathon database operations
pub struct HackathonRepository;

impl HackathonRepository {
    /// Insert a new hackathon. A taken name surfaces as `AppError::AlreadyExists`.
    pub async fn create(pool: &PgPool, hackathon: &Hackathon) -> AppResult<Hackathon> {
        let created = sqlx::query_as::<_, Hackathon>(
            r#"
            INSERT INTO hackathons (id, admin_id, name, coding_starts_at, coding_ends_at, timezone)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(hackathon.id)
        .bind(hackathon.admin_id)
        .bind(&hackathon.name)
        .bind(hackathon.coding_starts_at)
        .bind(hackathon.coding_ends_at)
        .bind(&hackathon.timezone)
        .fetch_one(pool)
        .await?;

        Ok(created)
    }

    /// Find hackathon by its (unique) name
    pub async fn find_by_name(pool: &PgPool, name: &str) -> AppResult<Option<Hackathon>> {
        let hackathon = sqlx::query_as::<_, Hackathon>(r#"SELECT * FROM hackathons WHERE name = $1"#)
            .bind(name)
            .fetch_optional(pool)
            .await?;

        Ok(hackathon)
    }

    /// All hackathons, most recent window first
    pub async fn list_all(pool: &PgPool) -> AppResult<Vec<Hackathon>> {
        let hackathons = sqlx::query_as::<_, Hackathon>(
            r#"SELECT * FROM hackathons ORDER BY coding_starts_at DESC, name"#,
        )
        .fetch_all(pool)
        .await?;

        Ok(hackathons)
    }

    /// Hackathons organized by one user
    pub async fn list_by_admin(pool: &PgPool, admin_id: &Uuid) -> AppResult<Vec<Hackathon>> {
        let hackathons = sqlx::query_as::<_, Hackathon>(
            r#"SELECT * FROM hackathons WHERE admin_id = $1 ORDER BY coding_starts_at DESC"#,
        )
        .bind(admin_id)
        .fetch_all(pool)
        .await?;

        Ok(hackathons)
    }

    /// Persist the editable columns of `hackathon`
    pub async fn save(pool: &PgPool, hackathon: &Hackathon) -> AppResult<Hackathon> {
        let saved = sqlx::query_as::<_, Hackathon>(
            r#"
            UPDATE hackathons
            SET
                name = $2,
                coding_starts_at = $3,
                coding_ends_at = $4,
                timezone = $5,
                modified_at = $6
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(hackathon.id)
        .bind(&hackathon.name)
        .bind(hackathon.coding_starts_at)
        .bind(hackathon.coding_ends_at)
        .bind(&hackathon.timezone)
        .bind(hackathon.modified_at)
        .fetch_one(pool)
        .await?;

        Ok(saved)
    }
}
