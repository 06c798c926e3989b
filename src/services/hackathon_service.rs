//! Hackathon service: creation, leaderboards and activity sync

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    db::repositories::{HackathonRepository, RankRepository},
    error::{AppError, AppResult},
    models::{
        record::{patch, Changes, PatchMode},
        wakatime::total_seconds,
        Hackathon, User,
    },
    state::AppState,
};

/// Columns an organizer may change after creation
const EDITABLE_FIELDS: &[&str] = &["name", "coding_starts_at", "coding_ends_at", "timezone"];

/// Hackathon service
pub struct HackathonService;

impl HackathonService {
    /// Create a hackathon owned by `admin_id`
    pub async fn create(
        pool: &PgPool,
        admin_id: &Uuid,
        name: &str,
        coding_starts_at: DateTime<Utc>,
        coding_ends_at: DateTime<Utc>,
        timezone: &str,
    ) -> AppResult<Hackathon> {
        let hackathon = Hackathon {
            admin_id: *admin_id,
            name: name.trim().to_string(),
            coding_starts_at,
            coding_ends_at,
            timezone: timezone.to_string(),
            ..Hackathon::default()
        };
        hackathon.check().map_err(AppError::Validation)?;

        let created = HackathonRepository::create(pool, &hackathon).await?;
        tracing::info!(hackathon_id = %created.id, name = %created.name, "Hackathon created");
        Ok(created)
    }

    pub async fn list(pool: &PgPool) -> AppResult<Vec<Hackathon>> {
        HackathonRepository::list_all(pool).await
    }

    /// Hackathons organized by `admin_id`
    pub async fn organized_by(pool: &PgPool, admin_id: &Uuid) -> AppResult<Vec<Hackathon>> {
        HackathonRepository::list_by_admin(pool, admin_id).await
    }

    /// Find a hackathon by name or fail with `NotFound`
    pub async fn get(pool: &PgPool, name: &str) -> AppResult<Hackathon> {
        HackathonRepository::find_by_name(pool, name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hackathon '{}' not found", name)))
    }

    /// A hackathon with its ranks loaded, best first
    pub async fn leaderboard(pool: &PgPool, name: &str) -> AppResult<Hackathon> {
        let hackathon = Self::get(pool, name).await?;
        Self::load_ranks(pool, hackathon).await
    }

    async fn load_ranks(pool: &PgPool, mut hackathon: Hackathon) -> AppResult<Hackathon> {
        hackathon.ranks = RankRepository::leaderboard(pool, &hackathon.id).await?;
        Ok(hackathon)
    }

    /// Sync `user`'s coding time inside the hackathon window and return the
    /// refreshed leaderboard. The stored total is overwritten, never added to.
    pub async fn join(state: &AppState, user: &User, name: &str) -> AppResult<Hackathon> {
        let pool = state.db();
        let hackathon = Self::get(pool, name).await?;

        let (start, end) = hackathon.local_date_range().ok_or_else(|| {
            AppError::Validation(format!("Invalid olson timezone: {}", hackathon.timezone))
        })?;

        let days = state
            .tracker()
            .summaries(&user.wakatime_token, &start, &end)
            .await
            .map_err(|e| AppError::Upstream(e.to_string()))?;
        let total = total_seconds(&days);

        let mut rank = RankRepository::get_or_create(pool, &user.id, &hackathon.id).await?;
        let mut input = Map::new();
        input.insert("total_seconds".to_string(), json!(total));
        let changes = patch(&mut rank, &input, PatchMode::Trusted)?;
        if !changes.is_empty() {
            RankRepository::save(pool, &rank).await?;
        }

        tracing::info!(
            hackathon_id = %hackathon.id,
            user_id = %user.id,
            total_seconds = total,
            days = days.len(),
            "Synced coding time"
        );

        Self::load_ranks(pool, hackathon).await
    }

    /// Apply an organizer's edits and persist them
    pub async fn update(
        pool: &PgPool,
        user: &User,
        name: &str,
        input: &Map<String, Value>,
    ) -> AppResult<(Hackathon, Changes)> {
        let mut hackathon = Self::get(pool, name).await?;
        let changes = apply_update(&mut hackathon, user, input)?;

        if !changes.is_empty() {
            hackathon = HackathonRepository::save(pool, &hackathon).await?;
            tracing::info!(hackathon_id = %hackathon.id, changed = changes.len(), "Hackathon updated");
        }

        Ok((hackathon, changes))
    }
}

/// Owner check, untrusted patch of the editable columns, then re-validation
fn apply_update(hackathon: &mut Hackathon, user: &User, input: &Map<String, Value>) -> AppResult<Changes> {
    if hackathon.admin_id != user.id {
        return Err(AppError::Forbidden(
            "Only the organizer can edit this hackathon".to_string(),
        ));
    }

    let editable: Map<String, Value> = input
        .iter()
        .filter(|(key, _)| EDITABLE_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let changes = patch(hackathon, &editable, PatchMode::Untrusted)?;
    hackathon.check().map_err(AppError::Validation)?;
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::repositories::UserRepository,
        models::{
            hackathon::sample_hackathon,
            user::sample_user,
            wakatime::{DailySummary, GrandTotal},
        },
        services::wakatime::{MockTimeTracker, UpstreamError},
        test_utils::{db_state, postgres},
    };

    fn owned(user: &User) -> Hackathon {
        let mut hackathon = sample_hackathon("Spring Jam");
        hackathon.admin_id = user.id;
        hackathon
    }

    fn days(totals: &[f64]) -> Vec<DailySummary> {
        totals
            .iter()
            .map(|&total_seconds| DailySummary {
                grand_total: GrandTotal { total_seconds },
            })
            .collect()
    }

    #[test]
    fn test_only_the_organizer_may_edit() {
        let owner = sample_user("1");
        let other = sample_user("2");
        let mut hackathon = owned(&owner);
        let input = json!({"name": "Hijacked"});

        let err = apply_update(&mut hackathon, &other, input.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert_eq!(hackathon.name, "Spring Jam");
    }

    #[test]
    fn test_edit_reports_changes_and_ignores_other_keys() {
        let owner = sample_user("1");
        let mut hackathon = owned(&owner);
        let input = json!({"name": "Summer Jam", "ranks": [], "csrf_token": "x", "admin_id": Uuid::new_v4()});

        let changes = apply_update(&mut hackathon, &owner, input.as_object().unwrap()).unwrap();
        assert_eq!(
            changes.to_value(),
            json!({"name": {"old": "Spring Jam", "new": "Summer Jam"}})
        );
        assert_eq!(hackathon.admin_id, owner.id);
    }

    #[test]
    fn test_edit_cannot_reverse_the_window() {
        let owner = sample_user("1");
        let mut hackathon = owned(&owner);
        let input = json!({"coding_ends_at": "2024-02-01T00:00:00Z"});

        let err = apply_update(&mut hackathon, &owner, input.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_edit_cannot_blank_or_overgrow_the_name() {
        let owner = sample_user("1");
        let mut hackathon = owned(&owner);
        let input = json!({"name": "   "});
        let err = apply_update(&mut hackathon, &owner, input.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let mut hackathon = owned(&owner);
        let input = json!({"name": "x".repeat(5000)});
        let err = apply_update(&mut hackathon, &owner, input.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_edit_rejects_unknown_timezone() {
        let owner = sample_user("1");
        let mut hackathon = owned(&owner);
        let input = json!({"timezone": "Nowhere/Special"});
        assert!(apply_update(&mut hackathon, &owner, input.as_object().unwrap()).is_err());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_joining_twice_overwrites_total() {
        let (_container, pool) = postgres().await;
        let (user, _) = UserRepository::get_or_create(&pool, "1", "tok").await.unwrap();
        HackathonService::create(
            &pool,
            &user.id,
            "Spring Jam",
            sample_hackathon("x").coding_starts_at,
            sample_hackathon("x").coding_ends_at,
            "America/New_York",
        )
        .await
        .unwrap();

        let mut tracker = MockTimeTracker::new();
        let mut rounds = vec![days(&[100.0, 250.0]), days(&[40.0])].into_iter();
        tracker
            .expect_summaries()
            .times(2)
            .returning(move |token, start, end| {
                assert_eq!(token, "tok");
                assert_eq!((start, end), ("02/29/2024", "03/02/2024"));
                Ok(rounds.next().unwrap_or_default())
            });
        let state = db_state(pool, tracker);

        let board = HackathonService::join(&state, &user, "Spring Jam").await.unwrap();
        assert_eq!(board.ranks.len(), 1);
        assert_eq!(board.ranks[0].total_seconds, 350);

        let board = HackathonService::join(&state, &user, "Spring Jam").await.unwrap();
        assert_eq!(board.ranks.len(), 1);
        assert_eq!(board.ranks[0].total_seconds, 40);
        assert!(board.ranks[0].user.is_some());
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_join_failures() {
        let (_container, pool) = postgres().await;
        let (user, _) = UserRepository::get_or_create(&pool, "1", "tok").await.unwrap();
        let hackathon = owned(&user);
        HackathonRepository::create(&pool, &hackathon).await.unwrap();

        let mut tracker = MockTimeTracker::new();
        tracker.expect_summaries().returning(|_, _, _| {
            Err(UpstreamError::Status {
                status: 401,
                body: String::new(),
            })
        });
        let state = db_state(pool, tracker);

        let err = HackathonService::join(&state, &user, "Spring Jam").await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        let err = HackathonService::join(&state, &user, "Nope").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    #[ignore = "requires Docker"]
    async fn test_update_persists_rename() {
        let (_container, pool) = postgres().await;
        let (user, _) = UserRepository::get_or_create(&pool, "1", "tok").await.unwrap();
        HackathonRepository::create(&pool, &owned(&user)).await.unwrap();

        let input = json!({"name": "Summer Jam"});
        let (saved, changes) = HackathonService::update(&pool, &user, "Spring Jam", input.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(saved.name, "Summer Jam");
        assert!(saved.modified_at.is_some());
        assert!(HackathonService::get(&pool, "Spring Jam").await.is_err());
    }
}
