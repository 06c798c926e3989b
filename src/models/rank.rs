//! Rank model (one leaderboard entry)

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    record::{datetime_value, decode, optional_datetime_value, Field, PatchError, Record, Schema},
    user::User,
};
use crate::utils::time::format_coding_time;

/// Coding time of one user inside one hackathon's window
#[derive(Debug, Clone, FromRow)]
pub struct Rank {
    pub id: Uuid,
    pub user_id: Uuid,
    pub hackathon_id: Uuid,
    pub total_seconds: i64,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Participant (loaded on demand)
    #[sqlx(skip)]
    pub user: Option<User>,
}

static RANK_SCHEMA: Schema = Schema {
    entity: "rank",
    fields: &[
        Field::column("id"),
        Field::column("user_id").read_only(),
        Field::column("hackathon_id").read_only(),
        Field::column("total_seconds").shown(),
        Field::computed("coding_time").shown(),
        Field::computed("full_name").shown(),
        Field::computed("username").shown(),
        Field::computed("profile_url").shown(),
        Field::computed("avatar_url").shown(),
        Field::column("created_at"),
        Field::column("modified_at"),
        Field::child("user"),
    ],
};

impl Default for Rank {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            hackathon_id: Uuid::nil(),
            total_seconds: 0,
            created_at: Utc::now(),
            modified_at: None,
            user: None,
        }
    }
}

impl Rank {
    fn user_field(&self, read: impl Fn(&User) -> Option<String>) -> Value {
        json!(self.user.as_ref().and_then(read))
    }
}

impl Record for Rank {
    fn schema(&self) -> &'static Schema {
        &RANK_SCHEMA
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: &str) -> Option<Value> {
        Some(match field {
            "id" => json!(self.id),
            "user_id" => json!(self.user_id),
            "hackathon_id" => json!(self.hackathon_id),
            "total_seconds" => json!(self.total_seconds),
            "coding_time" => json!(format_coding_time(self.total_seconds)),
            "full_name" => self.user_field(|u| u.full_name.clone()),
            "username" => self.user_field(|u| u.username.clone()),
            "profile_url" => self.user_field(|u| u.profile_url.clone()),
            "avatar_url" => self.user_field(|u| u.avatar_url.clone()),
            "created_at" => datetime_value(&self.created_at),
            "modified_at" => optional_datetime_value(&self.modified_at),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), PatchError> {
        match field {
            "user_id" => self.user_id = decode(field, value)?,
            "hackathon_id" => self.hackathon_id = decode(field, value)?,
            "total_seconds" => {
                let seconds: i64 = decode(field, value)?;
                if seconds < 0 {
                    return Err(PatchError::invalid(field, "must not be negative"));
                }
                self.total_seconds = seconds;
            }
            _ => return Err(PatchError::NotWritable(field.to_string())),
        }
        Ok(())
    }

    fn child(&self, field: &str) -> Option<&dyn Record> {
        match field {
            "user" => self.user.as_ref().map(|u| u as &dyn Record),
            _ => None,
        }
    }

    fn child_mut(&mut self, field: &str) -> Option<&mut dyn Record> {
        match field {
            "user" => self.user.as_mut().map(|u| u as &mut dyn Record),
            _ => None,
        }
    }

    fn adopt(&mut self, parent: &str, parent_id: Uuid) {
        match parent {
            "hackathon" => self.hackathon_id = parent_id,
            "user" => self.user_id = parent_id,
            _ => {}
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.modified_at = Some(now);
    }
}
