//! User model

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    hackathon::Hackathon,
    record::{datetime_value, decode, optional_datetime_value, Field, PatchError, Record, RecordSet, Schema},
};

/// User database model
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub wakatime_id: String,
    pub wakatime_token: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub profile_url: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Hackathons this user organizes (loaded on demand)
    #[sqlx(skip)]
    pub hackathons: Vec<Hackathon>,
}

static USER_SCHEMA: Schema = Schema {
    entity: "user",
    fields: &[
        Field::column("id"),
        Field::column("wakatime_id").read_only().hidden(),
        Field::column("wakatime_token").hidden(),
        Field::column("email").hidden(),
        Field::column("full_name").shown(),
        Field::column("username").shown(),
        Field::column("profile_url").shown(),
        Field::column("avatar_url").shown(),
        Field::column("created_at"),
        Field::column("modified_at"),
        Field::children("hackathons"),
    ],
};

impl Record for User {
    fn schema(&self) -> &'static Schema {
        &USER_SCHEMA
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: &str) -> Option<Value> {
        Some(match field {
            "id" => json!(self.id),
            "wakatime_id" => json!(self.wakatime_id),
            "wakatime_token" => json!(self.wakatime_token),
            "email" => json!(self.email),
            "full_name" => json!(self.full_name),
            "username" => json!(self.username),
            "profile_url" => json!(self.profile_url),
            "avatar_url" => json!(self.avatar_url),
            "created_at" => datetime_value(&self.created_at),
            "modified_at" => optional_datetime_value(&self.modified_at),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), PatchError> {
        match field {
            "wakatime_id" => self.wakatime_id = decode(field, value)?,
            "wakatime_token" => self.wakatime_token = decode(field, value)?,
            "email" => self.email = decode(field, value)?,
            "full_name" => self.full_name = decode(field, value)?,
            "username" => self.username = decode(field, value)?,
            "profile_url" => self.profile_url = decode(field, value)?,
            "avatar_url" => self.avatar_url = decode(field, value)?,
            _ => return Err(PatchError::NotWritable(field.to_string())),
        }
        Ok(())
    }

    fn children(&self, field: &str) -> Option<&dyn RecordSet> {
        match field {
            "hackathons" => Some(&self.hackathons),
            _ => None,
        }
    }

    fn children_mut(&mut self, field: &str) -> Option<&mut dyn RecordSet> {
        match field {
            "hackathons" => Some(&mut self.hackathons),
            _ => None,
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.modified_at = Some(now);
    }
}

#[cfg(test)]
pub(crate) fn sample_user(wakatime_id: &str) -> User {
    User {
        id: Uuid::new_v4(),
        wakatime_id: wakatime_id.to_string(),
        wakatime_token: "sec_token".to_string(),
        email: None,
        full_name: Some("Ada Lovelace".to_string()),
        username: Some("ada".to_string()),
        profile_url: Some("https://wakatime.com/@ada".to_string()),
        avatar_url: None,
        created_at: Utc::now(),
        modified_at: None,
        hackathons: Vec::new(),
    }
}
