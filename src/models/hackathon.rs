//! Hackathon model

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::{json, Value};
use sqlx::FromRow;
use uuid::Uuid;

use super::{
    rank::Rank,
    record::{datetime_value, decode, optional_datetime_value, Field, PatchError, Record, RecordSet, Schema},
};
use crate::constants::{
    DEFAULT_TIMEZONE, MAX_HACKATHON_NAME_LENGTH, MIN_HACKATHON_NAME_LENGTH, SUMMARY_DATE_FORMAT,
};

/// Hackathon database model
#[derive(Debug, Clone, FromRow)]
pub struct Hackathon {
    pub id: Uuid,
    pub admin_id: Uuid,
    pub name: String,
    pub coding_starts_at: DateTime<Utc>,
    pub coding_ends_at: DateTime<Utc>,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    /// Leaderboard entries (loaded on demand)
    #[sqlx(skip)]
    pub ranks: Vec<Rank>,
}

static HACKATHON_SCHEMA: Schema = Schema {
    entity: "hackathon",
    fields: &[
        Field::column("id"),
        Field::column("admin_id").read_only(),
        Field::column("name").shown(),
        Field::column("coding_starts_at").shown(),
        Field::column("coding_ends_at").shown(),
        Field::column("timezone").shown(),
        Field::column("created_at"),
        Field::column("modified_at"),
        Field::children("ranks"),
    ],
};

impl Default for Hackathon {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            admin_id: Uuid::nil(),
            name: String::new(),
            coding_starts_at: now,
            coding_ends_at: now,
            timezone: DEFAULT_TIMEZONE.to_string(),
            created_at: now,
            modified_at: None,
            ranks: Vec::new(),
        }
    }
}

impl Hackathon {
    /// Parsed IANA timezone
    pub fn tz(&self) -> Option<Tz> {
        self.timezone.parse().ok()
    }

    /// Check the invariants a stored hackathon must satisfy
    pub fn check(&self) -> Result<(), String> {
        let name_length = self.name.trim().chars().count() as u64;
        if !(MIN_HACKATHON_NAME_LENGTH..=MAX_HACKATHON_NAME_LENGTH).contains(&name_length) {
            return Err(format!(
                "Name must be between {} and {} characters long",
                MIN_HACKATHON_NAME_LENGTH, MAX_HACKATHON_NAME_LENGTH
            ));
        }
        if self.tz().is_none() {
            return Err(format!("Invalid olson timezone: {}", self.timezone));
        }
        if self.coding_ends_at <= self.coding_starts_at {
            return Err("Coding must end after it starts".to_string());
        }
        Ok(())
    }

    /// The coding window as calendar dates in the hackathon's own timezone
    pub fn local_date_range(&self) -> Option<(String, String)> {
        let tz = self.tz()?;
        let start = self.coding_starts_at.with_timezone(&tz);
        let end = self.coding_ends_at.with_timezone(&tz);
        Some((
            start.format(SUMMARY_DATE_FORMAT).to_string(),
            end.format(SUMMARY_DATE_FORMAT).to_string(),
        ))
    }

    /// Whether coding is open right now
    pub fn is_running(&self) -> bool {
        let now = Utc::now();
        now >= self.coding_starts_at && now < self.coding_ends_at
    }
}

impl Record for Hackathon {
    fn schema(&self) -> &'static Schema {
        &HACKATHON_SCHEMA
    }

    fn id(&self) -> Uuid {
        self.id
    }

    fn get(&self, field: &str) -> Option<Value> {
        Some(match field {
            "id" => json!(self.id),
            "admin_id" => json!(self.admin_id),
            "name" => json!(self.name),
            "coding_starts_at" => datetime_value(&self.coding_starts_at),
            "coding_ends_at" => datetime_value(&self.coding_ends_at),
            "timezone" => json!(self.timezone),
            "created_at" => datetime_value(&self.created_at),
            "modified_at" => optional_datetime_value(&self.modified_at),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: Value) -> Result<(), PatchError> {
        match field {
            "admin_id" => self.admin_id = decode(field, value)?,
            "name" => {
                let name: String = decode(field, value)?;
                self.name = name.trim().to_string();
            }
            "coding_starts_at" => self.coding_starts_at = decode(field, value)?,
            "coding_ends_at" => self.coding_ends_at = decode(field, value)?,
            "timezone" => self.timezone = decode(field, value)?,
            _ => return Err(PatchError::NotWritable(field.to_string())),
        }
        Ok(())
    }

    fn children(&self, field: &str) -> Option<&dyn RecordSet> {
        match field {
            "ranks" => Some(&self.ranks),
            _ => None,
        }
    }

    fn children_mut(&mut self, field: &str) -> Option<&mut dyn RecordSet> {
        match field {
            "ranks" => Some(&mut self.ranks),
            _ => None,
        }
    }

    fn adopt(&mut self, parent: &str, parent_id: Uuid) {
        if parent == "user" {
            self.admin_id = parent_id;
        }
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.modified_at = Some(now);
    }
}

#[cfg(test)]
pub(crate) fn sample_hackathon(name: &str) -> Hackathon {
    use chrono::TimeZone;

    Hackathon {
        name: name.to_string(),
        coding_starts_at: Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap(),
        coding_ends_at: Utc.with_ymd_and_hms(2024, 3, 3, 3, 0, 0).unwrap(),
        timezone: "America/New_York".to_string(),
        ..Hackathon::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::record::{patch, to_value, PatchMode, Projection};

    #[test]
    fn test_local_date_range_uses_hackathon_timezone() {
        let hackathon = sample_hackathon("Spring Jam");
        let (start, end) = hackathon.local_date_range().unwrap();
        // 03:00 UTC is still the previous evening in New York
        assert_eq!(start, "02/29/2024");
        assert_eq!(end, "03/02/2024");
    }

    #[test]
    fn test_check_rejects_reversed_window() {
        let mut hackathon = sample_hackathon("Spring Jam");
        assert!(hackathon.check().is_ok());

        std::mem::swap(&mut hackathon.coding_starts_at, &mut hackathon.coding_ends_at);
        assert!(hackathon.check().is_err());
    }

    #[test]
    fn test_check_rejects_blank_and_oversized_names() {
        let mut hackathon = sample_hackathon("   ");
        assert!(hackathon.check().unwrap_err().contains("Name"));

        hackathon.name = "x".repeat(101);
        assert!(hackathon.check().is_err());

        hackathon.name = "x".repeat(100);
        assert!(hackathon.check().is_ok());
    }

    #[test]
    fn test_check_rejects_unknown_timezone() {
        let mut hackathon = sample_hackathon("Spring Jam");
        hackathon.timezone = "Mars/Olympus_Mons".to_string();
        assert!(hackathon.check().unwrap_err().contains("timezone"));
    }

    #[test]
    fn test_patch_name_and_window() {
        let mut hackathon = sample_hackathon("Spring Jam");
        let input = json!({
            "name": "  Summer Jam ",
            "coding_ends_at": "2024-03-04T03:00:00Z",
            "admin_id": Uuid::new_v4(),
        });
        let changes = patch(&mut hackathon, input.as_object().unwrap(), PatchMode::Untrusted).unwrap();

        assert_eq!(hackathon.name, "Summer Jam");
        assert_eq!(hackathon.admin_id, Uuid::nil());
        assert_eq!(
            changes.to_value(),
            json!({
                "name": {"old": "Spring Jam", "new": "Summer Jam"},
                "coding_ends_at": {"old": "2024-03-03T03:00:00Z", "new": "2024-03-04T03:00:00Z"},
            })
        );
    }

    #[test]
    fn test_equivalent_timestamp_is_not_a_change() {
        let mut hackathon = sample_hackathon("Spring Jam");
        let input = json!({"coding_starts_at": "2024-03-01T03:00:00+00:00"});
        let changes = patch(&mut hackathon, input.as_object().unwrap(), PatchMode::Untrusted).unwrap();
        assert!(changes.is_empty());
    }

    #[test]
    fn test_serialized_timestamps_use_utc_format() {
        let hackathon = sample_hackathon("Spring Jam");
        let value = to_value(&hackathon, &Projection::new());
        assert_eq!(value["coding_starts_at"], json!("2024-03-01T03:00:00Z"));
        assert_eq!(value["timezone"], json!("America/New_York"));
        assert!(value.get("ranks").is_none());
    }
}
