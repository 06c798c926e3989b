//! Hackathon response DTOs

use serde::Serialize;
use serde_json::Value;

use super::request::{FormErrors, HackathonForm};
use crate::models::{
    record::{to_value, Changes, Projection},
    Hackathon, User,
};

/// `GET /`
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub hackathons: Vec<Value>,
    pub user: Option<Value>,
}

/// Hackathon page with its leaderboard
#[derive(Debug, Serialize)]
pub struct HackathonResponse {
    pub hackathon: Value,
    pub running: bool,
    pub hackers: Vec<Value>,
}

impl HackathonResponse {
    pub fn new(hackathon: &Hackathon, projection: &Projection) -> Self {
        let hackers = hackathon
            .ranks
            .iter()
            .enumerate()
            .map(|(index, rank)| {
                let mut entry = to_value(rank, &Projection::new());
                if let Value::Object(fields) = &mut entry {
                    fields.insert("position".to_string(), Value::from(index + 1));
                }
                entry
            })
            .collect();

        Self {
            hackathon: to_value(hackathon, projection),
            running: hackathon.is_running(),
            hackers,
        }
    }
}

/// The hackathon form, echoed back with field errors when it did not validate
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub form: HackathonForm,
    pub errors: FormErrors,
    pub timezones: Vec<&'static str>,
}

impl FormResponse {
    pub fn new(form: HackathonForm, errors: FormErrors) -> Self {
        Self {
            form,
            errors,
            timezones: chrono_tz::TZ_VARIANTS.iter().map(|tz| tz.name()).collect(),
        }
    }
}

/// `PATCH /hackathon/{name}`
#[derive(Debug, Serialize)]
pub struct UpdateResponse {
    pub hackathon: Value,
    pub changes: Changes,
}

/// Signed-in user with the hackathons they organize
pub fn user_value(user: &User) -> Value {
    to_value(user, &Projection::new().show(["hackathons"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::models::{hackathon::sample_hackathon, user::sample_user, Rank};

    #[test]
    fn test_hackers_are_numbered_in_order() {
        let mut hackathon = sample_hackathon("Spring Jam");
        hackathon.ranks = vec![
            Rank {
                total_seconds: 7200,
                user: Some(sample_user("1")),
                ..Rank::default()
            },
            Rank {
                total_seconds: 61,
                ..Rank::default()
            },
        ];

        let page = HackathonResponse::new(&hackathon, &Projection::new());
        assert!(!page.running);
        assert_eq!(page.hackathon["name"], json!("Spring Jam"));
        assert!(page.hackathon.get("ranks").is_none());
        assert_eq!(page.hackers[0]["position"], json!(1));
        assert_eq!(page.hackers[0]["coding_time"], json!("2 hours"));
        assert_eq!(page.hackers[0]["full_name"], json!("Ada Lovelace"));
        assert_eq!(page.hackers[1]["position"], json!(2));
        assert_eq!(page.hackers[1]["username"], json!(null));
    }

    #[test]
    fn test_user_value_lists_organized_hackathons() {
        let mut user = sample_user("1");
        user.hackathons = vec![sample_hackathon("Spring Jam")];

        let value = user_value(&user);
        assert_eq!(value["hackathons"][0]["name"], json!("Spring Jam"));
        assert!(value.get("wakatime_token").is_none());
        assert!(value.get("email").is_none());
    }

    #[test]
    fn test_form_response_lists_timezones() {
        let response = FormResponse::new(HackathonForm::default(), FormErrors::new());
        assert!(response.timezones.contains(&"America/New_York"));
        assert!(response.timezones.contains(&"UTC"));
    }
}
