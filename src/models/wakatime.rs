//! WakaTime API payloads

use serde::Deserialize;
use serde_json::{json, Value};

/// Response of the code-for-token exchange
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// `{"data": ...}` wrapper used by every API response
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Current user's profile
#[derive(Debug, Clone, Deserialize)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Profile {
    /// Public profile page: by handle when there is one, by id otherwise
    pub fn profile_url(&self, base_url: &str) -> String {
        match self.username.as_deref().filter(|u| !u.is_empty()) {
            Some(username) => format!("{}/@{}", base_url, username),
            None => format!("{}/{}", base_url, self.id),
        }
    }

    /// Fields to copy onto the local user record
    pub fn user_fields(&self, access_token: &str, base_url: &str) -> Value {
        json!({
            "wakatime_token": access_token,
            "email": self.email,
            "avatar_url": self.photo,
            "full_name": self.full_name,
            "username": self.username,
            "profile_url": self.profile_url(base_url),
        })
    }
}

/// One day of activity
#[derive(Debug, Clone, Deserialize)]
pub struct DailySummary {
    pub grand_total: GrandTotal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GrandTotal {
    pub total_seconds: f64,
}

/// Whole seconds of activity across every returned day
pub fn total_seconds(days: &[DailySummary]) -> i64 {
    let sum: f64 = days
        .iter()
        .map(|day| day.grand_total.total_seconds)
        .filter(|s| s.is_finite())
        .sum();
    sum.max(0.0).trunc() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(raw: Value) -> Vec<DailySummary> {
        serde_json::from_value::<Envelope<Vec<DailySummary>>>(raw)
            .unwrap()
            .data
    }

    #[test]
    fn test_total_seconds_sums_every_day() {
        let summaries = days(json!({"data": [
            {"grand_total": {"total_seconds": 100}},
            {"grand_total": {"total_seconds": 250}},
        ]}));
        assert_eq!(total_seconds(&summaries), 350);
    }

    #[test]
    fn test_total_seconds_truncates_fractions() {
        let summaries = days(json!({"data": [
            {"grand_total": {"total_seconds": 10.75, "text": "10 secs"}},
            {"grand_total": {"total_seconds": 0.5}},
        ]}));
        assert_eq!(total_seconds(&summaries), 11);
        assert_eq!(total_seconds(&[]), 0);
    }

    #[test]
    fn test_profile_url_prefers_handle() {
        let mut profile: Profile = serde_json::from_value(json!({
            "id": "abc-123",
            "username": "ada",
            "photo": "https://wakatime.com/photo/abc-123",
        }))
        .unwrap();
        assert_eq!(profile.profile_url("https://wakatime.com"), "https://wakatime.com/@ada");

        profile.username = None;
        assert_eq!(profile.profile_url("https://wakatime.com"), "https://wakatime.com/abc-123");
    }

    #[test]
    fn test_user_fields_carry_token_and_photo() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "abc-123",
            "email": "ada@example.com",
            "photo": "https://wakatime.com/photo/abc-123",
            "full_name": "Ada Lovelace",
            "username": null,
        }))
        .unwrap();
        let fields = profile.user_fields("sec_token", "https://wakatime.com");
        assert_eq!(fields["wakatime_token"], json!("sec_token"));
        assert_eq!(fields["avatar_url"], json!("https://wakatime.com/photo/abc-123"));
        assert_eq!(fields["profile_url"], json!("https://wakatime.com/abc-123"));
    }
}
