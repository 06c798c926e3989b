//! Hackathon request DTOs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::{
    constants::{
        DEFAULT_TIMEZONE, MAX_HACKATHON_NAME_LENGTH, MAX_TIMESTAMP_LENGTH, MAX_TIMEZONE_LENGTH,
        MIN_HACKATHON_NAME_LENGTH,
    },
    utils::{parse_form_datetime, validate_timezone, OptionalField},
};

const REQUIRED: &str = "This field is required.";

/// Field name to messages
pub type FormErrors = BTreeMap<String, Vec<String>>;

/// `POST /new/hackathon` form body. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HackathonForm {
    #[validate(length(min = MIN_HACKATHON_NAME_LENGTH, max = MAX_HACKATHON_NAME_LENGTH))]
    pub name: String,

    #[validate(length(min = 2, max = MAX_TIMESTAMP_LENGTH))]
    pub coding_starts_at: String,

    #[validate(length(min = 2, max = MAX_TIMESTAMP_LENGTH))]
    pub coding_ends_at: String,

    pub timezone: Option<String>,
}

/// A form that passed validation
#[derive(Debug, Clone)]
pub struct NewHackathon {
    pub name: String,
    pub coding_starts_at: DateTime<Utc>,
    pub coding_ends_at: DateTime<Utc>,
    pub timezone: String,
}

impl HackathonForm {
    /// Strip the text fields
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            coding_starts_at: self.coding_starts_at.trim().to_string(),
            coding_ends_at: self.coding_ends_at.trim().to_string(),
            timezone: self.timezone.clone(),
        }
    }

    /// Validate and convert. Naive timestamps are read in the submitted
    /// timezone; a missing or blank timezone means UTC.
    pub fn validate_form(&self) -> Result<NewHackathon, FormErrors> {
        let form = self.normalized();
        let mut errors = FormErrors::new();

        let required = [
            ("name", form.name.is_empty()),
            ("coding_starts_at", form.coding_starts_at.is_empty()),
            ("coding_ends_at", form.coding_ends_at.is_empty()),
        ];
        for (field, missing) in required {
            if missing {
                add_error(&mut errors, field, REQUIRED);
            }
        }

        if let Err(validation) = form.validate() {
            collect(&mut errors, &validation);
        }

        let timezone = match OptionalField::new().check(form.timezone.as_deref()) {
            Ok(None) => Some(DEFAULT_TIMEZONE.to_string()),
            Ok(Some(tz)) if tz.len() as u64 > MAX_TIMEZONE_LENGTH => {
                add_error(
                    &mut errors,
                    "timezone",
                    &format!("Field must be at most {} characters long.", MAX_TIMEZONE_LENGTH),
                );
                None
            }
            Ok(Some(tz)) => match validate_timezone(tz) {
                Ok(()) => Some(tz.to_string()),
                Err(e) => {
                    add_error(&mut errors, "timezone", &message(&e));
                    None
                }
            },
            Err(e) => {
                add_error(&mut errors, "timezone", &message(&e));
                None
            }
        };

        let tz: Tz = timezone
            .as_deref()
            .and_then(|t| t.parse().ok())
            .unwrap_or(Tz::UTC);
        let starts = parse_field(&mut errors, "coding_starts_at", &form.coding_starts_at, tz);
        let ends = parse_field(&mut errors, "coding_ends_at", &form.coding_ends_at, tz);

        if let (Some(starts), Some(ends)) = (starts, ends) {
            if ends <= starts {
                add_error(&mut errors, "coding_ends_at", "Coding must end after it starts.");
            }
        }

        match (errors.is_empty(), starts, ends, timezone) {
            (true, Some(coding_starts_at), Some(coding_ends_at), Some(timezone)) => Ok(NewHackathon {
                name: form.name,
                coding_starts_at,
                coding_ends_at,
                timezone,
            }),
            _ => Err(errors),
        }
    }
}

fn parse_field(errors: &mut FormErrors, field: &str, raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if raw.is_empty() || errors.contains_key(field) {
        return None;
    }
    let parsed = parse_form_datetime(raw, tz);
    if parsed.is_none() {
        add_error(errors, field, "Not a valid datetime value.");
    }
    parsed
}

fn add_error(errors: &mut FormErrors, field: &str, message: &str) {
    errors.entry(field.to_string()).or_default().push(message.to_string());
}

/// A required field reports only that it is required
fn collect(errors: &mut FormErrors, validation: &ValidationErrors) {
    for (field, field_errors) in validation.field_errors() {
        let field: &str = &field;
        if errors.get(field).is_some_and(|m| m.iter().any(|m| m == REQUIRED)) {
            continue;
        }
        for error in field_errors {
            add_error(errors, field, &message(error));
        }
    }
}

fn message(error: &validator::ValidationError) -> String {
    if let Some(message) = &error.message {
        return message.to_string();
    }
    match error.code.as_ref() {
        "length" => match (error.params.get("min"), error.params.get("max")) {
            (Some(min), Some(max)) => {
                format!("Field must be between {} and {} characters long.", min, max)
            }
            _ => "Field has an invalid length.".to_string(),
        },
        code => format!("Invalid value ({}).", code),
    }
}

/// `show`/`hide` query parameters of a hackathon page
#[derive(Debug, Default, Deserialize)]
pub struct ProjectionQuery {
    pub show: Option<String>,
    pub hide: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn form(name: &str, starts: &str, ends: &str, timezone: Option<&str>) -> HackathonForm {
        HackathonForm {
            name: name.to_string(),
            coding_starts_at: starts.to_string(),
            coding_ends_at: ends.to_string(),
            timezone: timezone.map(str::to_string),
        }
    }

    #[test]
    fn test_valid_form_reads_times_in_timezone() {
        let valid = form(" Spring Jam ", "2024-03-01 09:00", "2024-03-03T18:30", Some("America/New_York"))
            .validate_form()
            .unwrap();

        assert_eq!(valid.name, "Spring Jam");
        assert_eq!(valid.timezone, "America/New_York");
        assert_eq!(valid.coding_starts_at, Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap());
        assert_eq!(valid.coding_ends_at, Utc.with_ymd_and_hms(2024, 3, 3, 23, 30, 0).unwrap());
    }

    #[test]
    fn test_blank_timezone_defaults_to_utc() {
        let valid = form("Jam", "2024-03-01 09:00", "2024-03-02 09:00", Some("   "))
            .validate_form()
            .unwrap();
        assert_eq!(valid.timezone, "UTC");
        assert_eq!(valid.coding_starts_at, Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap());

        let valid = form("Jam", "2024-03-01 09:00", "2024-03-02 09:00", None)
            .validate_form()
            .unwrap();
        assert_eq!(valid.timezone, "UTC");
    }

    #[test]
    fn test_end_before_start_is_a_field_error() {
        let errors = form("Jam", "2024-03-02 09:00", "2024-03-01 09:00", None)
            .validate_form()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["coding_ends_at"], vec!["Coding must end after it starts."]);
    }

    #[test]
    fn test_missing_fields_are_required() {
        let errors = HackathonForm::default().validate_form().unwrap_err();
        assert_eq!(errors["name"], vec![REQUIRED]);
        assert_eq!(errors["coding_starts_at"], vec![REQUIRED]);
        assert_eq!(errors["coding_ends_at"], vec![REQUIRED]);
        assert!(!errors.contains_key("timezone"));
    }

    #[test]
    fn test_bad_values_are_reported_per_field() {
        let errors = form("J", "whenever", "2024-03-02 09:00", Some("Mars/Base"))
            .validate_form()
            .unwrap_err();
        assert_eq!(errors["name"], vec!["Field must be between 2 and 100 characters long."]);
        assert_eq!(errors["timezone"], vec!["Invalid olson timezone"]);
        assert_eq!(errors["coding_starts_at"], vec!["Not a valid datetime value."]);
        assert!(!errors.contains_key("coding_ends_at"));
    }
}
