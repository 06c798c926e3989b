//! Input validation utilities

use std::borrow::Cow;

use chrono_tz::Tz;
use validator::ValidationError;

/// Optional form field with explicit null and blank handling.
///
/// A field that is absent (`None`) passes when `nullable`; a field that is
/// empty after optional whitespace stripping passes when `blank`. Either way
/// the remaining validators for that field are skipped.
#[derive(Debug, Clone)]
pub struct OptionalField {
    pub strip_whitespace: bool,
    pub nullable: bool,
    pub blank: bool,
    pub message: Option<&'static str>,
}

impl Default for OptionalField {
    fn default() -> Self {
        Self {
            strip_whitespace: true,
            nullable: true,
            blank: true,
            message: None,
        }
    }
}

impl OptionalField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn blank(mut self, blank: bool) -> Self {
        self.blank = blank;
        self
    }

    pub fn strip_whitespace(mut self, strip: bool) -> Self {
        self.strip_whitespace = strip;
        self
    }

    pub fn message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }

    /// `Ok(None)` stops validation of the field, `Ok(Some(value))` hands the
    /// (possibly stripped) value on to the remaining validators.
    pub fn check<'a>(&self, raw: Option<&'a str>) -> Result<Option<&'a str>, ValidationError> {
        let Some(raw) = raw else {
            if self.nullable {
                return Ok(None);
            }
            return Err(self.error("null", "This field can not be null."));
        };

        let value = if self.strip_whitespace { raw.trim() } else { raw };
        if !value.is_empty() {
            return Ok(Some(value));
        }
        if self.blank {
            return Ok(None);
        }
        Err(self.error("blank", "This field can not be blank."))
    }

    fn error(&self, code: &'static str, fallback: &'static str) -> ValidationError {
        ValidationError::new(code).with_message(Cow::Borrowed(self.message.unwrap_or(fallback)))
    }
}

/// Accept only IANA timezone names
pub fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    if timezone.parse::<Tz>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::new("timezone").with_message(Cow::Borrowed("Invalid olson timezone")))
    }
}
