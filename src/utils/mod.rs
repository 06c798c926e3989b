//! Utility functions

pub mod crypto;
pub mod time;
pub mod url;
pub mod validation;

pub use crypto::{constant_time_eq, generate_secure_token};
pub use time::{format_coding_time, parse_form_datetime};
pub use self::url::{hackathon_path, is_safe_url, login_path, with_params};
pub use validation::{validate_timezone, OptionalField};
