//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default externally visible base URL
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// SESSION DEFAULTS
// =============================================================================

/// Default session lifetime in hours (four weeks)
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24 * 7 * 4;

/// Default lifetime of the OAuth state blob in minutes
pub const DEFAULT_STATE_EXPIRY_MINUTES: i64 = 10;

/// Lifetime of the anti-forgery cookie in days
pub const CSRF_COOKIE_DAYS: i64 = 7;

/// Length of a freshly minted anti-forgery token
pub const CSRF_TOKEN_LENGTH: usize = 32;

/// Cookie names
pub mod cookies {
    pub const SESSION: &str = "session";
    pub const CSRF: &str = "csrftoken";
}

// =============================================================================
// WAKATIME DEFAULTS
// =============================================================================

/// Default WakaTime base URL
pub const DEFAULT_WAKATIME_BASE_URL: &str = "https://wakatime.com";

/// Scopes requested during authorization
pub const DEFAULT_WAKATIME_SCOPE: &str = "email,read_logged_time";

/// User agent sent on upstream calls
pub const DEFAULT_USER_AGENT: &str = "hackathonrank/1.0.0";

/// Default upstream request timeout in seconds
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;

/// Upstream API paths
pub mod wakatime_paths {
    pub const AUTHORIZE: &str = "/oauth/authorize";
    pub const TOKEN: &str = "/oauth/token";
    pub const CURRENT_USER: &str = "/api/v1/users/current";
    pub const SUMMARIES: &str = "/api/v1/users/current/summaries";
}

/// Date format expected by the summaries endpoint
pub const SUMMARY_DATE_FORMAT: &str = "%m/%d/%Y";

// =============================================================================
// VALIDATION
// =============================================================================

/// Hackathon name minimum length
pub const MIN_HACKATHON_NAME_LENGTH: u64 = 2;

/// Hackathon name maximum length
pub const MAX_HACKATHON_NAME_LENGTH: u64 = 100;

/// Maximum length of a submitted timestamp
pub const MAX_TIMESTAMP_LENGTH: u64 = 100;

/// Maximum length of a timezone name
pub const MAX_TIMEZONE_LENGTH: u64 = 120;

/// Timezone used when the form leaves it blank
pub const DEFAULT_TIMEZONE: &str = "UTC";

// =============================================================================
// SERIALIZATION
// =============================================================================

/// Timestamp format for serialized records
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Deepest relationship nesting followed when serializing a record
pub const MAX_SERIALIZE_DEPTH: usize = 8;
