//! HTTP middleware

pub mod auth;
pub mod logging;

pub use auth::{require_login, session_middleware, CurrentUser, OptionalUser};
pub use logging::logging_middleware;
