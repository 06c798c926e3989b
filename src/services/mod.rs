//! Business logic services

pub mod auth_service;
pub mod hackathon_service;
pub mod oauth_service;
pub mod wakatime;

pub use auth_service::AuthService;
pub use hackathon_service::HackathonService;
pub use oauth_service::OAuthService;
pub use wakatime::{TimeTracker, UpstreamError, WakaTimeClient};
