//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod hackathon;
pub mod rank;
pub mod record;
pub mod user;
pub mod wakatime;

pub use hackathon::Hackathon;
pub use rank::Rank;
pub use user::User;
