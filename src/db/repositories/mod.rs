//! Database repositories
//!
//! Repositories handle all direct database interactions.

pub mod hackathon_repo;
pub mod rank_repo;
pub mod user_repo;

pub use hackathon_repo::HackathonRepository;
pub use rank_repo::RankRepository;
pub use user_repo::UserRepository;
