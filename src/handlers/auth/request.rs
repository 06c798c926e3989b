//! Login query parameters

use serde::Deserialize;

/// `GET /login`
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Path to return to after logging in
    pub next: Option<String>,
}

/// `GET /login/callback`, as sent back by WakaTime
#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
