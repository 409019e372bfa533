use serde::{Deserialize, Serialize};

use crate::users::repo::User;

/// Query string for the user listing. Defaults match the original API.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

fn default_page() -> i64 {
    1
}
fn default_per_page() -> i64 {
    2
}

const MAX_PER_PAGE: i64 = 100;

impl ListQuery {
    /// Non-positive values clamp to 1; per_page is capped.
    pub fn clamped(&self) -> (i64, i64) {
        (self.page.max(1), self.per_page.clamp(1, MAX_PER_PAGE))
    }
}

/// Identity echoed back from verified access-token claims.
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct AdminOnlyResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserPageResponse {
    pub users: Vec<User>,
    pub total: i64,
    pub pages: i64,
    pub current_page: i64,
}
