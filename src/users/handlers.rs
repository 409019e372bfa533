use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::jwt::{AdminUser, AuthUser},
    error::AppError,
    state::AppState,
    users::{
        dto::{AdminOnlyResponse, ListQuery, ProfileResponse, UserPageResponse},
        repo::{page_count, User},
    },
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(profile))
        .route("/admin-only", get(admin_only))
        .route("/users", get(list_users))
}

/// Answers straight from the verified claims; no store round trip.
#[instrument(skip_all)]
pub async fn profile(user: AuthUser) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        user_id: user.user_id,
        role: user.role,
    })
}

#[instrument(skip_all)]
pub async fn admin_only(_admin: AdminUser) -> Json<AdminOnlyResponse> {
    Json(AdminOnlyResponse {
        message: "Welcome Admin",
    })
}

#[instrument(skip(state, _user))]
pub async fn list_users(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<UserPageResponse>, AppError> {
    let (page, per_page) = query.clamped();
    let (users, total) = User::list_page(&state.db, page, per_page).await?;

    Ok(Json(UserPageResponse {
        users,
        total,
        pages: page_count(total, per_page),
        current_page: page,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo::ROLE_USER;

    #[tokio::test]
    async fn profile_echoes_verified_claims() {
        let Json(resp) = profile(AuthUser {
            user_id: 7,
            role: ROLE_USER.into(),
        })
        .await;
        assert_eq!(resp.user_id, 7);
        assert_eq!(resp.role, ROLE_USER);

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["user_id"], 7);
        assert_eq!(json["role"], "user");
    }

    #[tokio::test]
    async fn admin_only_greets_admin() {
        let Json(resp) = admin_only(AdminUser(AuthUser {
            user_id: 1,
            role: "admin".into(),
        }))
        .await;
        assert_eq!(resp.message, "Welcome Admin");
    }
}
