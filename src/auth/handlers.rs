use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AccessTokenResponse, LoginRequest, MessageResponse, RegisterRequest, TokenPairResponse,
        },
        jwt::{AdminUser, JwtKeys, RefreshUser},
        password::{hash_password, verify_password},
    },
    error::{AppError, AppJson},
    state::AppState,
    users::repo::{User, ROLE_USER},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/register", post(register))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<TokenPairResponse>, AppError> {
    // Unknown username and wrong password take the same path so the
    // response never reveals which usernames exist.
    let user = User::find_by_username(&state.db, &payload.username).await?;

    let user = match user {
        Some(u) => u,
        None => {
            warn!(username = %payload.username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, &user.role)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenPairResponse {
        access_token,
        refresh_token,
    }))
}

#[instrument(skip(state, refresh))]
pub async fn refresh(
    State(state): State<AppState>,
    refresh: RefreshUser,
) -> Result<Json<AccessTokenResponse>, AppError> {
    // Re-derive the role from the store so the new access token reflects
    // the user's current role instead of whatever the refresh token was
    // minted alongside.
    let user = User::find_by_id(&state.db, refresh.user_id)
        .await?
        .ok_or(AppError::InvalidToken("Invalid or expired token"))?;

    let keys = JwtKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id, &user.role)?;

    info!(user_id = user.id, "access token refreshed");
    Ok(Json(AccessTokenResponse { access_token }))
}

#[instrument(skip(state, admin, payload))]
pub async fn register(
    State(state): State<AppState>,
    admin: AdminUser,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    if payload.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required"));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password is required"));
    }

    let role = payload.role.as_deref().unwrap_or(ROLE_USER);
    let hash = hash_password(&payload.password)?;

    // Duplicate usernames are caught by the unique index, not a pre-check,
    // so concurrent registrations cannot race past each other.
    let user = User::create(&state.db, payload.username.trim(), &hash, role)
        .await
        .map_err(AppError::from)?;

    info!(
        admin_id = admin.0.user_id,
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        "user registered"
    );
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully",
        }),
    ))
}
