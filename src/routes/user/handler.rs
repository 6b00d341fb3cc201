use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::{
    AppState,
    database::StoreError,
    error::{AppError, AppResult},
    middleware::Identity,
    models::{User, UserProfile},
    routes::{ApiJson, require_fields},
    utils::{hash_password_blocking, verify_password_blocking},
};

use super::model::{LoginRequest, LoginResponse, SignupRequest, StatusResponse};

// Hashing and insert failures share one message so the caller cannot tell
// them apart.
const SIGNUP_FAILED: &str = "user already exists (or db error)";
const INVALID_CREDENTIALS: &str = "invalid credentials";

#[axum::debug_handler]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> AppResult<(StatusCode, Json<StatusResponse>)> {
    require_fields(&[&req.user_id, &req.password], "userId and password are required")?;

    let password_hash = hash_password_blocking(req.password, state.bcrypt_cost)
        .await
        .map_err(|e| {
            tracing::error!("Failed to hash password for {}: {}", req.user_id, e);
            AppError::Conflict(SIGNUP_FAILED)
        })?;

    let user = User {
        id: req.user_id,
        password_hash,
        display_name: req.display_name,
        mbti: req.mbti,
        created_at: Utc::now(),
    };

    state.users.create(&user).await.map_err(|e| {
        match &e {
            StoreError::Conflict => tracing::info!("Signup rejected, {} already exists", user.id),
            _ => tracing::error!("Failed to create user {}: {}", user.id, e),
        }
        AppError::Conflict(SIGNUP_FAILED)
    })?;

    Ok((StatusCode::CREATED, Json(StatusResponse { status: "ok" })))
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    require_fields(&[&req.user_id, &req.password], "userId and password are required")?;

    // Unknown user and wrong password look the same from outside.
    let user = match state.users.find_by_id(&req.user_id).await {
        Ok(user) => user,
        Err(StoreError::NotFound) => return Err(AppError::Authentication(INVALID_CREDENTIALS)),
        Err(e) => {
            tracing::error!("Failed to look up {} during login: {}", req.user_id, e);
            return Err(AppError::Authentication(INVALID_CREDENTIALS));
        }
    };

    if !verify_password_blocking(req.password, user.password_hash).await {
        return Err(AppError::Authentication(INVALID_CREDENTIALS));
    }

    let token = state.tokens.issue_token(&user.id)?;
    tracing::info!("User {} logged in", user.id);
    Ok(Json(LoginResponse { token }))
}

#[axum::debug_handler]
pub async fn get_me(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<UserProfile>> {
    profile(&state, &identity.user_id).await
}

#[axum::debug_handler]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserProfile>> {
    profile(&state, &user_id).await
}

async fn profile(state: &AppState, user_id: &str) -> AppResult<Json<UserProfile>> {
    match state.users.find_by_id(user_id).await {
        Ok(user) => Ok(Json(user.into())),
        Err(StoreError::NotFound) => Err(AppError::NotFound("user not found")),
        Err(e) => Err(AppError::storage("load user")(e)),
    }
}
