use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::user::UserProfile;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let session = state
        .sessions
        .sign_in(&payload.email, &payload.password)
        .await?;

    Ok(Json(LoginResponse {
        token: session.token,
        user: session.user,
    }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Current user profile", body = UserProfile))
)]
pub async fn me(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<UserProfile>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    let user = directory
        .current_user()
        .await
        .ok_or_else(|| crate::errors::AppError::unauthorized("session has no resolved profile"))?;

    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Session torn down"))
)]
pub async fn logout(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<MessageResponse>> {
    state.sessions.end(auth.user_id).await;

    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/password-reset",
    tag = "Auth",
    request_body = PasswordResetRequest,
    responses((status = 200, description = "Reset request acknowledged"))
)]
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> AppResult<Json<MessageResponse>> {
    state.sessions.request_password_reset(&payload.email).await?;

    // Same response whether or not the address exists.
    Ok(Json(MessageResponse {
        message: "If the address is registered, a reset has been requested".to_string(),
    }))
}
