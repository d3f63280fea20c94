use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::rbac::{Action, Module};
use crate::models::user::{
    AdminResetPasswordRequest, CreatedUser, UserCreateRequest, UserProfile, UserStatusRequest,
    UserUpdateRequest,
};
use crate::routes::auth::MessageResponse;

#[utoipa::path(
    get,
    path = "/users",
    tag = "Collaborators",
    responses((status = 200, description = "List collaborator profiles", body = [UserProfile]))
)]
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<UserProfile>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::View)
        .await?;

    Ok(Json(directory.users().await))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Collaborators",
    request_body = UserCreateRequest,
    responses(
        (status = 201, description = "Collaborator provisioned; the temporary password appears only here", body = CreatedUser),
        (status = 409, description = "Email already in use")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UserCreateRequest>,
) -> AppResult<(StatusCode, Json<CreatedUser>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Create)
        .await?;

    let created = directory.create_user(payload).await?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Collaborators",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserUpdateRequest,
    responses((status = 200, description = "Profile updated", body = UserProfile))
)]
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserUpdateRequest>,
) -> AppResult<Json<UserProfile>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Edit)
        .await?;

    let user = directory.update_user(id, payload).await?;
    // A role reassignment must reach the target's own session, not just ours.
    state.sessions.invalidate_user(id).await;

    Ok(Json(user))
}

#[utoipa::path(
    put,
    path = "/users/{id}/status",
    tag = "Collaborators",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UserStatusRequest,
    responses((status = 200, description = "Activation flag updated", body = UserProfile))
)]
pub async fn set_user_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UserStatusRequest>,
) -> AppResult<Json<UserProfile>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Edit)
        .await?;

    let user = directory.set_user_active(id, payload.is_active).await?;
    // Deactivation takes effect on the target's next request, not next login.
    state.sessions.invalidate_user(id).await;

    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/users/{id}/password",
    tag = "Collaborators",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = AdminResetPasswordRequest,
    responses((status = 200, description = "Password replaced"))
)]
pub async fn admin_reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Edit)
        .await?;

    directory
        .admin_reset_password(id, &payload.new_password)
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Collaborators",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Collaborator removed"),
        (status = 400, description = "Attempted self-deletion")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Delete)
        .await?;

    directory.delete_user(id).await?;
    state.sessions.invalidate_user(id).await;

    Ok(StatusCode::NO_CONTENT)
}
