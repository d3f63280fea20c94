use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::rbac::{Action, Module, Role, RoleCreateRequest, RoleUpdateRequest};

#[utoipa::path(
    get,
    path = "/roles",
    tag = "Security",
    responses((status = 200, description = "List roles", body = [Role]))
)]
pub async fn list_roles(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Role>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Seguranca, Action::View).await?;

    Ok(Json(directory.roles().await))
}

#[utoipa::path(
    post,
    path = "/roles",
    tag = "Security",
    request_body = RoleCreateRequest,
    responses(
        (status = 201, description = "Role created", body = Role),
        (status = 409, description = "Role name already in use")
    )
)]
pub async fn create_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<RoleCreateRequest>,
) -> AppResult<(StatusCode, Json<Role>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Seguranca, Action::Create).await?;

    let role = directory.create_role(payload).await?;

    Ok((StatusCode::CREATED, Json(role)))
}

#[utoipa::path(
    put,
    path = "/roles/{id}",
    tag = "Security",
    params(("id" = Uuid, Path, description = "Role id")),
    request_body = RoleUpdateRequest,
    responses((status = 200, description = "Role updated", body = Role))
)]
pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RoleUpdateRequest>,
) -> AppResult<Json<Role>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Seguranca, Action::Edit).await?;

    let role = directory.update_role(id, payload).await?;
    // Holders of this role re-evaluate against the new grants immediately.
    state.sessions.invalidate_role_holders(id).await;

    Ok(Json(role))
}

#[utoipa::path(
    delete,
    path = "/roles/{id}",
    tag = "Security",
    params(("id" = Uuid, Path, description = "Role id")),
    responses(
        (status = 204, description = "Role deleted"),
        (status = 409, description = "Role still assigned to users")
    )
)]
pub async fn delete_role(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Seguranca, Action::Delete).await?;

    directory.delete_role(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
