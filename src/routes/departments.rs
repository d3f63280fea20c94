use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::org::{Department, DepartmentCreateRequest};
use crate::models::rbac::{Action, Module};

// Departments are an attribute of collaborators, so they share that module's
// grants rather than carrying their own.

#[utoipa::path(
    get,
    path = "/departments",
    tag = "Collaborators",
    responses((status = 200, description = "List departments", body = [Department]))
)]
pub async fn list_departments(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Department>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::View)
        .await?;

    Ok(Json(directory.departments().await))
}

#[utoipa::path(
    post,
    path = "/departments",
    tag = "Collaborators",
    request_body = DepartmentCreateRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 409, description = "Department name already in use")
    )
)]
pub async fn create_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<DepartmentCreateRequest>,
) -> AppResult<(StatusCode, Json<Department>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Create)
        .await?;

    let department = directory.create_department(payload).await?;

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    delete,
    path = "/departments/{id}",
    tag = "Collaborators",
    params(("id" = Uuid, Path, description = "Department id")),
    responses((status = 204, description = "Department deleted"))
)]
pub async fn delete_department(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Colaboradores, Action::Delete)
        .await?;

    directory.delete_department(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
