use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::org::{Unit, UnitCreateRequest, UnitUpdateRequest};
use crate::models::rbac::{Action, Module};

#[utoipa::path(
    get,
    path = "/units",
    tag = "Units",
    responses((status = 200, description = "List units", body = [Unit]))
)]
pub async fn list_units(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Unit>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Unidades, Action::View).await?;

    Ok(Json(directory.units().await))
}

#[utoipa::path(
    post,
    path = "/units",
    tag = "Units",
    request_body = UnitCreateRequest,
    responses((status = 201, description = "Unit created", body = Unit))
)]
pub async fn create_unit(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<UnitCreateRequest>,
) -> AppResult<(StatusCode, Json<Unit>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Unidades, Action::Create).await?;

    let unit = directory.create_unit(payload).await?;

    Ok((StatusCode::CREATED, Json(unit)))
}

#[utoipa::path(
    put,
    path = "/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "Unit id")),
    request_body = UnitUpdateRequest,
    responses((status = 200, description = "Unit updated", body = Unit))
)]
pub async fn update_unit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UnitUpdateRequest>,
) -> AppResult<Json<Unit>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Unidades, Action::Edit).await?;

    let unit = directory.update_unit(id, payload).await?;

    Ok(Json(unit))
}

#[utoipa::path(
    delete,
    path = "/units/{id}",
    tag = "Units",
    params(("id" = Uuid, Path, description = "Unit id")),
    responses((status = 204, description = "Unit deleted"))
)]
pub async fn delete_unit(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Unidades, Action::Delete).await?;

    directory.delete_unit(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
