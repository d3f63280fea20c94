use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthUser;
use crate::models::domain::{
    ApprovalStatus, DbTrip, DecisionRequest, Trip, TripCreateRequest, TripUpdateRequest,
};
use crate::models::rbac::{Action, Module};
use crate::utils::utc_now;

#[utoipa::path(
    get,
    path = "/trips",
    tag = "Trips",
    responses((status = 200, description = "List trips", body = [Trip]))
)]
pub async fn list_trips(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<Vec<Trip>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Viagens, Action::View).await?;

    let rows = sqlx::query_as::<_, DbTrip>(
        "SELECT id, destination, purpose, start_date, end_date, budget, status, created_by, \
                created_at, updated_at \
         FROM trips ORDER BY start_date DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    let trips: Vec<Trip> = rows.into_iter().map(Trip::try_from).collect::<Result<_, _>>()?;

    Ok(Json(trips))
}

#[utoipa::path(
    post,
    path = "/trips",
    tag = "Trips",
    request_body = TripCreateRequest,
    responses(
        (status = 201, description = "Trip created as pending", body = Trip),
        (status = 400, description = "End date precedes start date")
    )
)]
pub async fn create_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TripCreateRequest>,
) -> AppResult<(StatusCode, Json<Trip>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    let actor = directory.authorize(Module::Viagens, Action::Create).await?;

    if payload.end_date < payload.start_date {
        return Err(AppError::bad_request("end date precedes start date"));
    }

    let now = utc_now();
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO trips (id, destination, purpose, start_date, end_date, budget, status, \
                            created_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&payload.destination)
    .bind(&payload.purpose)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.budget)
    .bind(ApprovalStatus::Pending.as_str())
    .bind(actor.id.to_string())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let trip: Trip = fetch_trip(&state.pool, id).await?.try_into()?;
    directory
        .log_action(
            Module::Viagens,
            Action::Create,
            format!("Planejou a viagem para '{}'", trip.destination),
        )
        .await;

    Ok((StatusCode::CREATED, Json(trip)))
}

#[utoipa::path(
    put,
    path = "/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    request_body = TripUpdateRequest,
    responses((status = 200, description = "Trip updated", body = Trip))
)]
pub async fn update_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TripUpdateRequest>,
) -> AppResult<Json<Trip>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Viagens, Action::Edit).await?;

    let mut trip = fetch_trip(&state.pool, id).await?;

    if let Some(destination) = payload.destination {
        trip.destination = destination;
    }
    if payload.purpose.is_some() {
        trip.purpose = payload.purpose;
    }
    if let Some(start_date) = payload.start_date {
        trip.start_date = start_date;
    }
    if let Some(end_date) = payload.end_date {
        trip.end_date = end_date;
    }
    if payload.budget.is_some() {
        trip.budget = payload.budget;
    }

    if trip.end_date < trip.start_date {
        return Err(AppError::bad_request("end date precedes start date"));
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE trips SET destination = ?, purpose = ?, start_date = ?, end_date = ?, budget = ?, \
                          updated_at = ? \
         WHERE id = ?",
    )
    .bind(&trip.destination)
    .bind(&trip.purpose)
    .bind(trip.start_date)
    .bind(trip.end_date)
    .bind(trip.budget)
    .bind(now)
    .bind(id.to_string())
    .execute(&state.pool)
    .await?;

    trip.updated_at = now;
    let trip: Trip = trip.try_into()?;
    directory
        .log_action(
            Module::Viagens,
            Action::Edit,
            format!("Atualizou a viagem para '{}'", trip.destination),
        )
        .await;

    Ok(Json(trip))
}

#[utoipa::path(
    post,
    path = "/trips/{id}/decision",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Trip decided", body = Trip),
        (status = 400, description = "Decision must be approved or rejected")
    )
)]
pub async fn decide_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> AppResult<Json<Trip>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Viagens, Action::Approve).await?;

    if payload.status == ApprovalStatus::Pending {
        return Err(AppError::bad_request(
            "a decision must be either approved or rejected",
        ));
    }

    let mut trip = fetch_trip(&state.pool, id).await?;
    let now = utc_now();

    sqlx::query("UPDATE trips SET status = ?, updated_at = ? WHERE id = ?")
        .bind(payload.status.as_str())
        .bind(now)
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    trip.status = payload.status.as_str().to_string();
    trip.updated_at = now;
    let trip: Trip = trip.try_into()?;

    let verb = match payload.status {
        ApprovalStatus::Approved => "Aprovou",
        _ => "Rejeitou",
    };
    directory
        .log_action(
            Module::Viagens,
            Action::Approve,
            format!("{verb} a viagem para '{}'", trip.destination),
        )
        .await;

    Ok(Json(trip))
}

#[utoipa::path(
    delete,
    path = "/trips/{id}",
    tag = "Trips",
    params(("id" = Uuid, Path, description = "Trip id")),
    responses((status = 204, description = "Trip deleted"))
)]
pub async fn delete_trip(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Viagens, Action::Delete).await?;

    let trip = fetch_trip(&state.pool, id).await?;

    sqlx::query("DELETE FROM trips WHERE id = ?")
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    directory
        .log_action(
            Module::Viagens,
            Action::Delete,
            format!("Excluiu a viagem para '{}'", trip.destination),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_trip(pool: &SqlitePool, id: Uuid) -> AppResult<DbTrip> {
    sqlx::query_as::<_, DbTrip>(
        "SELECT id, destination, purpose, start_date, end_date, budget, status, created_by, \
                created_at, updated_at \
         FROM trips WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("trip not found"))
}
