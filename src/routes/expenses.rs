use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthUser;
use crate::models::domain::{
    ApprovalStatus, DbExpense, DecisionRequest, Expense, ExpenseCreateRequest, ExpenseUpdateRequest,
};
use crate::models::rbac::{Action, Module};
use crate::utils::utc_now;

#[utoipa::path(
    get,
    path = "/expenses",
    tag = "Expenses",
    responses((status = 200, description = "List expense entries", body = [Expense]))
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<Expense>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Lancamentos, Action::View).await?;

    let rows = sqlx::query_as::<_, DbExpense>(
        "SELECT id, description, amount, category, expense_date, status, unit_id, created_by, \
                created_at, updated_at \
         FROM expenses ORDER BY expense_date DESC",
    )
    .fetch_all(&state.pool)
    .await?;

    let expenses: Vec<Expense> = rows
        .into_iter()
        .map(Expense::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(expenses))
}

#[utoipa::path(
    post,
    path = "/expenses",
    tag = "Expenses",
    request_body = ExpenseCreateRequest,
    responses((status = 201, description = "Expense entry created as pending", body = Expense))
)]
pub async fn create_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<ExpenseCreateRequest>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    let actor = directory
        .authorize(Module::Lancamentos, Action::Create)
        .await?;

    let now = utc_now();
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO expenses (id, description, amount, category, expense_date, status, unit_id, \
                               created_by, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&payload.description)
    .bind(payload.amount)
    .bind(&payload.category)
    .bind(payload.expense_date)
    .bind(ApprovalStatus::Pending.as_str())
    .bind(payload.unit_id.map(|unit_id| unit_id.to_string()))
    .bind(actor.id.to_string())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let expense: Expense = fetch_expense(&state.pool, id).await?.try_into()?;
    directory
        .log_action(
            Module::Lancamentos,
            Action::Create,
            format!("Lancou a despesa '{}'", expense.description),
        )
        .await;

    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    put,
    path = "/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    request_body = ExpenseUpdateRequest,
    responses((status = 200, description = "Expense updated", body = Expense))
)]
pub async fn update_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ExpenseUpdateRequest>,
) -> AppResult<Json<Expense>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Lancamentos, Action::Edit).await?;

    let mut expense = fetch_expense(&state.pool, id).await?;

    if let Some(description) = payload.description {
        expense.description = description;
    }
    if let Some(amount) = payload.amount {
        expense.amount = amount;
    }
    if payload.category.is_some() {
        expense.category = payload.category;
    }
    if let Some(expense_date) = payload.expense_date {
        expense.expense_date = expense_date;
    }
    if let Some(unit_id) = payload.unit_id {
        expense.unit_id = Some(unit_id.to_string());
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE expenses SET description = ?, amount = ?, category = ?, expense_date = ?, \
                             unit_id = ?, updated_at = ? \
         WHERE id = ?",
    )
    .bind(&expense.description)
    .bind(expense.amount)
    .bind(&expense.category)
    .bind(expense.expense_date)
    .bind(&expense.unit_id)
    .bind(now)
    .bind(id.to_string())
    .execute(&state.pool)
    .await?;

    expense.updated_at = now;
    let expense: Expense = expense.try_into()?;
    directory
        .log_action(
            Module::Lancamentos,
            Action::Edit,
            format!("Atualizou a despesa '{}'", expense.description),
        )
        .await;

    Ok(Json(expense))
}

#[utoipa::path(
    post,
    path = "/expenses/{id}/decision",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Expense decided", body = Expense),
        (status = 400, description = "Decision must be approved or rejected")
    )
)]
pub async fn decide_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<DecisionRequest>,
) -> AppResult<Json<Expense>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Lancamentos, Action::Approve)
        .await?;

    if payload.status == ApprovalStatus::Pending {
        return Err(AppError::bad_request(
            "a decision must be either approved or rejected",
        ));
    }

    let mut expense = fetch_expense(&state.pool, id).await?;
    let now = utc_now();

    sqlx::query("UPDATE expenses SET status = ?, updated_at = ? WHERE id = ?")
        .bind(payload.status.as_str())
        .bind(now)
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    expense.status = payload.status.as_str().to_string();
    expense.updated_at = now;
    let expense: Expense = expense.try_into()?;

    let verb = match payload.status {
        ApprovalStatus::Approved => "Aprovou",
        _ => "Rejeitou",
    };
    directory
        .log_action(
            Module::Lancamentos,
            Action::Approve,
            format!("{verb} a despesa '{}'", expense.description),
        )
        .await;

    Ok(Json(expense))
}

#[utoipa::path(
    delete,
    path = "/expenses/{id}",
    tag = "Expenses",
    params(("id" = Uuid, Path, description = "Expense id")),
    responses((status = 204, description = "Expense deleted"))
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Lancamentos, Action::Delete)
        .await?;

    let expense = fetch_expense(&state.pool, id).await?;

    sqlx::query("DELETE FROM expenses WHERE id = ?")
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    directory
        .log_action(
            Module::Lancamentos,
            Action::Delete,
            format!("Excluiu a despesa '{}'", expense.description),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_expense(pool: &SqlitePool, id: Uuid) -> AppResult<DbExpense> {
    sqlx::query_as::<_, DbExpense>(
        "SELECT id, description, amount, category, expense_date, status, unit_id, created_by, \
                created_at, updated_at \
         FROM expenses WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("expense not found"))
}
