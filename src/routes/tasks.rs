use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::app::AppState;
use crate::errors::{AppError, AppResult};
use crate::jwt::AuthUser;
use crate::models::domain::{DbTaskItem, TaskCreateRequest, TaskItem, TaskUpdateRequest};
use crate::models::rbac::{Action, Module};
use crate::utils::utc_now;

#[utoipa::path(
    get,
    path = "/tasks",
    tag = "Tasks",
    responses((status = 200, description = "List tasks, open first", body = [TaskItem]))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<TaskItem>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Tarefas, Action::View).await?;

    let rows = sqlx::query_as::<_, DbTaskItem>(
        "SELECT id, title, description, assignee_id, due_date, done, created_by, created_at, updated_at \
         FROM tasks ORDER BY done, due_date IS NULL, due_date",
    )
    .fetch_all(&state.pool)
    .await?;

    let tasks: Vec<TaskItem> = rows
        .into_iter()
        .map(TaskItem::try_from)
        .collect::<Result<_, _>>()?;

    Ok(Json(tasks))
}

#[utoipa::path(
    post,
    path = "/tasks",
    tag = "Tasks",
    request_body = TaskCreateRequest,
    responses((status = 201, description = "Task created", body = TaskItem))
)]
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<TaskCreateRequest>,
) -> AppResult<(StatusCode, Json<TaskItem>)> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    let actor = directory.authorize(Module::Tarefas, Action::Create).await?;

    let now = utc_now();
    let id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO tasks (id, title, description, assignee_id, due_date, done, created_by, \
                            created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 0, ?, ?, ?)",
    )
    .bind(id.to_string())
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(payload.assignee_id.map(|assignee| assignee.to_string()))
    .bind(payload.due_date)
    .bind(actor.id.to_string())
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await?;

    let task: TaskItem = fetch_task(&state.pool, id).await?.try_into()?;
    directory
        .log_action(
            Module::Tarefas,
            Action::Create,
            format!("Criou a tarefa '{}'", task.title),
        )
        .await;

    Ok((StatusCode::CREATED, Json(task)))
}

#[utoipa::path(
    put,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    request_body = TaskUpdateRequest,
    responses((status = 200, description = "Task updated", body = TaskItem))
)]
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TaskUpdateRequest>,
) -> AppResult<Json<TaskItem>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Tarefas, Action::Edit).await?;

    let mut task = fetch_task(&state.pool, id).await?;
    let was_done = task.done;

    if let Some(title) = payload.title {
        task.title = title;
    }
    if payload.description.is_some() {
        task.description = payload.description;
    }
    if let Some(assignee_id) = payload.assignee_id {
        task.assignee_id = Some(assignee_id.to_string());
    }
    if payload.due_date.is_some() {
        task.due_date = payload.due_date;
    }
    if let Some(done) = payload.done {
        task.done = done;
    }

    let now = utc_now();
    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, assignee_id = ?, due_date = ?, done = ?, \
                          updated_at = ? \
         WHERE id = ?",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(&task.assignee_id)
    .bind(task.due_date)
    .bind(task.done)
    .bind(now)
    .bind(id.to_string())
    .execute(&state.pool)
    .await?;

    task.updated_at = now;
    let task: TaskItem = task.try_into()?;

    let details = if !was_done && task.done {
        format!("Concluiu a tarefa '{}'", task.title)
    } else {
        format!("Atualizou a tarefa '{}'", task.title)
    };
    directory.log_action(Module::Tarefas, Action::Edit, details).await;

    Ok(Json(task))
}

#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "Tasks",
    params(("id" = Uuid, Path, description = "Task id")),
    responses((status = 204, description = "Task deleted"))
)]
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Tarefas, Action::Delete).await?;

    let task = fetch_task(&state.pool, id).await?;

    sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id.to_string())
        .execute(&state.pool)
        .await?;

    directory
        .log_action(
            Module::Tarefas,
            Action::Delete,
            format!("Excluiu a tarefa '{}'", task.title),
        )
        .await;

    Ok(StatusCode::NO_CONTENT)
}

async fn fetch_task(pool: &SqlitePool, id: Uuid) -> AppResult<DbTaskItem> {
    sqlx::query_as::<_, DbTaskItem>(
        "SELECT id, title, description, assignee_id, due_date, done, created_by, created_at, updated_at \
         FROM tasks WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::not_found("task not found"))
}
