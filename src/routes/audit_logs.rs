use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::audit::AuditLogEntry;
use crate::models::rbac::{Action, Module};

#[utoipa::path(
    get,
    path = "/audit-logs",
    tag = "Security",
    responses((status = 200, description = "Audit trail, newest first", body = [AuditLogEntry]))
)]
pub async fn list_audit_logs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<Vec<AuditLogEntry>>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Seguranca, Action::View).await?;

    Ok(Json(directory.audit_entries().await))
}
