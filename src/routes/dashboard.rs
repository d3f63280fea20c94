use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::rbac::{Action, Module};
use crate::store::DashboardSummary;

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Dashboard",
    responses((status = 200, description = "Aggregate numbers for the landing screen", body = DashboardSummary))
)]
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DashboardSummary>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory.authorize(Module::Dashboard, Action::View).await?;

    let summary = directory.dashboard_summary().await?;

    Ok(Json(summary))
}
