use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::models::rbac::{Action, Module};
use crate::models::settings::{CompanySettings, SettingsUpdateRequest};

#[utoipa::path(
    get,
    path = "/settings",
    tag = "Settings",
    responses(
        (status = 200, description = "Company settings", body = CompanySettings),
        (status = 404, description = "Settings have never been saved")
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<CompanySettings>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Configuracoes, Action::View)
        .await?;

    let settings = directory
        .settings()
        .await
        .ok_or_else(|| crate::errors::AppError::not_found("settings have not been configured"))?;

    Ok(Json(settings))
}

#[utoipa::path(
    put,
    path = "/settings",
    tag = "Settings",
    request_body = SettingsUpdateRequest,
    responses((status = 200, description = "Settings updated", body = CompanySettings))
)]
pub async fn update_settings(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<SettingsUpdateRequest>,
) -> AppResult<Json<CompanySettings>> {
    let directory = state.sessions.resolve(&auth.identity()).await;
    directory
        .authorize(Module::Configuracoes, Action::Edit)
        .await?;

    let settings = directory.update_settings(payload).await?;

    Ok(Json(settings))
}
