use axum::extract::State;
use axum::Json;

use crate::app::AppState;
use crate::errors::AppResult;
use crate::jwt::AuthUser;
use crate::store::InitialData;

/// Everything the client needs after sign-in, in one response. Authentication
/// is the only requirement; per-module grants gate the individual endpoints,
/// not the bundle.
#[utoipa::path(
    get,
    path = "/session/bootstrap",
    tag = "Session",
    responses((status = 200, description = "Consolidated session bundle", body = InitialData))
)]
pub async fn bootstrap(State(state): State<AppState>, auth: AuthUser) -> AppResult<Json<InitialData>> {
    let directory = state.sessions.resolve(&auth.identity()).await;

    Ok(Json(directory.bootstrap().await))
}
