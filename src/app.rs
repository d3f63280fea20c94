use std::sync::Arc;

use axum::http::Method;
use axum::routing::{delete, get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::AppError;
use crate::identity::{IdentityProvider, LocalIdentityProvider};
use crate::jwt::JwtConfig;
use crate::notify::{Notifier, TracingNotifier};
use crate::routes::{
    audit_logs, auth, bootstrap, dashboard, departments, expenses, health, roles, settings, tasks,
    trips, units, users,
};
use crate::session::SessionRegistry;
use crate::store::{DirectoryStore, SqliteStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub sessions: Arc<SessionRegistry>,
}

pub async fn create_app(pool: SqlitePool) -> Result<Router, AppError> {
    let jwt = Arc::new(JwtConfig::from_env()?);
    let notifier: Arc<dyn Notifier> = Arc::new(TracingNotifier);
    let store: Arc<dyn DirectoryStore> = Arc::new(SqliteStore::new(pool.clone()));
    let identity: Arc<dyn IdentityProvider> =
        Arc::new(LocalIdentityProvider::new(pool.clone(), Arc::clone(&jwt)));
    let sessions = Arc::new(SessionRegistry::new(store, identity, notifier));

    let state = AppState {
        pool,
        jwt,
        sessions,
    };

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout))
        .route("/password-reset", post(auth::request_password_reset));

    let role_routes = Router::new()
        .route("/", get(roles::list_roles))
        .route("/", post(roles::create_role))
        .route("/:id", put(roles::update_role))
        .route("/:id", delete(roles::delete_role));

    let user_routes = Router::new()
        .route("/", get(users::list_users))
        .route("/", post(users::create_user))
        .route("/:id", put(users::update_user))
        .route("/:id", delete(users::delete_user))
        .route("/:id/status", put(users::set_user_status))
        .route("/:id/password", post(users::admin_reset_password));

    let unit_routes = Router::new()
        .route("/", get(units::list_units))
        .route("/", post(units::create_unit))
        .route("/:id", put(units::update_unit))
        .route("/:id", delete(units::delete_unit));

    let department_routes = Router::new()
        .route("/", get(departments::list_departments))
        .route("/", post(departments::create_department))
        .route("/:id", delete(departments::delete_department));

    let expense_routes = Router::new()
        .route("/", get(expenses::list_expenses))
        .route("/", post(expenses::create_expense))
        .route("/:id", put(expenses::update_expense))
        .route("/:id", delete(expenses::delete_expense))
        .route("/:id/decision", post(expenses::decide_expense));

    let trip_routes = Router::new()
        .route("/", get(trips::list_trips))
        .route("/", post(trips::create_trip))
        .route("/:id", put(trips::update_trip))
        .route("/:id", delete(trips::delete_trip))
        .route("/:id/decision", post(trips::decide_trip));

    let task_routes = Router::new()
        .route("/", get(tasks::list_tasks))
        .route("/", post(tasks::create_task))
        .route("/:id", put(tasks::update_task))
        .route("/:id", delete(tasks::delete_task));

    let router = Router::new()
        .route("/api/health", get(health::health))
        .route("/session/bootstrap", get(bootstrap::bootstrap))
        .route("/dashboard", get(dashboard::summary))
        .route("/audit-logs", get(audit_logs::list_audit_logs))
        .route("/settings", get(settings::get_settings))
        .route("/settings", put(settings::update_settings))
        .nest("/auth", auth_routes)
        .nest("/roles", role_routes)
        .nest("/users", user_routes)
        .nest("/units", unit_routes)
        .nest("/departments", department_routes)
        .nest("/expenses", expense_routes)
        .nest("/trips", trip_routes)
        .nest("/tasks", task_routes)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
