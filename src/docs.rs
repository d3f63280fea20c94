//! OpenAPI document assembly for the Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::models;
use crate::routes;
use crate::store;

/// Registers the bearer scheme so the Authorize dialog sends the token.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearerAuth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health::health,
        routes::auth::login,
        routes::auth::me,
        routes::auth::logout,
        routes::auth::request_password_reset,
        routes::bootstrap::bootstrap,
        routes::dashboard::summary,
        routes::roles::list_roles,
        routes::roles::create_role,
        routes::roles::update_role,
        routes::roles::delete_role,
        routes::users::list_users,
        routes::users::create_user,
        routes::users::update_user,
        routes::users::set_user_status,
        routes::users::admin_reset_password,
        routes::users::delete_user,
        routes::audit_logs::list_audit_logs,
        routes::settings::get_settings,
        routes::settings::update_settings,
        routes::units::list_units,
        routes::units::create_unit,
        routes::units::update_unit,
        routes::units::delete_unit,
        routes::departments::list_departments,
        routes::departments::create_department,
        routes::departments::delete_department,
        routes::expenses::list_expenses,
        routes::expenses::create_expense,
        routes::expenses::update_expense,
        routes::expenses::decide_expense,
        routes::expenses::delete_expense,
        routes::trips::list_trips,
        routes::trips::create_trip,
        routes::trips::update_trip,
        routes::trips::decide_trip,
        routes::trips::delete_trip,
        routes::tasks::list_tasks,
        routes::tasks::create_task,
        routes::tasks::update_task,
        routes::tasks::delete_task,
    ),
    components(schemas(
        routes::health::HealthResponse,
        routes::auth::LoginRequest,
        routes::auth::LoginResponse,
        routes::auth::PasswordResetRequest,
        routes::auth::MessageResponse,
        models::rbac::Module,
        models::rbac::Action,
        models::rbac::Role,
        models::rbac::RoleCreateRequest,
        models::rbac::RoleUpdateRequest,
        models::user::UserProfile,
        models::user::UserCreateRequest,
        models::user::UserUpdateRequest,
        models::user::UserStatusRequest,
        models::user::AdminResetPasswordRequest,
        models::user::CreatedUser,
        models::settings::CompanySettings,
        models::settings::SettingsUpdateRequest,
        models::org::Unit,
        models::org::UnitCreateRequest,
        models::org::UnitUpdateRequest,
        models::org::Department,
        models::org::DepartmentCreateRequest,
        models::audit::AuditLogEntry,
        models::domain::ApprovalStatus,
        models::domain::DecisionRequest,
        models::domain::Expense,
        models::domain::ExpenseCreateRequest,
        models::domain::ExpenseUpdateRequest,
        models::domain::Trip,
        models::domain::TripCreateRequest,
        models::domain::TripUpdateRequest,
        models::domain::TaskItem,
        models::domain::TaskCreateRequest,
        models::domain::TaskUpdateRequest,
        store::InitialData,
        store::DashboardSummary,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and database checks"),
        (name = "Auth", description = "Sign-in and session lifecycle"),
        (name = "Session", description = "Consolidated session bundle"),
        (name = "Dashboard", description = "Landing screen aggregates"),
        (name = "Security", description = "Roles and the audit trail"),
        (name = "Collaborators", description = "People and departments"),
        (name = "Units", description = "Stores and branches"),
        (name = "Settings", description = "Company configuration"),
        (name = "Expenses", description = "Expense entries and approval"),
        (name = "Trips", description = "Trip planning and approval"),
        (name = "Tasks", description = "Task tracking")
    )
)]
pub struct ApiDoc;
