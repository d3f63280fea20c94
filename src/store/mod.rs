//! Durable row-store boundary.
//!
//! The directory cache talks to persistence exclusively through
//! [`DirectoryStore`], so the backing engine can be swapped (or faked in
//! tests) without touching the session logic. [`sqlite::SqliteStore`] is the
//! production implementation.

pub mod sqlite;

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::audit::AuditLogEntry;
use crate::models::org::{Department, Unit};
use crate::models::rbac::Role;
use crate::models::settings::CompanySettings;
use crate::models::user::UserProfile;

pub use sqlite::SqliteStore;

/// Consolidated hydration bundle: everything one session needs, fetched in a
/// single remote call.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct InitialData {
    pub roles: Vec<Role>,
    pub users: Vec<UserProfile>,
    pub settings: Option<CompanySettings>,
    pub units: Vec<Unit>,
    pub departments: Vec<Department>,
    pub audit_logs: Vec<AuditLogEntry>,
    pub dashboard: Option<DashboardSummary>,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub expenses_total: f64,
    pub pending_expenses: i64,
    pub pending_trips: i64,
    pub open_tasks: i64,
    pub active_users: i64,
}

/// Row CRUD over the directory collections plus the consolidated fetch.
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    async fn initial_data(&self) -> AppResult<InitialData>;

    async fn fetch_roles(&self) -> AppResult<Vec<Role>>;
    async fn insert_role(&self, role: &Role) -> AppResult<()>;
    async fn update_role(&self, role: &Role) -> AppResult<()>;
    async fn delete_role(&self, id: Uuid) -> AppResult<()>;

    async fn fetch_users(&self) -> AppResult<Vec<UserProfile>>;
    async fn insert_user(&self, user: &UserProfile) -> AppResult<()>;
    async fn update_user(&self, user: &UserProfile) -> AppResult<()>;
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    async fn fetch_settings(&self) -> AppResult<Option<CompanySettings>>;
    async fn upsert_settings(&self, settings: &CompanySettings) -> AppResult<()>;

    async fn fetch_units(&self) -> AppResult<Vec<Unit>>;
    async fn insert_unit(&self, unit: &Unit) -> AppResult<()>;
    async fn update_unit(&self, unit: &Unit) -> AppResult<()>;
    async fn delete_unit(&self, id: Uuid) -> AppResult<()>;

    async fn fetch_departments(&self) -> AppResult<Vec<Department>>;
    async fn insert_department(&self, department: &Department) -> AppResult<()>;
    async fn delete_department(&self, id: Uuid) -> AppResult<()>;

    async fn recent_audit_entries(&self, limit: i64) -> AppResult<Vec<AuditLogEntry>>;
    async fn insert_audit_entry(&self, entry: &AuditLogEntry) -> AppResult<()>;

    async fn dashboard_summary(&self) -> AppResult<DashboardSummary>;
}
