use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::audit::{AuditLogEntry, DbAuditLogEntry};
use crate::models::org::{DbDepartment, DbUnit, Department, Unit};
use crate::models::rbac::{DbRole, Role};
use crate::models::settings::CompanySettings;
use crate::models::user::{DbUserProfile, UserProfile};
use crate::store::{DashboardSummary, DirectoryStore, InitialData};

/// Number of audit entries shipped with the hydration bundle.
const AUDIT_HYDRATION_LIMIT: i64 = 100;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl DirectoryStore for SqliteStore {
    /// Consolidated fetch: one round trip from the caller's perspective. The
    /// individual reads run over the same pool, so a partial outage shows up
    /// as one failed call that the session then retries piecewise.
    async fn initial_data(&self) -> AppResult<InitialData> {
        let roles = self.fetch_roles().await?;
        let users = self.fetch_users().await?;
        let settings = self.fetch_settings().await?;
        let units = self.fetch_units().await?;
        let departments = self.fetch_departments().await?;
        let audit_logs = self.recent_audit_entries(AUDIT_HYDRATION_LIMIT).await?;
        let dashboard = self.dashboard_summary().await.ok();

        Ok(InitialData {
            roles,
            users,
            settings,
            units,
            departments,
            audit_logs,
            dashboard,
        })
    }

    async fn fetch_roles(&self) -> AppResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, DbRole>(
            "SELECT id, name, description, permissions, is_system_admin, created_at, updated_at \
             FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Role::try_from).collect()
    }

    async fn insert_role(&self, role: &Role) -> AppResult<()> {
        let permissions = serde_json::to_string(&role.permissions)
            .map_err(|err| crate::errors::AppError::internal(err.to_string()))?;

        sqlx::query(
            "INSERT INTO roles (id, name, description, permissions, is_system_admin, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(role.id.to_string())
        .bind(&role.name)
        .bind(&role.description)
        .bind(permissions)
        .bind(role.is_system_admin)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_role(&self, role: &Role) -> AppResult<()> {
        let permissions = serde_json::to_string(&role.permissions)
            .map_err(|err| crate::errors::AppError::internal(err.to_string()))?;

        sqlx::query(
            "UPDATE roles SET name = ?, description = ?, permissions = ?, is_system_admin = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&role.name)
        .bind(&role.description)
        .bind(permissions)
        .bind(role.is_system_admin)
        .bind(role.updated_at)
        .bind(role.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_role(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM roles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_users(&self) -> AppResult<Vec<UserProfile>> {
        let rows = sqlx::query_as::<_, DbUserProfile>(
            "SELECT id, name, email, avatar, role_id, department, position, is_active, dark_mode, \
                    created_at, updated_at \
             FROM user_profiles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(UserProfile::try_from).collect()
    }

    async fn insert_user(&self, user: &UserProfile) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_profiles (id, name, email, avatar, role_id, department, position, \
                                        is_active, dark_mode, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(user.role_id.to_string())
        .bind(&user.department)
        .bind(&user.position)
        .bind(user.is_active)
        .bind(user.dark_mode)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_user(&self, user: &UserProfile) -> AppResult<()> {
        sqlx::query(
            "UPDATE user_profiles SET name = ?, email = ?, avatar = ?, role_id = ?, department = ?, \
                                      position = ?, is_active = ?, dark_mode = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.avatar)
        .bind(user.role_id.to_string())
        .bind(&user.department)
        .bind(&user.position)
        .bind(user.is_active)
        .bind(user.dark_mode)
        .bind(user.updated_at)
        .bind(user.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM user_profiles WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_settings(&self) -> AppResult<Option<CompanySettings>> {
        let settings = sqlx::query_as::<_, CompanySettings>(
            "SELECT company_name, cnpj, address, phone, email, website, logo, updated_at \
             FROM company_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    async fn upsert_settings(&self, settings: &CompanySettings) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO company_settings (id, company_name, cnpj, address, phone, email, website, logo, updated_at) \
             VALUES (1, ?, ?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT (id) DO UPDATE SET \
                 company_name = excluded.company_name, cnpj = excluded.cnpj, \
                 address = excluded.address, phone = excluded.phone, email = excluded.email, \
                 website = excluded.website, logo = excluded.logo, updated_at = excluded.updated_at",
        )
        .bind(&settings.company_name)
        .bind(&settings.cnpj)
        .bind(&settings.address)
        .bind(&settings.phone)
        .bind(&settings.email)
        .bind(&settings.website)
        .bind(&settings.logo)
        .bind(settings.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_units(&self) -> AppResult<Vec<Unit>> {
        let rows = sqlx::query_as::<_, DbUnit>(
            "SELECT id, name, address, manager, created_at, updated_at FROM units ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Unit::try_from).collect()
    }

    async fn insert_unit(&self, unit: &Unit) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO units (id, name, address, manager, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(unit.id.to_string())
        .bind(&unit.name)
        .bind(&unit.address)
        .bind(&unit.manager)
        .bind(unit.created_at)
        .bind(unit.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_unit(&self, unit: &Unit) -> AppResult<()> {
        sqlx::query("UPDATE units SET name = ?, address = ?, manager = ?, updated_at = ? WHERE id = ?")
            .bind(&unit.name)
            .bind(&unit.address)
            .bind(&unit.manager)
            .bind(unit.updated_at)
            .bind(unit.id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_unit(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM units WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn fetch_departments(&self) -> AppResult<Vec<Department>> {
        let rows = sqlx::query_as::<_, DbDepartment>(
            "SELECT id, name, created_at FROM departments ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Department::try_from).collect()
    }

    async fn insert_department(&self, department: &Department) -> AppResult<()> {
        sqlx::query("INSERT INTO departments (id, name, created_at) VALUES (?, ?, ?)")
            .bind(department.id.to_string())
            .bind(&department.name)
            .bind(department.created_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_department(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM departments WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn recent_audit_entries(&self, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        let rows = sqlx::query_as::<_, DbAuditLogEntry>(
            "SELECT id, timestamp, user_id, user_name, module, action, details \
             FROM audit_logs ORDER BY timestamp DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn insert_audit_entry(&self, entry: &AuditLogEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO audit_logs (id, timestamp, user_id, user_name, module, action, details) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.timestamp)
        .bind(entry.user_id.to_string())
        .bind(&entry.user_name)
        .bind(entry.module.as_str())
        .bind(entry.action.as_str())
        .bind(&entry.details)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        let expenses_total: f64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE status = 'approved'",
        )
        .fetch_one(&self.pool)
        .await?;

        let pending_expenses: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM expenses WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        let pending_trips: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM trips WHERE status = 'pending'")
                .fetch_one(&self.pool)
                .await?;

        let open_tasks: i64 = sqlx::query_scalar("SELECT COUNT(1) FROM tasks WHERE done = 0")
            .fetch_one(&self.pool)
            .await?;

        let active_users: i64 =
            sqlx::query_scalar("SELECT COUNT(1) FROM user_profiles WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(DashboardSummary {
            expenses_total,
            pending_expenses,
            pending_trips,
            open_tasks,
            active_users,
        })
    }
}
