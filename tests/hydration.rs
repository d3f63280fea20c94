use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use gestor::authz::SessionPhase;
use gestor::errors::{AppError, AppResult};
use gestor::identity::{AuthSession, Identity, IdentityProvider};
use gestor::models::audit::AuditLogEntry;
use gestor::models::org::{Department, Unit};
use gestor::models::rbac::{PermissionGrants, Role};
use gestor::models::settings::CompanySettings;
use gestor::models::user::UserProfile;
use gestor::notify::TracingNotifier;
use gestor::session::Directory;
use gestor::store::{DashboardSummary, DirectoryStore, InitialData};

/// Store whose consolidated fetch (and optionally the units fetch) is down.
struct FlakyStore {
    roles: Vec<Role>,
    users: Vec<UserProfile>,
    fail_consolidated: bool,
    fail_units: bool,
}

#[async_trait]
impl DirectoryStore for FlakyStore {
    async fn initial_data(&self) -> AppResult<InitialData> {
        if self.fail_consolidated {
            return Err(AppError::internal("consolidated endpoint down"));
        }

        Ok(InitialData {
            roles: self.roles.clone(),
            users: self.users.clone(),
            ..InitialData::default()
        })
    }

    async fn fetch_roles(&self) -> AppResult<Vec<Role>> {
        Ok(self.roles.clone())
    }

    async fn insert_role(&self, _role: &Role) -> AppResult<()> {
        Ok(())
    }

    async fn update_role(&self, _role: &Role) -> AppResult<()> {
        Ok(())
    }

    async fn delete_role(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_users(&self) -> AppResult<Vec<UserProfile>> {
        Ok(self.users.clone())
    }

    async fn insert_user(&self, _user: &UserProfile) -> AppResult<()> {
        Ok(())
    }

    async fn update_user(&self, _user: &UserProfile) -> AppResult<()> {
        Ok(())
    }

    async fn delete_user(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_settings(&self) -> AppResult<Option<CompanySettings>> {
        Ok(None)
    }

    async fn upsert_settings(&self, _settings: &CompanySettings) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_units(&self) -> AppResult<Vec<Unit>> {
        if self.fail_units {
            return Err(AppError::internal("units endpoint down"));
        }
        Ok(Vec::new())
    }

    async fn insert_unit(&self, _unit: &Unit) -> AppResult<()> {
        Ok(())
    }

    async fn update_unit(&self, _unit: &Unit) -> AppResult<()> {
        Ok(())
    }

    async fn delete_unit(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_departments(&self) -> AppResult<Vec<Department>> {
        Ok(Vec::new())
    }

    async fn insert_department(&self, _department: &Department) -> AppResult<()> {
        Ok(())
    }

    async fn delete_department(&self, _id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn recent_audit_entries(&self, _limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        Ok(Vec::new())
    }

    async fn insert_audit_entry(&self, _entry: &AuditLogEntry) -> AppResult<()> {
        Ok(())
    }

    async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        Ok(DashboardSummary::default())
    }
}

/// Sessions under test never touch credentials.
struct NullIdentity;

#[async_trait]
impl IdentityProvider for NullIdentity {
    async fn sign_in(&self, _email: &str, _password: &str) -> AppResult<AuthSession> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> AppResult<Identity> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn request_password_reset(&self, _email: &str) -> AppResult<()> {
        Ok(())
    }

    async fn admin_create_account(&self, _email: &str, _password: &str) -> AppResult<Uuid> {
        Err(AppError::internal("not wired in this test"))
    }

    async fn admin_delete_account(&self, _user_id: Uuid) -> AppResult<()> {
        Ok(())
    }

    async fn admin_set_password(&self, _user_id: Uuid, _new_password: &str) -> AppResult<()> {
        Ok(())
    }
}

fn member_role(name: &str) -> Role {
    let now = Utc::now();
    Role {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        permissions: PermissionGrants::new(),
        is_system_admin: false,
        created_at: now,
        updated_at: now,
    }
}

fn profile(role_id: Uuid, email: &str) -> UserProfile {
    let now = Utc::now();
    UserProfile {
        id: Uuid::new_v4(),
        name: "Bruno".to_string(),
        email: email.to_string(),
        avatar: None,
        role_id,
        department: None,
        position: None,
        is_active: true,
        dark_mode: false,
        created_at: now,
        updated_at: now,
    }
}

fn directory(store: FlakyStore) -> Directory {
    Directory::new(Arc::new(store), Arc::new(NullIdentity), Arc::new(TracingNotifier))
}

#[tokio::test]
async fn consolidated_failure_falls_back_piecewise() {
    let role = member_role("colaborador");
    let role_id = role.id;
    let dir = directory(FlakyStore {
        roles: vec![role],
        users: Vec::new(),
        fail_consolidated: true,
        fail_units: false,
    });

    dir.hydrate(&Identity {
        id: Uuid::new_v4(),
        email: "novo@empresa.com.br".to_string(),
    })
    .await;

    let snapshot = dir.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Ready);
    assert_eq!(dir.roles().await.len(), 1);

    // No profile on file: one is provisioned on the default member role.
    let current = snapshot.user.expect("profile should be provisioned");
    assert_eq!(current.role_id, role_id);
    assert_eq!(current.name, "novo");
}

#[tokio::test]
async fn partial_piecewise_failure_still_reaches_ready() {
    let dir = directory(FlakyStore {
        roles: vec![member_role("colaborador")],
        users: Vec::new(),
        fail_consolidated: true,
        fail_units: true,
    });

    dir.hydrate(&Identity {
        id: Uuid::new_v4(),
        email: "novo@empresa.com.br".to_string(),
    })
    .await;

    // The dead collection hydrates empty; everything else is intact.
    assert_eq!(dir.snapshot().await.phase, SessionPhase::Ready);
    assert!(dir.units().await.is_empty());
    assert_eq!(dir.roles().await.len(), 1);
}

#[tokio::test]
async fn identity_resolves_to_existing_profile_by_email() {
    let role = member_role("Operacional");
    let existing = profile(role.id, "bruno@empresa.com.br");
    let existing_id = existing.id;
    let dir = directory(FlakyStore {
        roles: vec![role],
        users: vec![existing],
        fail_consolidated: false,
        fail_units: false,
    });

    // The identity provider issued a different id for the same address.
    dir.hydrate(&Identity {
        id: Uuid::new_v4(),
        email: "BRUNO@empresa.com.br".to_string(),
    })
    .await;

    let current = dir.current_user().await.expect("profile should resolve");
    assert_eq!(current.id, existing_id);
    assert_eq!(dir.users().await.len(), 1);
}

#[tokio::test]
async fn teardown_returns_to_unauthenticated() {
    let role = member_role("colaborador");
    let dir = directory(FlakyStore {
        roles: vec![role],
        users: Vec::new(),
        fail_consolidated: false,
        fail_units: false,
    });

    dir.hydrate(&Identity {
        id: Uuid::new_v4(),
        email: "novo@empresa.com.br".to_string(),
    })
    .await;
    assert_eq!(dir.snapshot().await.phase, SessionPhase::Ready);

    dir.teardown().await;

    let snapshot = dir.snapshot().await;
    assert_eq!(snapshot.phase, SessionPhase::Unauthenticated);
    assert!(snapshot.user.is_none());
    assert!(dir.roles().await.is_empty());
    assert!(dir.audit_entries().await.is_empty());
}
