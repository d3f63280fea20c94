//! Per-session directory cache.
//!
//! Every authenticated identity gets one [`Directory`]: an in-memory copy of
//! the role table, user directory, company settings, units and departments,
//! hydrated once at sign-in and kept current by write-through mutations.
//! Mutations apply locally first so the next read already sees the change,
//! then await the durable write; a failed write is reported to the caller but
//! the local copy is not rolled back. With a single operator per session the
//! durable store converges on the next hydration.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::audit::AuditRecorder;
use crate::authz::{role_names, AccessSnapshot, SessionPhase};
use crate::errors::{AppError, AppResult};
use crate::identity::{Identity, IdentityProvider};
use crate::models::audit::AuditLogEntry;
use crate::models::org::{
    Department, DepartmentCreateRequest, Unit, UnitCreateRequest, UnitUpdateRequest,
};
use crate::models::rbac::{Action, Module, Role, RoleCreateRequest, RoleUpdateRequest};
use crate::models::settings::{CompanySettings, SettingsUpdateRequest};
use crate::models::user::{CreatedUser, UserCreateRequest, UserProfile, UserUpdateRequest};
use crate::notify::Notifier;
use crate::store::{DashboardSummary, DirectoryStore, InitialData};
use crate::utils::{generate_temp_password, utc_now};

/// Audit entries pulled when the consolidated fetch is unavailable.
const FALLBACK_AUDIT_LIMIT: i64 = 100;

struct DirectoryInner {
    phase: SessionPhase,
    roles: Vec<Role>,
    users: Vec<UserProfile>,
    settings: Option<CompanySettings>,
    units: Vec<Unit>,
    departments: Vec<Department>,
    current: Option<UserProfile>,
}

impl DirectoryInner {
    fn empty() -> Self {
        DirectoryInner {
            phase: SessionPhase::Unauthenticated,
            roles: Vec::new(),
            users: Vec::new(),
            settings: None,
            units: Vec::new(),
            departments: Vec::new(),
            current: None,
        }
    }
}

pub struct Directory {
    store: Arc<dyn DirectoryStore>,
    identity: Arc<dyn IdentityProvider>,
    audit: AuditRecorder,
    inner: RwLock<DirectoryInner>,
}

impl Directory {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let audit = AuditRecorder::new(Arc::clone(&store), notifier);

        Directory {
            store,
            identity,
            audit,
            inner: RwLock::new(DirectoryInner::empty()),
        }
    }

    // -------------------------------------------------------------------------
    // LIFECYCLE
    // -------------------------------------------------------------------------

    /// Load the session's working set. Prefers the consolidated fetch; if that
    /// fails, falls back to fetching each collection individually, tolerating
    /// per-collection failures. The session always ends up `Ready` so the
    /// caller is never stuck behind a partial outage.
    pub async fn hydrate(&self, who: &Identity) {
        {
            let mut inner = self.inner.write().await;
            inner.phase = SessionPhase::Hydrating;
        }

        let data = match self.store.initial_data().await {
            Ok(data) => data,
            Err(err) => {
                tracing::warn!(%err, "consolidated fetch failed, hydrating piecewise");
                self.fetch_piecewise().await
            }
        };

        self.audit.seed(data.audit_logs).await;

        let mut users = data.users;
        let current = self.resolve_profile(who, &data.roles, &mut users);

        let mut inner = self.inner.write().await;
        inner.roles = data.roles;
        inner.users = users;
        inner.settings = data.settings;
        inner.units = data.units;
        inner.departments = data.departments;
        inner.current = Some(current);
        inner.phase = SessionPhase::Ready;
    }

    async fn fetch_piecewise(&self) -> InitialData {
        let (roles, users, settings, units, departments, audit_logs, dashboard) = tokio::join!(
            self.store.fetch_roles(),
            self.store.fetch_users(),
            self.store.fetch_settings(),
            self.store.fetch_units(),
            self.store.fetch_departments(),
            self.store.recent_audit_entries(FALLBACK_AUDIT_LIMIT),
            self.store.dashboard_summary(),
        );

        fn keep<T: Default>(label: &str, result: AppResult<T>) -> T {
            result.unwrap_or_else(|err| {
                tracing::warn!(%err, collection = label, "piecewise fetch failed, using empty set");
                T::default()
            })
        }

        InitialData {
            roles: keep("roles", roles),
            users: keep("users", users),
            settings: keep("settings", settings),
            units: keep("units", units),
            departments: keep("departments", departments),
            audit_logs: keep("audit_logs", audit_logs),
            dashboard: dashboard.ok(),
        }
    }

    /// Match the authenticated identity to a directory profile, by id first
    /// and then by email. An identity with no profile yet gets a minimal one
    /// on the default member role (or an unresolvable role when that does not
    /// exist, which the evaluator treats as no access).
    fn resolve_profile(
        &self,
        who: &Identity,
        roles: &[Role],
        users: &mut Vec<UserProfile>,
    ) -> UserProfile {
        if let Some(profile) = users
            .iter()
            .find(|user| user.id == who.id || user.email.eq_ignore_ascii_case(&who.email))
        {
            return profile.clone();
        }

        let role_id = roles
            .iter()
            .find(|role| role.name.eq_ignore_ascii_case(role_names::DEFAULT_MEMBER))
            .map(|role| role.id)
            .unwrap_or(Uuid::nil());
        let name = who
            .email
            .split('@')
            .next()
            .unwrap_or(&who.email)
            .to_string();
        let now = utc_now();

        let profile = UserProfile {
            id: who.id,
            name,
            email: who.email.clone(),
            avatar: None,
            role_id,
            department: None,
            position: None,
            is_active: true,
            dark_mode: false,
            created_at: now,
            updated_at: now,
        };

        users.push(profile.clone());

        let store = Arc::clone(&self.store);
        let persisted = profile.clone();
        tokio::spawn(async move {
            if let Err(err) = store.insert_user(&persisted).await {
                tracing::warn!(%err, user_id = %persisted.id, "failed to persist provisioned profile");
            }
        });

        profile
    }

    /// Drop all cached state and return to `Unauthenticated`.
    pub async fn teardown(&self) {
        self.audit.clear().await;
        *self.inner.write().await = DirectoryInner::empty();
    }

    // -------------------------------------------------------------------------
    // READS
    // -------------------------------------------------------------------------

    pub async fn snapshot(&self) -> AccessSnapshot {
        let inner = self.inner.read().await;

        AccessSnapshot {
            phase: inner.phase,
            user: inner.current.clone(),
            roles: inner.roles.clone(),
        }
    }

    /// Gate an operation on the session's grants. Returns the acting profile
    /// on success so callers can attribute the operation.
    pub async fn authorize(&self, module: Module, action: Action) -> AppResult<UserProfile> {
        let snapshot = self.snapshot().await;
        let user = snapshot
            .user
            .clone()
            .ok_or_else(|| AppError::unauthorized("session has no resolved profile"))?;

        if !snapshot.can_render(module, action) {
            return Err(AppError::forbidden(format!(
                "missing {module}/{action} permission"
            )));
        }

        Ok(user)
    }

    /// Record an audit entry attributed to the session's current user.
    pub async fn log_action(&self, module: Module, action: Action, details: impl Into<String>) {
        let current = self.inner.read().await.current.clone();
        match current {
            Some(user) => self.audit.record(&user, module, action, details).await,
            None => tracing::warn!("audit entry dropped, session has no resolved profile"),
        }
    }

    pub async fn roles(&self) -> Vec<Role> {
        self.inner.read().await.roles.clone()
    }

    pub async fn users(&self) -> Vec<UserProfile> {
        self.inner.read().await.users.clone()
    }

    pub async fn settings(&self) -> Option<CompanySettings> {
        self.inner.read().await.settings.clone()
    }

    pub async fn units(&self) -> Vec<Unit> {
        self.inner.read().await.units.clone()
    }

    pub async fn departments(&self) -> Vec<Department> {
        self.inner.read().await.departments.clone()
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.read().await.current.clone()
    }

    pub async fn audit_entries(&self) -> Vec<AuditLogEntry> {
        self.audit.recent().await
    }

    /// Aggregates over rows the cache does not hold, so this always hits the
    /// store.
    pub async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        self.store.dashboard_summary().await
    }

    /// The consolidated bundle served back to the client, assembled from the
    /// cache rather than the store. Dashboard numbers are recomputed since
    /// they aggregate rows the cache does not hold.
    pub async fn bootstrap(&self) -> InitialData {
        let dashboard = self.store.dashboard_summary().await.ok();
        let audit_logs = self.audit.recent().await;
        let inner = self.inner.read().await;

        InitialData {
            roles: inner.roles.clone(),
            users: inner.users.clone(),
            settings: inner.settings.clone(),
            units: inner.units.clone(),
            departments: inner.departments.clone(),
            audit_logs,
            dashboard,
        }
    }

    async fn require_current(&self) -> AppResult<UserProfile> {
        self.inner
            .read()
            .await
            .current
            .clone()
            .ok_or_else(|| AppError::unauthorized("session has no resolved profile"))
    }

    // -------------------------------------------------------------------------
    // ROLES
    // -------------------------------------------------------------------------

    pub async fn create_role(&self, req: RoleCreateRequest) -> AppResult<Role> {
        let actor = self.require_current().await?;
        let now = utc_now();
        let role = Role {
            id: Uuid::new_v4(),
            name: req.name,
            description: req.description,
            permissions: req.permissions,
            is_system_admin: req.is_system_admin,
            created_at: now,
            updated_at: now,
        };

        {
            let mut inner = self.inner.write().await;
            if inner
                .roles
                .iter()
                .any(|existing| existing.name.eq_ignore_ascii_case(&role.name))
            {
                return Err(AppError::conflict("a role with this name already exists"));
            }
            inner.roles.push(role.clone());
        }

        self.audit
            .record(
                &actor,
                Module::Seguranca,
                Action::Create,
                format!("Criou o cargo '{}'", role.name),
            )
            .await;
        self.store.insert_role(&role).await?;

        Ok(role)
    }

    pub async fn update_role(&self, id: Uuid, req: RoleUpdateRequest) -> AppResult<Role> {
        let actor = self.require_current().await?;

        let role = {
            let mut inner = self.inner.write().await;
            let role = inner
                .roles
                .iter_mut()
                .find(|role| role.id == id)
                .ok_or_else(|| AppError::not_found("role not found"))?;

            if let Some(name) = req.name {
                role.name = name;
            }
            if let Some(description) = req.description {
                role.description = Some(description);
            }
            if let Some(permissions) = req.permissions {
                role.permissions = permissions;
            }
            if let Some(is_system_admin) = req.is_system_admin {
                role.is_system_admin = is_system_admin;
            }
            role.updated_at = utc_now();
            role.clone()
        };

        self.audit
            .record(
                &actor,
                Module::Seguranca,
                Action::Edit,
                format!("Atualizou o cargo '{}'", role.name),
            )
            .await;
        self.store.update_role(&role).await?;

        Ok(role)
    }

    pub async fn delete_role(&self, id: Uuid) -> AppResult<()> {
        let actor = self.require_current().await?;

        let role = {
            let mut inner = self.inner.write().await;
            if inner.users.iter().any(|user| user.role_id == id) {
                return Err(AppError::conflict(
                    "role is still assigned to at least one user",
                ));
            }
            let position = inner
                .roles
                .iter()
                .position(|role| role.id == id)
                .ok_or_else(|| AppError::not_found("role not found"))?;
            inner.roles.remove(position)
        };

        self.audit
            .record(
                &actor,
                Module::Seguranca,
                Action::Delete,
                format!("Excluiu o cargo '{}'", role.name),
            )
            .await;
        self.store.delete_role(id).await?;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // USERS
    // -------------------------------------------------------------------------

    /// Provision a collaborator: identity account first (its id becomes the
    /// profile id), then the directory profile. The generated password is
    /// returned exactly once and never stored in the directory.
    pub async fn create_user(&self, req: UserCreateRequest) -> AppResult<CreatedUser> {
        let actor = self.require_current().await?;

        {
            let inner = self.inner.read().await;
            if inner
                .users
                .iter()
                .any(|user| user.email.eq_ignore_ascii_case(&req.email))
            {
                return Err(AppError::conflict("a user with this email already exists"));
            }
        }

        let temp_password = generate_temp_password();
        let id = self
            .identity
            .admin_create_account(&req.email, &temp_password)
            .await?;

        let now = utc_now();
        let user = UserProfile {
            id,
            name: req.name,
            email: req.email,
            avatar: req.avatar,
            role_id: req.role_id,
            department: req.department,
            position: req.position,
            is_active: true,
            dark_mode: false,
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.users.push(user.clone());

        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Create,
                format!("Cadastrou o colaborador '{}'", user.name),
            )
            .await;
        self.store.insert_user(&user).await?;

        Ok(CreatedUser {
            user,
            temp_password,
        })
    }

    pub async fn update_user(&self, id: Uuid, req: UserUpdateRequest) -> AppResult<UserProfile> {
        let actor = self.require_current().await?;

        let user = {
            let mut inner = self.inner.write().await;
            let user = inner
                .users
                .iter_mut()
                .find(|user| user.id == id)
                .ok_or_else(|| AppError::not_found("user not found"))?;

            if let Some(name) = req.name {
                user.name = name;
            }
            if let Some(avatar) = req.avatar {
                user.avatar = Some(avatar);
            }
            if let Some(role_id) = req.role_id {
                user.role_id = role_id;
            }
            if let Some(department) = req.department {
                user.department = Some(department);
            }
            if let Some(position) = req.position {
                user.position = Some(position);
            }
            if let Some(dark_mode) = req.dark_mode {
                user.dark_mode = dark_mode;
            }
            user.updated_at = utc_now();
            let user = user.clone();

            if inner.current.as_ref().map(|current| current.id) == Some(id) {
                inner.current = Some(user.clone());
            }
            user
        };

        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Edit,
                format!("Atualizou o colaborador '{}'", user.name),
            )
            .await;
        self.store.update_user(&user).await?;

        Ok(user)
    }

    pub async fn set_user_active(&self, id: Uuid, is_active: bool) -> AppResult<UserProfile> {
        let actor = self.require_current().await?;

        let user = {
            let mut inner = self.inner.write().await;
            let user = inner
                .users
                .iter_mut()
                .find(|user| user.id == id)
                .ok_or_else(|| AppError::not_found("user not found"))?;
            user.is_active = is_active;
            user.updated_at = utc_now();
            let user = user.clone();

            if inner.current.as_ref().map(|current| current.id) == Some(id) {
                inner.current = Some(user.clone());
            }
            user
        };

        let verb = if is_active { "Ativou" } else { "Desativou" };
        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Edit,
                format!("{verb} o colaborador '{}'", user.name),
            )
            .await;
        self.store.update_user(&user).await?;

        Ok(user)
    }

    /// Remove a collaborator and their identity account. Self-deletion is
    /// rejected before anything is touched, locally or durably.
    pub async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        let actor = self.require_current().await?;
        if actor.id == id {
            return Err(AppError::bad_request(
                "the currently authenticated account cannot delete itself",
            ));
        }

        let user = {
            let mut inner = self.inner.write().await;
            let position = inner
                .users
                .iter()
                .position(|user| user.id == id)
                .ok_or_else(|| AppError::not_found("user not found"))?;
            inner.users.remove(position)
        };

        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Delete,
                format!("Excluiu o colaborador '{}'", user.name),
            )
            .await;
        self.identity.admin_delete_account(id).await?;
        self.store.delete_user(id).await?;

        Ok(())
    }

    /// Out-of-band credential replacement; the target is not asked to
    /// re-authenticate.
    pub async fn admin_reset_password(&self, id: Uuid, new_password: &str) -> AppResult<()> {
        let actor = self.require_current().await?;

        let target = {
            let inner = self.inner.read().await;
            inner
                .users
                .iter()
                .find(|user| user.id == id)
                .cloned()
                .ok_or_else(|| AppError::not_found("user not found"))?
        };

        self.identity.admin_set_password(id, new_password).await?;

        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Edit,
                format!("Redefiniu a senha do colaborador '{}'", target.name),
            )
            .await;

        Ok(())
    }

    // -------------------------------------------------------------------------
    // SETTINGS
    // -------------------------------------------------------------------------

    pub async fn update_settings(&self, req: SettingsUpdateRequest) -> AppResult<CompanySettings> {
        let actor = self.require_current().await?;

        let settings = {
            let mut inner = self.inner.write().await;
            let mut settings = inner
                .settings
                .clone()
                .unwrap_or_else(|| CompanySettings::named(""));

            if let Some(company_name) = req.company_name {
                settings.company_name = company_name;
            }
            if let Some(cnpj) = req.cnpj {
                settings.cnpj = Some(cnpj);
            }
            if let Some(address) = req.address {
                settings.address = Some(address);
            }
            if let Some(phone) = req.phone {
                settings.phone = Some(phone);
            }
            if let Some(email) = req.email {
                settings.email = Some(email);
            }
            if let Some(website) = req.website {
                settings.website = Some(website);
            }
            if let Some(logo) = req.logo {
                settings.logo = Some(logo);
            }
            settings.updated_at = utc_now();

            inner.settings = Some(settings.clone());
            settings
        };

        self.audit
            .record(
                &actor,
                Module::Configuracoes,
                Action::Edit,
                "Atualizou as configuracoes da empresa",
            )
            .await;
        self.store.upsert_settings(&settings).await?;

        Ok(settings)
    }

    // -------------------------------------------------------------------------
    // UNITS AND DEPARTMENTS
    // -------------------------------------------------------------------------

    pub async fn create_unit(&self, req: UnitCreateRequest) -> AppResult<Unit> {
        let actor = self.require_current().await?;
        let now = utc_now();
        let unit = Unit {
            id: Uuid::new_v4(),
            name: req.name,
            address: req.address,
            manager: req.manager,
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.units.push(unit.clone());

        self.audit
            .record(
                &actor,
                Module::Unidades,
                Action::Create,
                format!("Criou a unidade '{}'", unit.name),
            )
            .await;
        self.store.insert_unit(&unit).await?;

        Ok(unit)
    }

    pub async fn update_unit(&self, id: Uuid, req: UnitUpdateRequest) -> AppResult<Unit> {
        let actor = self.require_current().await?;

        let unit = {
            let mut inner = self.inner.write().await;
            let unit = inner
                .units
                .iter_mut()
                .find(|unit| unit.id == id)
                .ok_or_else(|| AppError::not_found("unit not found"))?;

            if let Some(name) = req.name {
                unit.name = name;
            }
            if let Some(address) = req.address {
                unit.address = Some(address);
            }
            if let Some(manager) = req.manager {
                unit.manager = Some(manager);
            }
            unit.updated_at = utc_now();
            unit.clone()
        };

        self.audit
            .record(
                &actor,
                Module::Unidades,
                Action::Edit,
                format!("Atualizou a unidade '{}'", unit.name),
            )
            .await;
        self.store.update_unit(&unit).await?;

        Ok(unit)
    }

    pub async fn delete_unit(&self, id: Uuid) -> AppResult<()> {
        let actor = self.require_current().await?;

        let unit = {
            let mut inner = self.inner.write().await;
            let position = inner
                .units
                .iter()
                .position(|unit| unit.id == id)
                .ok_or_else(|| AppError::not_found("unit not found"))?;
            inner.units.remove(position)
        };

        self.audit
            .record(
                &actor,
                Module::Unidades,
                Action::Delete,
                format!("Excluiu a unidade '{}'", unit.name),
            )
            .await;
        self.store.delete_unit(id).await?;

        Ok(())
    }

    pub async fn create_department(&self, req: DepartmentCreateRequest) -> AppResult<Department> {
        let actor = self.require_current().await?;
        let department = Department {
            id: Uuid::new_v4(),
            name: req.name,
            created_at: utc_now(),
        };

        {
            let mut inner = self.inner.write().await;
            if inner
                .departments
                .iter()
                .any(|existing| existing.name.eq_ignore_ascii_case(&department.name))
            {
                return Err(AppError::conflict(
                    "a department with this name already exists",
                ));
            }
            inner.departments.push(department.clone());
        }

        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Create,
                format!("Criou o departamento '{}'", department.name),
            )
            .await;
        self.store.insert_department(&department).await?;

        Ok(department)
    }

    pub async fn delete_department(&self, id: Uuid) -> AppResult<()> {
        let actor = self.require_current().await?;

        let department = {
            let mut inner = self.inner.write().await;
            let position = inner
                .departments
                .iter()
                .position(|department| department.id == id)
                .ok_or_else(|| AppError::not_found("department not found"))?;
            inner.departments.remove(position)
        };

        self.audit
            .record(
                &actor,
                Module::Colaboradores,
                Action::Delete,
                format!("Excluiu o departamento '{}'", department.name),
            )
            .await;
        self.store.delete_department(id).await?;

        Ok(())
    }
}

/// A token plus the resolved directory profile, handed back at sign-in.
pub struct SignedInSession {
    pub token: String,
    pub user: UserProfile,
}

/// Owns one [`Directory`] per signed-in identity. The first request after
/// sign-in hydrates the cache; sign-out tears it down.
pub struct SessionRegistry {
    store: Arc<dyn DirectoryStore>,
    identity: Arc<dyn IdentityProvider>,
    notifier: Arc<dyn Notifier>,
    sessions: RwLock<HashMap<Uuid, Arc<Directory>>>,
}

impl SessionRegistry {
    pub fn new(
        store: Arc<dyn DirectoryStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        SessionRegistry {
            store,
            identity,
            notifier,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Authenticate and hydrate in one step. Deactivated profiles are turned
    /// away at the door; the evaluator would deny them everywhere anyway.
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<SignedInSession> {
        let session = self.identity.sign_in(email, password).await?;
        let directory = self.resolve(&session.identity).await;
        let user = directory
            .current_user()
            .await
            .ok_or_else(|| AppError::unauthorized("session has no resolved profile"))?;

        if !user.is_active {
            self.end(session.identity.id).await;
            return Err(AppError::forbidden("account is deactivated"));
        }

        Ok(SignedInSession {
            token: session.token,
            user,
        })
    }

    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        self.identity.request_password_reset(email).await
    }

    /// Directory for the given identity, hydrating it on first touch. Two
    /// concurrent first requests may both hydrate; the later insert wins,
    /// which is harmless since both load the same data.
    pub async fn resolve(&self, who: &Identity) -> Arc<Directory> {
        if let Some(directory) = self.sessions.read().await.get(&who.id).cloned() {
            return directory;
        }

        let directory = Arc::new(Directory::new(
            Arc::clone(&self.store),
            Arc::clone(&self.identity),
            Arc::clone(&self.notifier),
        ));
        directory.hydrate(who).await;

        self.sessions
            .write()
            .await
            .insert(who.id, Arc::clone(&directory));

        directory
    }

    /// Tear down the identity's session, if any.
    pub async fn end(&self, user_id: Uuid) {
        let removed = self.sessions.write().await.remove(&user_id);
        if let Some(directory) = removed {
            directory.teardown().await;
        }
    }

    /// Drop every live session resolved to the given user so its next request
    /// rehydrates from the durable rows. Called after another session changes
    /// that user's access; a cached profile must not outlive its revocation.
    pub async fn invalidate_user(&self, user_id: Uuid) {
        let affected = {
            let sessions = self.sessions.read().await;
            let mut keys = Vec::new();
            for (key, directory) in sessions.iter() {
                if *key == user_id {
                    keys.push(*key);
                    continue;
                }
                // The identity may have resolved to a profile under another id
                // (matched by email), so the map key alone is not enough.
                if let Some(current) = directory.current_user().await {
                    if current.id == user_id {
                        keys.push(*key);
                    }
                }
            }
            keys
        };

        for key in affected {
            self.end(key).await;
        }
    }

    /// Same, for every live session whose current user holds the given role.
    /// Grant edits take effect on the holder's next request, not their next
    /// sign-in.
    pub async fn invalidate_role_holders(&self, role_id: Uuid) {
        let affected = {
            let sessions = self.sessions.read().await;
            let mut keys = Vec::new();
            for (key, directory) in sessions.iter() {
                if let Some(current) = directory.current_user().await {
                    if current.role_id == role_id {
                        keys.push(*key);
                    }
                }
            }
            keys
        };

        for key in affected {
            self.end(key).await;
        }
    }
}
