use serde::Serialize;
use utoipa::ToSchema;

use crate::authz::evaluate;
use crate::models::rbac::{Action, Module};
use crate::models::rbac::Role;
use crate::models::user::UserProfile;

/// Lifecycle of one authenticated session's directory cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Unauthenticated,
    Hydrating,
    Ready,
}

/// Point-in-time view of everything the guard needs: the session phase, the
/// resolved current user and the role table. Cloned out of the directory so
/// evaluation never races a concurrent mutation.
#[derive(Debug, Clone)]
pub struct AccessSnapshot {
    pub phase: SessionPhase,
    pub user: Option<UserProfile>,
    pub roles: Vec<Role>,
}

impl AccessSnapshot {
    pub fn unauthenticated() -> Self {
        AccessSnapshot {
            phase: SessionPhase::Unauthenticated,
            user: None,
            roles: Vec::new(),
        }
    }

    /// Plain permission check against the snapshot. No user means no grants.
    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.user
            .as_ref()
            .map(|user| evaluate(user, &self.roles, module, action))
            .unwrap_or(false)
    }

    /// Render-time gate. While the cache is still hydrating, the dashboard
    /// alone stays visible so a loading skeleton can be shown immediately;
    /// every other module waits for the evaluator's verdict.
    pub fn can_render(&self, module: Module, action: Action) -> bool {
        match self.phase {
            SessionPhase::Unauthenticated => false,
            SessionPhase::Hydrating => module == Module::Dashboard && action == Action::View,
            SessionPhase::Ready => self.allows(module, action),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::rbac::PermissionGrants;

    fn snapshot(phase: SessionPhase) -> AccessSnapshot {
        let now = Utc::now();
        let role = Role {
            id: Uuid::new_v4(),
            name: "Operacional".to_string(),
            description: None,
            permissions: PermissionGrants::new().with(Module::Tarefas, [Action::View]),
            is_system_admin: false,
            created_at: now,
            updated_at: now,
        };
        let user = UserProfile {
            id: Uuid::new_v4(),
            name: "Teste".to_string(),
            email: "teste@empresa.com.br".to_string(),
            avatar: None,
            role_id: role.id,
            department: None,
            position: None,
            is_active: true,
            dark_mode: false,
            created_at: now,
            updated_at: now,
        };

        AccessSnapshot {
            phase,
            user: Some(user),
            roles: vec![role],
        }
    }

    #[test]
    fn dashboard_view_is_visible_while_hydrating() {
        let snap = snapshot(SessionPhase::Hydrating);

        assert!(snap.can_render(Module::Dashboard, Action::View));
        // One-module carve-out, not a general hydration bypass.
        assert!(!snap.can_render(Module::Dashboard, Action::Edit));
        assert!(!snap.can_render(Module::Tarefas, Action::View));
        assert!(!snap.can_render(Module::Seguranca, Action::View));
    }

    #[test]
    fn ready_phase_defers_to_the_evaluator() {
        let snap = snapshot(SessionPhase::Ready);

        assert!(snap.can_render(Module::Tarefas, Action::View));
        assert!(!snap.can_render(Module::Dashboard, Action::View));
    }

    #[test]
    fn unauthenticated_renders_nothing() {
        let snap = AccessSnapshot::unauthenticated();

        assert!(!snap.can_render(Module::Dashboard, Action::View));
        assert!(!snap.allows(Module::Dashboard, Action::View));
    }
}
