use crate::authz::role_names;
use crate::models::rbac::{Action, Module, Role};
use crate::models::user::UserProfile;

/// Decide whether `user` may perform `action` on `module` against the given
/// role-table snapshot.
///
/// Evaluation order, short-circuiting:
/// 1. inactive user -> deny
/// 2. unresolvable role id -> deny (fails closed)
/// 3. `is_system_admin` role -> allow
/// 4. role named "administrador" (any case) -> allow, legacy carve-out
/// 5. membership in the role's grant table, missing module = empty set
///
/// Pure with respect to its inputs; safe to call on every request.
pub fn evaluate(user: &UserProfile, roles: &[Role], module: Module, action: Action) -> bool {
    if !user.is_active {
        return false;
    }

    let Some(role) = roles.iter().find(|role| role.id == user.role_id) else {
        return false;
    };

    if role.is_system_admin {
        return true;
    }

    if role.name.eq_ignore_ascii_case(role_names::LEGACY_ADMIN) {
        return true;
    }

    role.permissions.allows(module, action)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::rbac::PermissionGrants;

    fn role(name: &str, system_admin: bool, permissions: PermissionGrants) -> Role {
        let now = Utc::now();
        Role {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            permissions,
            is_system_admin: system_admin,
            created_at: now,
            updated_at: now,
        }
    }

    fn user(role_id: Uuid, active: bool) -> UserProfile {
        let now = Utc::now();
        UserProfile {
            id: Uuid::new_v4(),
            name: "Teste".to_string(),
            email: "teste@empresa.com.br".to_string(),
            avatar: None,
            role_id,
            department: None,
            position: None,
            is_active: active,
            dark_mode: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn every_pair() -> impl Iterator<Item = (Module, Action)> {
        Module::ALL
            .into_iter()
            .flat_map(|module| Action::ALL.into_iter().map(move |action| (module, action)))
    }

    #[test]
    fn empty_grant_table_denies_every_pair() {
        let role = role("Operacional", false, PermissionGrants::new());
        let user = user(role.id, true);
        let roles = vec![role];

        for (module, action) in every_pair() {
            assert!(!evaluate(&user, &roles, module, action), "{module}/{action} leaked");
        }
    }

    #[test]
    fn system_admin_allows_every_pair_with_empty_grants() {
        let role = role("TI", true, PermissionGrants::new());
        let user = user(role.id, true);
        let roles = vec![role];

        for (module, action) in every_pair() {
            assert!(evaluate(&user, &roles, module, action), "{module}/{action} denied");
        }
    }

    #[test]
    fn inactive_user_is_locked_out_even_as_system_admin() {
        let role = role("TI", true, PermissionGrants::new());
        let user = user(role.id, false);
        let roles = vec![role];

        for (module, action) in every_pair() {
            assert!(!evaluate(&user, &roles, module, action));
        }
    }

    #[test]
    fn unknown_role_fails_closed() {
        let role = role("Operacional", true, PermissionGrants::new());
        let user = user(Uuid::new_v4(), true);
        let roles = vec![role];

        assert!(!evaluate(&user, &roles, Module::Dashboard, Action::View));
    }

    #[test]
    fn grants_apply_to_the_exact_pair_only() {
        let grants = PermissionGrants::new().with(Module::Lancamentos, [Action::View, Action::Create]);
        let role = role("Financeiro", false, grants);
        let user = user(role.id, true);
        let roles = vec![role];

        assert!(evaluate(&user, &roles, Module::Lancamentos, Action::Create));
        assert!(!evaluate(&user, &roles, Module::Lancamentos, Action::Delete));
        assert!(!evaluate(&user, &roles, Module::Viagens, Action::View));
    }

    #[test]
    fn adding_a_grant_is_monotonic() {
        let grants = PermissionGrants::new().with(Module::Tarefas, [Action::View]);
        let mut role = role("Operacional", false, grants);
        let user = user(role.id, true);

        let before: Vec<bool> = {
            let roles = vec![role.clone()];
            every_pair()
                .map(|(module, action)| evaluate(&user, &roles, module, action))
                .collect()
        };

        role.permissions.grant(Module::Tarefas, Action::Edit);
        let roles = vec![role];

        for ((module, action), was_allowed) in every_pair().zip(before) {
            let now_allowed = evaluate(&user, &roles, module, action);
            if module == Module::Tarefas && action == Action::Edit {
                assert!(!was_allowed && now_allowed);
            } else {
                assert_eq!(was_allowed, now_allowed, "{module}/{action} changed");
            }
        }
    }

    #[test]
    fn administrador_name_grants_everything_regardless_of_case() {
        for name in ["administrador", "Administrador", "ADMINISTRADOR"] {
            let role = role(name, false, PermissionGrants::new());
            let user = user(role.id, true);
            let roles = vec![role];

            for (module, action) in every_pair() {
                assert!(evaluate(&user, &roles, module, action), "{name}: {module}/{action}");
            }
        }
    }
}
