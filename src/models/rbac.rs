use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

// =============================================================================
// CLOSED ENUMERATIONS
// =============================================================================

/// Application modules a permission can be granted on. The wire names are the
/// Portuguese screen names the business uses.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Module {
    Dashboard,
    /// Expense entries
    Lancamentos,
    /// Trip planning
    Viagens,
    /// Personnel
    Colaboradores,
    /// Stores / units
    Unidades,
    /// Company settings
    Configuracoes,
    Tarefas,
    /// Security administration (roles, users, audit trail)
    Seguranca,
}

impl Module {
    pub const ALL: [Module; 8] = [
        Module::Dashboard,
        Module::Lancamentos,
        Module::Viagens,
        Module::Colaboradores,
        Module::Unidades,
        Module::Configuracoes,
        Module::Tarefas,
        Module::Seguranca,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Module::Dashboard => "dashboard",
            Module::Lancamentos => "lancamentos",
            Module::Viagens => "viagens",
            Module::Colaboradores => "colaboradores",
            Module::Unidades => "unidades",
            Module::Configuracoes => "configuracoes",
            Module::Tarefas => "tarefas",
            Module::Seguranca => "seguranca",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|module| module.as_str() == value)
            .ok_or_else(|| AppError::internal(format!("unknown module '{value}'")))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Approve,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Approve,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == value)
            .ok_or_else(|| AppError::internal(format!("unknown action '{value}'")))
    }
}

// =============================================================================
// GRANT TABLE
// =============================================================================

/// Partial mapping of module -> granted actions. A missing module key and a
/// missing action both mean "not granted"; there is no explicit deny.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionGrants(pub BTreeMap<Module, BTreeSet<Action>>);

impl PermissionGrants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.0
            .get(&module)
            .map(|actions| actions.contains(&action))
            .unwrap_or(false)
    }

    pub fn grant(&mut self, module: Module, action: Action) -> &mut Self {
        self.0.entry(module).or_default().insert(action);
        self
    }

    pub fn with(mut self, module: Module, actions: impl IntoIterator<Item = Action>) -> Self {
        self.0.entry(module).or_default().extend(actions);
        self
    }
}

// =============================================================================
// ROLE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Role {
    pub id: Uuid,
    #[schema(example = "Gerente Financeiro")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Never consulted when `is_system_admin` is set.
    #[schema(value_type = Object)]
    pub permissions: PermissionGrants,
    pub is_system_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRole {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: String,
    pub is_system_admin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbRole> for Role {
    type Error = AppError;

    fn try_from(value: DbRole) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|err| AppError::internal(format!("invalid role id '{}': {err}", value.id)))?;
        let permissions: PermissionGrants = serde_json::from_str(&value.permissions)
            .map_err(|err| AppError::internal(format!("invalid grant table for role {id}: {err}")))?;

        Ok(Role {
            id,
            name: value.name,
            description: value.description,
            permissions,
            is_system_admin: value.is_system_admin,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleCreateRequest {
    #[schema(example = "Gerente Financeiro")]
    pub name: String,
    #[schema(example = "Aprova lancamentos e viagens")]
    pub description: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub permissions: PermissionGrants,
    #[serde(default)]
    pub is_system_admin: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoleUpdateRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[schema(value_type = Object)]
    pub permissions: Option<PermissionGrants>,
    pub is_system_admin: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_module_is_the_empty_set() {
        let grants = PermissionGrants::new().with(Module::Lancamentos, [Action::View]);

        assert!(grants.allows(Module::Lancamentos, Action::View));
        assert!(!grants.allows(Module::Lancamentos, Action::Delete));
        assert!(!grants.allows(Module::Viagens, Action::View));
    }

    #[test]
    fn grant_table_round_trips_through_json_column() {
        let grants = PermissionGrants::new()
            .with(Module::Lancamentos, [Action::View, Action::Create])
            .with(Module::Seguranca, [Action::View]);

        let json = serde_json::to_string(&grants).unwrap();
        assert!(json.contains("\"lancamentos\""));

        let parsed: PermissionGrants = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, grants);
    }

    #[test]
    fn duplicate_grants_are_meaningless() {
        let mut grants = PermissionGrants::new();
        grants.grant(Module::Tarefas, Action::Edit);
        grants.grant(Module::Tarefas, Action::Edit);

        assert_eq!(grants.0.get(&Module::Tarefas).unwrap().len(), 1);
    }
}
