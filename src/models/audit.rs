use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::rbac::{Action, Module};

/// One append-only trail entry. `user_name` is denormalized at write time so
/// the trail stays readable after the actor is renamed or removed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_name: String,
    pub module: Module,
    pub action: Action,
    #[schema(example = "Criou a unidade 'Filial Centro'")]
    pub details: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbAuditLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub user_name: String,
    pub module: String,
    pub action: String,
    pub details: String,
}

impl TryFrom<DbAuditLogEntry> for AuditLogEntry {
    type Error = AppError;

    fn try_from(value: DbAuditLogEntry) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|err| AppError::internal(format!("invalid audit id '{}': {err}", value.id)))?;
        let user_id = Uuid::parse_str(&value.user_id).map_err(|err| {
            AppError::internal(format!("invalid audit actor id '{}': {err}", value.user_id))
        })?;

        Ok(AuditLogEntry {
            id,
            timestamp: value.timestamp,
            user_id,
            user_name: value.user_name,
            module: Module::from_str(&value.module)?,
            action: Action::from_str(&value.action)?,
            details: value.details,
        })
    }
}
