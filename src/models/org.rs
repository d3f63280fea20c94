use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Unit {
    pub id: Uuid,
    #[schema(example = "Filial Centro")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manager: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUnit {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub manager: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUnit> for Unit {
    type Error = AppError;

    fn try_from(value: DbUnit) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|err| AppError::internal(format!("invalid unit id '{}': {err}", value.id)))?;

        Ok(Unit {
            id,
            name: value.name,
            address: value.address,
            manager: value.manager,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UnitCreateRequest {
    #[schema(example = "Filial Centro")]
    pub name: String,
    pub address: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UnitUpdateRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub manager: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Department {
    pub id: Uuid,
    #[schema(example = "Financeiro")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbDepartment {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbDepartment> for Department {
    type Error = AppError;

    fn try_from(value: DbDepartment) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id).map_err(|err| {
            AppError::internal(format!("invalid department id '{}': {err}", value.id))
        })?;

        Ok(Department {
            id,
            name: value.name,
            created_at: value.created_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DepartmentCreateRequest {
    #[schema(example = "Financeiro")]
    pub name: String,
}
