use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Directory profile for a person. Credential material never appears here:
/// passwords live exclusively in the identity provider's own storage.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: Uuid,
    #[schema(example = "Ana Souza")]
    pub name: String,
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// May transiently reference a role that has not hydrated yet; the
    /// evaluator fails closed on an unresolvable role.
    pub role_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    pub is_active: bool,
    pub dark_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbUserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: Option<String>,
    pub role_id: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: bool,
    pub dark_mode: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbUserProfile> for UserProfile {
    type Error = AppError;

    fn try_from(value: DbUserProfile) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&value.id)
            .map_err(|err| AppError::internal(format!("invalid user id '{}': {err}", value.id)))?;
        let role_id = Uuid::parse_str(&value.role_id).map_err(|err| {
            AppError::internal(format!("invalid role id '{}': {err}", value.role_id))
        })?;

        Ok(UserProfile {
            id,
            name: value.name,
            email: value.email,
            avatar: value.avatar,
            role_id,
            department: value.department,
            position: value.position,
            is_active: value.is_active,
            dark_mode: value.dark_mode,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserCreateRequest {
    #[schema(example = "Ana Souza")]
    pub name: String,
    #[schema(example = "ana@empresa.com.br")]
    pub email: String,
    pub role_id: Uuid,
    pub department: Option<String>,
    pub position: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserUpdateRequest {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub role_id: Option<Uuid>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub dark_mode: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserStatusRequest {
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AdminResetPasswordRequest {
    #[schema(example = "Nov@SenhaForte1")]
    pub new_password: String,
}

/// Response of user provisioning. `temp_password` is the only place the
/// generated plaintext ever appears; it cannot be fetched again afterwards.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreatedUser {
    pub user: UserProfile,
    pub temp_password: String,
}
