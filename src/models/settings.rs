use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Organization-wide configuration. A singleton row, not per-user state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CompanySettings {
    #[schema(example = "Empresa Exemplo LTDA")]
    pub company_name: String,
    #[schema(example = "12.345.678/0001-90")]
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl CompanySettings {
    pub fn named(company_name: impl Into<String>) -> Self {
        CompanySettings {
            company_name: company_name.into(),
            cnpj: None,
            address: None,
            phone: None,
            email: None,
            website: None,
            logo: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SettingsUpdateRequest {
    pub company_name: Option<String>,
    pub cnpj: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    pub logo: Option<String>,
}
