use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalStatus {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(ApprovalStatus::Pending),
            "approved" => Ok(ApprovalStatus::Approved),
            "rejected" => Ok(ApprovalStatus::Rejected),
            other => Err(AppError::internal(format!("unknown approval status '{other}'"))),
        }
    }
}

/// Decision on a pending expense or trip.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub status: ApprovalStatus,
}

// =============================================================================
// EXPENSE
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: Uuid,
    #[schema(example = "Material de escritorio")]
    pub description: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub expense_date: DateTime<Utc>,
    pub status: ApprovalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbExpense {
    pub id: String,
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub expense_date: DateTime<Utc>,
    pub status: String,
    pub unit_id: Option<String>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbExpense> for Expense {
    type Error = AppError;

    fn try_from(value: DbExpense) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: parse_id("expense", &value.id)?,
            description: value.description,
            amount: value.amount,
            category: value.category,
            expense_date: value.expense_date,
            status: ApprovalStatus::from_str(&value.status)?,
            unit_id: value.unit_id.as_deref().map(|id| parse_id("unit", id)).transpose()?,
            created_by: parse_id("user", &value.created_by)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseCreateRequest {
    #[schema(example = "Material de escritorio")]
    pub description: String,
    pub amount: f64,
    pub category: Option<String>,
    pub expense_date: DateTime<Utc>,
    pub unit_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ExpenseUpdateRequest {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub expense_date: Option<DateTime<Utc>>,
    pub unit_id: Option<Uuid>,
}

// =============================================================================
// TRIP
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Trip {
    pub id: Uuid,
    #[schema(example = "Sao Paulo")]
    pub destination: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    pub status: ApprovalStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTrip {
    pub id: String,
    pub destination: String,
    pub purpose: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget: Option<f64>,
    pub status: String,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbTrip> for Trip {
    type Error = AppError;

    fn try_from(value: DbTrip) -> Result<Self, Self::Error> {
        Ok(Trip {
            id: parse_id("trip", &value.id)?,
            destination: value.destination,
            purpose: value.purpose,
            start_date: value.start_date,
            end_date: value.end_date,
            budget: value.budget,
            status: ApprovalStatus::from_str(&value.status)?,
            created_by: parse_id("user", &value.created_by)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TripCreateRequest {
    #[schema(example = "Sao Paulo")]
    pub destination: String,
    pub purpose: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub budget: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TripUpdateRequest {
    pub destination: Option<String>,
    pub purpose: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub budget: Option<f64>,
}

// =============================================================================
// TASK
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskItem {
    pub id: Uuid,
    #[schema(example = "Fechar folha de pagamento")]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    pub done: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbTaskItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbTaskItem> for TaskItem {
    type Error = AppError;

    fn try_from(value: DbTaskItem) -> Result<Self, Self::Error> {
        Ok(TaskItem {
            id: parse_id("task", &value.id)?,
            title: value.title,
            description: value.description,
            assignee_id: value
                .assignee_id
                .as_deref()
                .map(|id| parse_id("user", id))
                .transpose()?,
            due_date: value.due_date,
            done: value.done,
            created_by: parse_id("user", &value.created_by)?,
            created_at: value.created_at,
            updated_at: value.updated_at,
        })
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TaskCreateRequest {
    #[schema(example = "Fechar folha de pagamento")]
    pub title: String,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TaskUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee_id: Option<Uuid>,
    pub due_date: Option<DateTime<Utc>>,
    pub done: Option<bool>,
}

fn parse_id(kind: &str, value: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(value)
        .map_err(|err| AppError::internal(format!("invalid {kind} id '{value}': {err}")))
}
