//! Return request model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::DeviceCondition;

/// Record of a device coming back, closing its loan
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ReturnRequest {
    pub id: i32,
    pub borrow_request_id: i32,
    /// Owner of the loan
    pub user_id: i32,
    /// Who filed the return (owner or an administrator)
    pub submitted_by: i32,
    pub device_condition: DeviceCondition,
    pub notes: Option<String>,
    pub return_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReturnRequest {
    pub borrow_request_id: i32,
    pub device_condition: DeviceCondition,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReturnQuery {
    pub borrow_request_id: Option<i32>,
    pub device_condition: Option<DeviceCondition>,
    /// Ignored for non-admin callers, who only see their own records
    pub user_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
