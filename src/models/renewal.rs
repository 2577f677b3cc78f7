//! Renewal request model

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::RenewalStatus;

/// Request to extend an active loan
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct RenewalRequest {
    pub id: i32,
    pub borrow_request_id: i32,
    /// Owner of the loan
    pub user_id: i32,
    /// Loan end date when the renewal was submitted
    pub current_end_date: NaiveDate,
    pub requested_end_date: NaiveDate,
    pub reason: Option<String>,
    pub status: RenewalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRenewalRequest {
    pub borrow_request_id: i32,
    #[schema(value_type = String, example = "2024-03-12")]
    pub requested_end_date: NaiveDate,
    #[validate(length(max = 1000, message = "Reason must be at most 1000 characters"))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateRenewalStatus {
    pub status: RenewalStatus,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct RenewalQuery {
    pub status: Option<RenewalStatus>,
    pub borrow_request_id: Option<i32>,
    /// Ignored for non-admin callers, who only see their own records
    pub user_id: Option<i32>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
