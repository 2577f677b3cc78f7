//! Renewal request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse, Path, Query, ValidatedJson};
use crate::{
    error::AppResult,
    models::renewal::{CreateRenewalRequest, RenewalQuery, RenewalRequest, UpdateRenewalStatus},
    AppState,
};

/// Ask for a later end date on an active loan (loan owner only)
#[utoipa::path(
    post,
    path = "/renewals",
    tag = "renewals",
    security(("bearer_auth" = [])),
    request_body = CreateRenewalRequest,
    responses(
        (status = 201, description = "Renewal request created", body = RenewalRequest),
        (status = 400, description = "Loan not active, date not later, or a renewal is already pending"),
        (status = 403, description = "Not your loan"),
        (status = 404, description = "Borrow request not found")
    )
)]
pub async fn create_renewal(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateRenewalRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RenewalRequest>>)> {
    let created = state.services.renewals.create(&user.actor(), &data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(created, "Renewal request submitted"),
    ))
}

/// List renewal requests (own requests for regular users)
#[utoipa::path(
    get,
    path = "/renewals",
    tag = "renewals",
    security(("bearer_auth" = [])),
    params(RenewalQuery),
    responses(
        (status = 200, description = "Renewal requests", body = PaginatedResponse<RenewalRequest>)
    )
)]
pub async fn list_renewals(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<RenewalQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<RenewalRequest>>>> {
    let page = state.services.renewals.list(&user.actor(), &query).await?;
    Ok(ApiResponse::ok(page.into()))
}

/// Approve or reject a pending renewal (admin)
#[utoipa::path(
    patch,
    path = "/renewals/{id}/status",
    tag = "renewals",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Renewal request ID")),
    request_body = UpdateRenewalStatus,
    responses(
        (status = 200, description = "Renewal decided", body = RenewalRequest),
        (status = 400, description = "Renewal already decided, loan no longer active, or extension overlaps another booking"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Renewal request not found")
    )
)]
pub async fn update_renewal_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(data): ValidatedJson<UpdateRenewalStatus>,
) -> AppResult<Json<ApiResponse<RenewalRequest>>> {
    let updated = state
        .services
        .renewals
        .transition(&user.actor(), id, data.status)
        .await?;
    let message = format!("Renewal request {}", updated.status);
    Ok(ApiResponse::with_message(updated, message))
}
