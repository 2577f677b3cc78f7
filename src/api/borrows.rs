//! Borrow request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse, Path, Query, ValidatedJson};
use crate::{
    error::AppResult,
    models::borrow::{BorrowQuery, BorrowRequest, BorrowRequestDetails, CreateBorrowRequest, UpdateBorrowStatus},
    AppState,
};

/// Submit a borrow request
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    request_body = CreateBorrowRequest,
    responses(
        (status = 201, description = "Borrow request created in pending status", body = BorrowRequest),
        (status = 400, description = "Invalid date range, device unavailable or booking conflict"),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn create_borrow_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateBorrowRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<BorrowRequest>>)> {
    let created = state.services.borrows.create(&user.actor(), &data).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(created, "Borrow request submitted"),
    ))
}

/// List borrow requests (own requests for regular users)
#[utoipa::path(
    get,
    path = "/borrow",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(BorrowQuery),
    responses(
        (status = 200, description = "Borrow requests", body = PaginatedResponse<BorrowRequestDetails>),
        (status = 403, description = "Asked for another user's requests")
    )
)]
pub async fn list_borrow_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<BorrowQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<BorrowRequestDetails>>>> {
    let page = state.services.borrows.list(&user.actor(), &query).await?;
    Ok(ApiResponse::ok(page.into()))
}

/// List one user's borrow requests
#[utoipa::path(
    get,
    path = "/borrow/user/{id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "User ID"),
        BorrowQuery
    ),
    responses(
        (status = 200, description = "Borrow requests", body = PaginatedResponse<BorrowRequestDetails>),
        (status = 403, description = "Not your requests"),
        (status = 404, description = "User not found")
    )
)]
pub async fn list_user_borrow_requests(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(user_id): Path<i32>,
    Query(query): Query<BorrowQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<BorrowRequestDetails>>>> {
    let page = state
        .services
        .borrows
        .list_for_user(&user.actor(), user_id, &query)
        .await?;
    Ok(ApiResponse::ok(page.into()))
}

/// Get a borrow request
#[utoipa::path(
    get,
    path = "/borrow/{id}",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    responses(
        (status = 200, description = "Borrow request", body = BorrowRequestDetails),
        (status = 403, description = "Not your request"),
        (status = 404, description = "Borrow request not found")
    )
)]
pub async fn get_borrow_request(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<BorrowRequestDetails>>> {
    let request = state.services.borrows.get(&user.actor(), id).await?;
    Ok(ApiResponse::ok(request))
}

/// Change the status of a borrow request (admin)
#[utoipa::path(
    patch,
    path = "/borrow/{id}/status",
    tag = "borrow",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Borrow request ID")),
    request_body = UpdateBorrowStatus,
    responses(
        (status = 200, description = "Status updated", body = BorrowRequest),
        (status = 400, description = "Transition not allowed or device unavailable"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Borrow request not found")
    )
)]
pub async fn update_borrow_status(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(data): ValidatedJson<UpdateBorrowStatus>,
) -> AppResult<Json<ApiResponse<BorrowRequest>>> {
    let updated = state
        .services
        .borrows
        .transition(&user.actor(), id, data.status)
        .await?;
    let message = format!("Borrow request {}", updated.status);
    Ok(ApiResponse::with_message(updated, message))
}
