//! Return request endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse, Query, ValidatedJson};
use crate::{
    error::AppResult,
    models::device_return::{CreateReturnRequest, ReturnQuery, ReturnRequest},
    AppState,
};

/// Return a borrowed device, closing the loan (owner or admin)
#[utoipa::path(
    post,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    request_body = CreateReturnRequest,
    responses(
        (status = 201, description = "Device returned", body = ReturnRequest),
        (status = 400, description = "Loan is not active"),
        (status = 403, description = "Not your loan"),
        (status = 404, description = "Borrow request not found")
    )
)]
pub async fn create_return(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateReturnRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<ReturnRequest>>)> {
    let created = state.services.returns.create(&user.actor(), &data).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_message(created, "Device returned")))
}

/// List return requests (own returns for regular users)
#[utoipa::path(
    get,
    path = "/returns",
    tag = "returns",
    security(("bearer_auth" = [])),
    params(ReturnQuery),
    responses(
        (status = 200, description = "Return requests", body = PaginatedResponse<ReturnRequest>)
    )
)]
pub async fn list_returns(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<ReturnQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<ReturnRequest>>>> {
    let page = state.services.returns.list(&user.actor(), &query).await?;
    Ok(ApiResponse::ok(page.into()))
}
