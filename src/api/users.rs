//! User management endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse, Path, Query, ValidatedJson};
use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User, UserQuery},
    AppState,
};

/// Result of a password reset
#[derive(Serialize, ToSchema)]
pub struct ResetPasswordResponse {
    /// Temporary password, shown once
    pub temporary_password: String,
}

/// List users with search and pagination (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = PaginatedResponse<User>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<User>>>> {
    let page = state.services.users.list(&user.actor(), &query).await?;
    Ok(ApiResponse::ok(page.into()))
}

/// Get user details by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = User),
        (status = 403, description = "Not your profile"),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<User>>> {
    let found = state.services.users.get(&user.actor(), id).await?;
    Ok(ApiResponse::ok(found))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 400, description = "Invalid input or email already exists"),
        (status = 403, description = "Insufficient privileges for the requested role")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateUser>,
) -> AppResult<(StatusCode, Json<ApiResponse<User>>)> {
    let created = state.services.users.create(&user.actor(), &data).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_message(created, "User created")))
}

/// Update a user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 401, description = "Wrong current password"),
        (status = 403, description = "Insufficient privileges"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(data): ValidatedJson<UpdateUser>,
) -> AppResult<Json<ApiResponse<User>>> {
    let updated = state.services.users.update(&user.actor(), id, &data).await?;
    Ok(ApiResponse::with_message(updated, "User updated"))
}

/// Delete a user (superuser)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 400, description = "User has lending history"),
        (status = 403, description = "Superuser privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.users.delete(&user.actor(), id).await?;
    Ok(ApiResponse::message("User deleted"))
}

/// Reset a user's password to a temporary one (superuser)
#[utoipa::path(
    post,
    path = "/users/{id}/reset-password",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Password reset", body = ResetPasswordResponse),
        (status = 403, description = "Superuser privileges required"),
        (status = 404, description = "User not found")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<ResetPasswordResponse>>> {
    let temporary_password = state.services.users.reset_password(&user.actor(), id).await?;
    Ok(ApiResponse::ok(ResetPasswordResponse { temporary_password }))
}
