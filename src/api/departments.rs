//! Department endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResponse, AuthenticatedUser, Path, ValidatedJson};
use crate::{
    error::AppResult,
    models::department::{CreateDepartment, Department, UpdateDepartment},
    AppState,
};

/// List departments
#[utoipa::path(
    get,
    path = "/departments",
    tag = "departments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All departments", body = Vec<Department>)
    )
)]
pub async fn list_departments(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<ApiResponse<Vec<Department>>>> {
    let departments = state.services.departments.list().await?;
    Ok(ApiResponse::ok(departments))
}

/// Get department by ID
#[utoipa::path(
    get,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department", body = Department),
        (status = 404, description = "Department not found")
    )
)]
pub async fn get_department(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Department>>> {
    let department = state.services.departments.get(id).await?;
    Ok(ApiResponse::ok(department))
}

/// Create a department (admin)
#[utoipa::path(
    post,
    path = "/departments",
    tag = "departments",
    security(("bearer_auth" = [])),
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_department(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateDepartment>,
) -> AppResult<(StatusCode, Json<ApiResponse<Department>>)> {
    let department = state.services.departments.create(&user.actor(), &data).await?;
    Ok((StatusCode::CREATED, ApiResponse::ok(department)))
}

/// Update a department (admin)
#[utoipa::path(
    put,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    request_body = UpdateDepartment,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Department not found")
    )
)]
pub async fn update_department(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(data): ValidatedJson<UpdateDepartment>,
) -> AppResult<Json<ApiResponse<Department>>> {
    let department = state.services.departments.update(&user.actor(), id, &data).await?;
    Ok(ApiResponse::ok(department))
}

/// Delete a department (admin)
#[utoipa::path(
    delete,
    path = "/departments/{id}",
    tag = "departments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Department not found")
    )
)]
pub async fn delete_department(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.departments.delete(&user.actor(), id).await?;
    Ok(ApiResponse::message("Department deleted"))
}
