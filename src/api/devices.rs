//! Device registry endpoints

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};

use super::{ApiResponse, AuthenticatedUser, PaginatedResponse, Path, Query, ValidatedJson};
use crate::{
    error::AppResult,
    models::device::{CreateDevice, Device, DeviceQuery, UpdateDevice},
    AppState,
};

/// List devices with filters and pagination
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(DeviceQuery),
    responses(
        (status = 200, description = "List of devices", body = PaginatedResponse<Device>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_devices(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<DeviceQuery>,
) -> AppResult<Json<ApiResponse<PaginatedResponse<Device>>>> {
    let page = state.services.devices.list(&query).await?;
    Ok(ApiResponse::ok(page.into()))
}

/// Get device by ID
#[utoipa::path(
    get,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device details", body = Device),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<Device>>> {
    let device = state.services.devices.get(id).await?;
    Ok(ApiResponse::ok(device))
}

/// Create a device (admin)
#[utoipa::path(
    post,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Invalid input or duplicate serial number"),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn create_device(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ValidatedJson(data): ValidatedJson<CreateDevice>,
) -> AppResult<(StatusCode, Json<ApiResponse<Device>>)> {
    let device = state.services.devices.create(&user.actor(), &data).await?;
    Ok((StatusCode::CREATED, ApiResponse::with_message(device, "Device created")))
}

/// Update a device (admin)
#[utoipa::path(
    put,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    request_body = UpdateDevice,
    responses(
        (status = 200, description = "Device updated", body = Device),
        (status = 400, description = "Invalid input, or status change while on loan"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn update_device(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(data): ValidatedJson<UpdateDevice>,
) -> AppResult<Json<ApiResponse<Device>>> {
    let device = state.services.devices.update(&user.actor(), id, &data).await?;
    Ok(ApiResponse::with_message(device, "Device updated"))
}

/// Delete a device without borrow history (admin)
#[utoipa::path(
    delete,
    path = "/devices/{id}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Device ID")),
    responses(
        (status = 200, description = "Device deleted"),
        (status = 400, description = "Device has borrow history"),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Device not found")
    )
)]
pub async fn delete_device(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.services.devices.delete(&user.actor(), id).await?;
    Ok(ApiResponse::message("Device deleted"))
}
