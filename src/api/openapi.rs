//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, borrows, departments, devices, health, renewals, returns, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Device Hub API",
        version = "0.3.0",
        description = "Device lending management REST API. Every JSON response is wrapped in \
                       `{success, data?, error?, message?}`; the schemas below describe `data`."
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Devices
        devices::list_devices,
        devices::get_device,
        devices::create_device,
        devices::update_device,
        devices::delete_device,
        // Departments
        departments::list_departments,
        departments::get_department,
        departments::create_department,
        departments::update_department,
        departments::delete_department,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::delete_user,
        users::reset_password,
        // Borrow requests
        borrows::create_borrow_request,
        borrows::list_borrow_requests,
        borrows::list_user_borrow_requests,
        borrows::get_borrow_request,
        borrows::update_borrow_status,
        // Renewals
        renewals::create_renewal,
        renewals::list_renewals,
        renewals::update_renewal_status,
        // Returns
        returns::create_return,
        returns::list_returns,
    ),
    components(
        schemas(
            // Auth
            auth::LoginResponse,
            crate::models::user::LoginRequest,
            // Devices
            crate::models::device::Device,
            crate::models::device::CreateDevice,
            crate::models::device::UpdateDevice,
            crate::models::enums::DeviceCategory,
            crate::models::enums::DeviceStatus,
            // Departments
            crate::models::department::Department,
            crate::models::department::CreateDepartment,
            crate::models::department::UpdateDepartment,
            // Users
            crate::models::user::User,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::enums::Role,
            users::ResetPasswordResponse,
            // Borrow requests
            crate::models::borrow::BorrowRequest,
            crate::models::borrow::BorrowRequestDetails,
            crate::models::borrow::CreateBorrowRequest,
            crate::models::borrow::UpdateBorrowStatus,
            crate::models::enums::BorrowStatus,
            // Renewals
            crate::models::renewal::RenewalRequest,
            crate::models::renewal::CreateRenewalRequest,
            crate::models::renewal::UpdateRenewalStatus,
            crate::models::enums::RenewalStatus,
            // Returns
            crate::models::device_return::ReturnRequest,
            crate::models::device_return::CreateReturnRequest,
            crate::models::enums::DeviceCondition,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "devices", description = "Device inventory"),
        (name = "departments", description = "Departments"),
        (name = "users", description = "User management"),
        (name = "borrow", description = "Borrow requests and their lifecycle"),
        (name = "renewals", description = "Loan renewals"),
        (name = "returns", description = "Device returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
