//! Error types for Device Hub server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Machine-readable error codes returned in the `error` field of the envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Failure,
    NotAuthenticated,
    Forbidden,
    DbFailure,
    NotFound,
    BadValue,
    InvalidDateRange,
    DeviceUnavailable,
    BookingConflict,
    DuplicatePending,
    Duplicate,
    InUse,
    InvalidTransition,
    InvalidState,
    Unavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Failure => "FAILURE",
            ErrorCode::NotAuthenticated => "NOT_AUTHENTICATED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::DbFailure => "DB_FAILURE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::BadValue => "BAD_VALUE",
            ErrorCode::InvalidDateRange => "INVALID_DATE_RANGE",
            ErrorCode::DeviceUnavailable => "DEVICE_UNAVAILABLE",
            ErrorCode::BookingConflict => "BOOKING_CONFLICT",
            ErrorCode::DuplicatePending => "DUPLICATE_PENDING",
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::InUse => "IN_USE",
            ErrorCode::InvalidTransition => "INVALID_TRANSITION",
            ErrorCode::InvalidState => "INVALID_STATE",
            ErrorCode::Unavailable => "UNAVAILABLE",
        }
    }
}

/// Conflict flavours, all surfaced as 400 with a dedicated code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    Booking,
    DuplicatePending,
    Duplicate,
    /// Record is still referenced and cannot be removed
    InUse,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Forbidden: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Conflict: {1}")]
    Conflict(ConflictKind, String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

impl AppError {
    pub fn booking_conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::Booking, msg.into())
    }

    pub fn duplicate(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::Duplicate, msg.into())
    }

    pub fn duplicate_pending(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::DuplicatePending, msg.into())
    }

    pub fn in_use(msg: impl Into<String>) -> Self {
        AppError::Conflict(ConflictKind::InUse, msg.into())
    }

    /// Status code and error code for this error
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        match self {
            AppError::Authentication(_) => (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthenticated),
            AppError::Authorization(_) => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
            AppError::Validation(_) | AppError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue)
            }
            AppError::InvalidDateRange(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidDateRange),
            AppError::DeviceUnavailable(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::DeviceUnavailable)
            }
            AppError::Conflict(kind, _) => {
                let code = match kind {
                    ConflictKind::Booking => ErrorCode::BookingConflict,
                    ConflictKind::DuplicatePending => ErrorCode::DuplicatePending,
                    ConflictKind::Duplicate => ErrorCode::Duplicate,
                    ConflictKind::InUse => ErrorCode::InUse,
                };
                (StatusCode::BAD_REQUEST, code)
            }
            AppError::InvalidTransition(_) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidTransition)
            }
            AppError::InvalidState(_) => (StatusCode::BAD_REQUEST, ErrorCode::InvalidState),
            AppError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DbFailure),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Failure),
            AppError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, ErrorCode::Unavailable),
        }
    }
}

/// Error response body (the failure side of the response envelope)
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Database error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            AppError::Authentication(msg)
            | AppError::Authorization(msg)
            | AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::InvalidDateRange(msg)
            | AppError::DeviceUnavailable(msg)
            | AppError::Conflict(_, msg)
            | AppError::InvalidTransition(msg)
            | AppError::InvalidState(msg)
            | AppError::BadRequest(msg)
            | AppError::Unavailable(msg) => msg,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: code.as_str().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for {}", field),
                })
            })
            .collect();
        AppError::Validation(messages.join("; "))
    }
}

/// Postgres SQLSTATE codes for constraint violations
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const EXCLUSION_VIOLATION: &str = "23P01";

/// Map a constraint violation to a domain error, passing other errors through
pub fn map_constraint(err: sqlx::Error, on_violation: impl FnOnce(&str) -> AppError) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if let Some(code) = db_err.code() {
            if code == UNIQUE_VIOLATION || code == FOREIGN_KEY_VIOLATION || code == EXCLUSION_VIOLATION {
                return on_violation(code.as_ref());
            }
        }
    }
    AppError::Database(err)
}

/// True if the SQLSTATE is an exclusion constraint violation
pub fn is_exclusion_violation(code: &str) -> bool {
    code == EXCLUSION_VIOLATION
}

/// True if the SQLSTATE is a foreign key violation
pub fn is_foreign_key_violation(code: &str) -> bool {
    code == FOREIGN_KEY_VIOLATION
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
