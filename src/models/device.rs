//! Device model and related types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{DeviceCategory, DeviceStatus};

/// Device record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Device {
    pub id: i32,
    pub name: String,
    pub category: DeviceCategory,
    pub status: DeviceStatus,
    pub department_id: Option<i32>,
    /// Manufacturer serial number (unique when set)
    pub serial_number: Option<String>,
    #[schema(value_type = Option<String>, example = "1299.00")]
    pub price: Option<Decimal>,
    /// Free-form specifications (cpu, ram, storage, ...)
    #[schema(value_type = Object)]
    pub specs: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDevice {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: String,
    pub category: DeviceCategory,
    /// Initial status (defaults to available, cannot be borrowed)
    pub status: Option<DeviceStatus>,
    pub department_id: Option<i32>,
    pub serial_number: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<Object>)]
    pub specs: Option<serde_json::Value>,
}

/// Update device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateDevice {
    #[validate(length(min = 1, max = 200, message = "Name must be 1-200 characters"))]
    pub name: Option<String>,
    pub category: Option<DeviceCategory>,
    /// Only allowed while the device is not on loan, and never to borrowed
    pub status: Option<DeviceStatus>,
    pub department_id: Option<i32>,
    pub serial_number: Option<String>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    #[schema(value_type = Option<Object>)]
    pub specs: Option<serde_json::Value>,
}

/// Device query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DeviceQuery {
    pub category: Option<DeviceCategory>,
    pub status: Option<DeviceStatus>,
    pub department_id: Option<i32>,
    /// Search in name and serial number
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
