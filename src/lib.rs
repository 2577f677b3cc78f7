//! Device Hub
//!
//! Device lending management server: an inventory of devices, borrow requests that move
//! through an approval workflow, renewals that extend active loans, and returns that close
//! them and record the device's condition.

use std::sync::Arc;

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
