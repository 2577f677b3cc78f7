//! Business logic services
//!
//! Each lending workflow keeps its decision rules in plain functions (`check_*`, `plan_*`)
//! and runs them inside a database transaction holding the relevant row locks.

pub mod auth;
pub mod borrows;
pub mod departments;
pub mod devices;
pub mod renewals;
pub mod returns;
pub mod users;

use std::sync::Arc;

use crate::{clock::Clock, config::AppConfig, repository::Repository};

/// One page of a listing
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub devices: devices::DevicesService,
    pub departments: departments::DepartmentsService,
    pub borrows: borrows::BorrowsService,
    pub renewals: renewals::RenewalsService,
    pub returns: returns::ReturnsService,
    pub repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let lending = config.lending.clone();
        Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone()),
            users: users::UsersService::new(repository.clone(), lending.clone()),
            devices: devices::DevicesService::new(repository.clone(), lending.clone()),
            departments: departments::DepartmentsService::new(repository.clone()),
            borrows: borrows::BorrowsService::new(repository.clone(), lending.clone(), clock.clone()),
            renewals: renewals::RenewalsService::new(repository.clone(), lending.clone()),
            returns: returns::ReturnsService::new(repository.clone(), lending, clock),
            repository,
        }
    }
}
