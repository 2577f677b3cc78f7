//! Repository layer for database operations
//!
//! Plain reads go through the pool. Anything that participates in a lending decision takes
//! a `&mut PgConnection` so the service can run the whole check-then-write inside one
//! transaction. Row locks are taken device first, then borrow request, then renewal.

pub mod borrows;
pub mod departments;
pub mod devices;
pub mod renewals;
pub mod returns;
pub mod users;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub devices: devices::DevicesRepository,
    pub departments: departments::DepartmentsRepository,
    pub users: users::UsersRepository,
    pub borrows: borrows::BorrowsRepository,
    pub renewals: renewals::RenewalsRepository,
    pub returns: returns::ReturnsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            devices: devices::DevicesRepository::new(pool.clone()),
            departments: departments::DepartmentsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            renewals: renewals::RenewalsRepository::new(pool.clone()),
            returns: returns::ReturnsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Check database connectivity
    pub async fn ping(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}

/// Row offset for a 1-based page
pub(crate) fn offset(page: i64, per_page: i64) -> i64 {
    (page - 1) * per_page
}
