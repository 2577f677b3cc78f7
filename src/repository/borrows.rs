//! Borrow requests repository

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::offset;
use crate::{
    error::{is_exclusion_violation, map_constraint, AppError, AppResult},
    models::{
        borrow::{BorrowRequest, BorrowRequestDetails},
        enums::BorrowStatus,
    },
};

/// Filters for borrow request listings
#[derive(Debug, Default, Clone)]
pub struct BorrowFilter {
    pub status: Option<BorrowStatus>,
    pub device_id: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

const DETAILS_SELECT: &str = r#"
    SELECT b.id, b.device_id, d.name AS device_name, b.user_id, u.name AS user_name,
           b.start_date, b.end_date, b.reason, b.status, b.created_at, b.updated_at
    FROM borrow_requests b
    JOIN devices d ON d.id = b.device_id
    JOIN users u ON u.id = b.user_id
"#;

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Borrow request with id {} not found", id))
}

fn overlap_violation(code: &str, fallback: &'static str) -> AppError {
    if is_exclusion_violation(code) {
        AppError::booking_conflict("Device is already booked for the selected dates")
    } else {
        AppError::Validation(fallback.to_string())
    }
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List borrow requests with device and user names
    pub async fn list(
        &self,
        filter: &BorrowFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<BorrowRequestDetails>, i64)> {
        fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &BorrowFilter) {
            builder.push(" WHERE 1=1");
            if let Some(status) = filter.status {
                builder.push(" AND b.status = ").push_bind(status);
            }
            if let Some(device_id) = filter.device_id {
                builder.push(" AND b.device_id = ").push_bind(device_id);
            }
            if let Some(user_id) = filter.user_id {
                builder.push(" AND b.user_id = ").push_bind(user_id);
            }
        }

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM borrow_requests b");
        push_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new(DETAILS_SELECT);
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY b.created_at DESC, b.id DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset(page, per_page));
        let rows = select
            .build_query_as::<BorrowRequestDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    /// Get borrow request by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>("SELECT * FROM borrow_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Get borrow request with names by ID
    pub async fn get_details(&self, id: i32) -> AppResult<BorrowRequestDetails> {
        let query = format!("{} WHERE b.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, BorrowRequestDetails>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a borrow request and lock its row
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<BorrowRequest>> {
        let request = sqlx::query_as::<_, BorrowRequest>(
            "SELECT * FROM borrow_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(request)
    }

    /// Requests currently reserving the device (pending, approved or active)
    pub async fn reserving_for_device(
        &self,
        conn: &mut PgConnection,
        device_id: i32,
    ) -> AppResult<Vec<BorrowRequest>> {
        let rows = sqlx::query_as::<_, BorrowRequest>(
            r#"
            SELECT * FROM borrow_requests
            WHERE device_id = $1 AND status IN ('pending', 'approved', 'active')
            ORDER BY start_date
            "#,
        )
        .bind(device_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows)
    }

    /// Whether a request other than `exclude_id` holds the device as an active loan
    pub async fn active_exists(
        &self,
        conn: &mut PgConnection,
        device_id: i32,
        exclude_id: Option<i32>,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_requests
                WHERE device_id = $1 AND status = 'active' AND ($2::INT IS NULL OR id != $2)
            )
            "#,
        )
        .bind(device_id)
        .bind(exclude_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    /// Insert a new pending borrow request
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        device_id: i32,
        user_id: i32,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<&str>,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            r#"
            INSERT INTO borrow_requests (device_id, user_id, start_date, end_date, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(device_id)
        .bind(user_id)
        .bind(start_date)
        .bind(end_date)
        .bind(reason)
        .bind(BorrowStatus::Pending)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_constraint(e, |code| overlap_violation(code, "Device or user does not exist")))
    }

    /// Write a new status
    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: i32,
        status: BorrowStatus,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            "UPDATE borrow_requests SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Move the end date of a loan (renewal approval)
    pub async fn set_end_date(
        &self,
        conn: &mut PgConnection,
        id: i32,
        end_date: NaiveDate,
    ) -> AppResult<BorrowRequest> {
        sqlx::query_as::<_, BorrowRequest>(
            "UPDATE borrow_requests SET end_date = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(end_date)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_constraint(e, |code| overlap_violation(code, "Invalid end date")))?
        .ok_or_else(|| not_found(id))
    }
}
