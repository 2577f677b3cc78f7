//! Renewal requests repository

use chrono::{NaiveDate, Utc};
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::offset;
use crate::{
    error::{map_constraint, AppError, AppResult},
    models::{enums::RenewalStatus, renewal::RenewalRequest},
};

#[derive(Debug, Default, Clone)]
pub struct RenewalFilter {
    pub status: Option<RenewalStatus>,
    pub borrow_request_id: Option<i32>,
    pub user_id: Option<i32>,
}

#[derive(Clone)]
pub struct RenewalsRepository {
    pool: Pool<Postgres>,
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Renewal request with id {} not found", id))
}

impl RenewalsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &RenewalFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<RenewalRequest>, i64)> {
        fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &RenewalFilter) {
            builder.push(" WHERE 1=1");
            if let Some(status) = filter.status {
                builder.push(" AND status = ").push_bind(status);
            }
            if let Some(borrow_request_id) = filter.borrow_request_id {
                builder.push(" AND borrow_request_id = ").push_bind(borrow_request_id);
            }
            if let Some(user_id) = filter.user_id {
                builder.push(" AND user_id = ").push_bind(user_id);
            }
        }

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM renewal_requests");
        push_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM renewal_requests");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset(page, per_page));
        let rows = select.build_query_as::<RenewalRequest>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<RenewalRequest> {
        sqlx::query_as::<_, RenewalRequest>("SELECT * FROM renewal_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a renewal request and lock its row
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<RenewalRequest> {
        sqlx::query_as::<_, RenewalRequest>("SELECT * FROM renewal_requests WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Whether the loan already has a renewal waiting for a decision
    pub async fn pending_exists(&self, conn: &mut PgConnection, borrow_request_id: i32) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM renewal_requests WHERE borrow_request_id = $1 AND status = 'pending')",
        )
        .bind(borrow_request_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        borrow_request_id: i32,
        user_id: i32,
        current_end_date: NaiveDate,
        requested_end_date: NaiveDate,
        reason: Option<&str>,
    ) -> AppResult<RenewalRequest> {
        sqlx::query_as::<_, RenewalRequest>(
            r#"
            INSERT INTO renewal_requests
                (borrow_request_id, user_id, current_end_date, requested_end_date, reason, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(borrow_request_id)
        .bind(user_id)
        .bind(current_end_date)
        .bind(requested_end_date)
        .bind(reason)
        .bind(RenewalStatus::Pending)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            map_constraint(e, |_| {
                AppError::duplicate_pending("A renewal request for this loan is already pending")
            })
        })
    }

    pub async fn set_status(
        &self,
        conn: &mut PgConnection,
        id: i32,
        status: RenewalStatus,
    ) -> AppResult<RenewalRequest> {
        sqlx::query_as::<_, RenewalRequest>(
            "UPDATE renewal_requests SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found(id))
    }
}
