//! Return requests repository

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::offset;
use crate::{
    error::{map_constraint, AppError, AppResult},
    models::{device_return::ReturnRequest, enums::DeviceCondition},
};

#[derive(Debug, Default, Clone)]
pub struct ReturnFilter {
    pub borrow_request_id: Option<i32>,
    pub device_condition: Option<DeviceCondition>,
    pub user_id: Option<i32>,
}

#[derive(Clone)]
pub struct ReturnsRepository {
    pool: Pool<Postgres>,
}

impl ReturnsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(
        &self,
        filter: &ReturnFilter,
        page: i64,
        per_page: i64,
    ) -> AppResult<(Vec<ReturnRequest>, i64)> {
        fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ReturnFilter) {
            builder.push(" WHERE 1=1");
            if let Some(borrow_request_id) = filter.borrow_request_id {
                builder.push(" AND borrow_request_id = ").push_bind(borrow_request_id);
            }
            if let Some(condition) = filter.device_condition {
                builder.push(" AND device_condition = ").push_bind(condition);
            }
            if let Some(user_id) = filter.user_id {
                builder.push(" AND user_id = ").push_bind(user_id);
            }
        }

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM return_requests");
        push_filters(&mut count, filter);
        let total = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM return_requests");
        push_filters(&mut select, filter);
        select
            .push(" ORDER BY created_at DESC, id DESC LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset(page, per_page));
        let rows = select.build_query_as::<ReturnRequest>().fetch_all(&self.pool).await?;

        Ok((rows, total))
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        conn: &mut PgConnection,
        borrow_request_id: i32,
        user_id: i32,
        submitted_by: i32,
        condition: DeviceCondition,
        notes: Option<&str>,
        return_date: NaiveDate,
    ) -> AppResult<ReturnRequest> {
        sqlx::query_as::<_, ReturnRequest>(
            r#"
            INSERT INTO return_requests
                (borrow_request_id, user_id, submitted_by, device_condition, notes, return_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(borrow_request_id)
        .bind(user_id)
        .bind(submitted_by)
        .bind(condition)
        .bind(notes)
        .bind(return_date)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_constraint(e, |_| AppError::duplicate("This loan has already been returned")))
    }
}
