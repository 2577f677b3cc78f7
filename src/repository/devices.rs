//! Devices repository for database operations

use chrono::Utc;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::offset;
use crate::{
    error::{is_foreign_key_violation, map_constraint, AppError, AppResult},
    models::{
        device::{CreateDevice, Device, DeviceQuery, UpdateDevice},
        enums::DeviceStatus,
    },
};

#[derive(Clone)]
pub struct DevicesRepository {
    pool: Pool<Postgres>,
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Device with id {} not found", id))
}

fn write_violation(code: &str) -> AppError {
    if is_foreign_key_violation(code) {
        AppError::Validation("Department does not exist".to_string())
    } else {
        AppError::duplicate("A device with this serial number already exists")
    }
}

impl DevicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List devices with filters and pagination
    pub async fn list(&self, query: &DeviceQuery, page: i64, per_page: i64) -> AppResult<(Vec<Device>, i64)> {
        fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, query: &'a DeviceQuery) {
            builder.push(" WHERE 1=1");
            if let Some(category) = query.category {
                builder.push(" AND category = ").push_bind(category);
            }
            if let Some(status) = query.status {
                builder.push(" AND status = ").push_bind(status);
            }
            if let Some(department_id) = query.department_id {
                builder.push(" AND department_id = ").push_bind(department_id);
            }
            if let Some(ref search) = query.search {
                let pattern = format!("%{}%", search.trim());
                builder
                    .push(" AND (name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR serial_number ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM devices");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::new("SELECT * FROM devices");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY name, id LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset(page, per_page));
        let devices = select.build_query_as::<Device>().fetch_all(&self.pool).await?;

        Ok((devices, total))
    }

    /// Get device by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Device> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Fetch a device and lock its row until the surrounding transaction ends
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(device)
    }

    /// Create a device
    pub async fn create(&self, data: &CreateDevice) -> AppResult<Device> {
        sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (name, category, status, department_id, serial_number, price, specs)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(data.name.trim())
        .bind(data.category)
        .bind(data.status.unwrap_or(DeviceStatus::Available))
        .bind(data.department_id)
        .bind(&data.serial_number)
        .bind(data.price)
        .bind(data.specs.clone().unwrap_or_else(|| serde_json::json!({})))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint(e, write_violation))
    }

    /// Update the provided fields of a device
    pub async fn update(&self, conn: &mut PgConnection, id: i32, data: &UpdateDevice) -> AppResult<Device> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE devices SET updated_at = ");
        builder.push_bind(Utc::now());

        macro_rules! set_field {
            ($field:expr, $name:literal) => {
                if let Some(ref value) = $field {
                    builder.push(concat!(", ", $name, " = ")).push_bind(value.clone());
                }
            };
        }

        set_field!(data.name, "name");
        set_field!(data.category, "category");
        set_field!(data.status, "status");
        set_field!(data.department_id, "department_id");
        set_field!(data.serial_number, "serial_number");
        set_field!(data.price, "price");
        set_field!(data.specs, "specs");

        builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

        builder
            .build_query_as::<Device>()
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| map_constraint(e, write_violation))?
            .ok_or_else(|| not_found(id))
    }

    /// Set device status as a lending side effect
    pub async fn set_status(&self, conn: &mut PgConnection, id: i32, status: DeviceStatus) -> AppResult<()> {
        let result = sqlx::query("UPDATE devices SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(status)
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    /// Delete a device that has never been requested
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM devices WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                map_constraint(e, |_| {
                    AppError::in_use("Device has borrow history and cannot be deleted")
                })
            })?;
        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
