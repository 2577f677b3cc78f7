//! Device registry service

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        device::{CreateDevice, Device, DeviceQuery, UpdateDevice},
        enums::DeviceStatus,
    },
    policy::{authorize, Action, Actor},
    repository::Repository,
};

use super::Page;

/// `borrowed` is owned by the lending workflow and never set by hand
fn reject_manual_borrowed(status: Option<DeviceStatus>) -> AppResult<()> {
    if status == Some(DeviceStatus::Borrowed) {
        return Err(AppError::Validation(
            "Status borrowed is set by the lending workflow".to_string(),
        ));
    }
    Ok(())
}

/// Validate a manual status change against the device's lending state
pub fn check_device_status_change(
    device: &Device,
    requested: Option<DeviceStatus>,
    on_loan: bool,
) -> AppResult<()> {
    reject_manual_borrowed(requested)?;

    match requested {
        Some(status) if status != device.status && (on_loan || device.status == DeviceStatus::Borrowed) => {
            Err(AppError::InvalidState(
                "Device status cannot change while it is on loan".to_string(),
            ))
        }
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct DevicesService {
    repository: Repository,
    lending: LendingConfig,
}

impl DevicesService {
    pub fn new(repository: Repository, lending: LendingConfig) -> Self {
        Self { repository, lending }
    }

    pub async fn list(&self, query: &DeviceQuery) -> AppResult<Page<Device>> {
        let (page, per_page) = self.lending.page_bounds(query.page, query.per_page);
        let (items, total) = self.repository.devices.list(query, page, per_page).await?;
        Ok(Page { items, total, page, per_page })
    }

    pub async fn get(&self, id: i32) -> AppResult<Device> {
        self.repository.devices.get_by_id(id).await
    }

    pub async fn create(&self, actor: &Actor, data: &CreateDevice) -> AppResult<Device> {
        authorize(actor, Action::ManageInventory)?;
        reject_manual_borrowed(data.status)?;

        let device = self.repository.devices.create(data).await?;
        tracing::info!(device_id = device.id, "Device created: {}", device.name);
        Ok(device)
    }

    pub async fn update(&self, actor: &Actor, id: i32, data: &UpdateDevice) -> AppResult<Device> {
        authorize(actor, Action::ManageInventory)?;

        let mut tx = self.repository.pool.begin().await?;

        let device = self
            .repository
            .devices
            .lock(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device with id {} not found", id)))?;
        let on_loan = self.repository.borrows.active_exists(&mut tx, id, None).await?;
        check_device_status_change(&device, data.status, on_loan)?;

        let updated = self.repository.devices.update(&mut tx, id, data).await?;
        tx.commit().await?;

        if updated.status != device.status {
            tracing::info!(device_id = id, "Device status {} -> {}", device.status, updated.status);
        }
        Ok(updated)
    }

    pub async fn delete(&self, actor: &Actor, id: i32) -> AppResult<()> {
        authorize(actor, Action::ManageInventory)?;
        self.repository.devices.delete(id).await?;
        tracing::info!(device_id = id, "Device deleted");
        Ok(())
    }
}
