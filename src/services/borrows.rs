//! Borrow request service: booking validation and the status state machine

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        borrow::{BorrowQuery, BorrowRequest, BorrowRequestDetails, CreateBorrowRequest, DateRange},
        device::Device,
        enums::{BorrowStatus, DeviceStatus},
    },
    policy::{authorize, scope_to_owner, Action, Actor},
    repository::{borrows::BorrowFilter, Repository},
};

use super::Page;

/// Outcome of a permitted status change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    pub status: BorrowStatus,
    /// New device status, when the transition moves the device
    pub device_status: Option<DeviceStatus>,
}

/// Validate a new booking. Checks run in order and the first failure wins.
pub fn check_new_borrow(
    device_id: i32,
    device: Option<&Device>,
    range: DateRange,
    max_days: Option<i64>,
    reserving: &[BorrowRequest],
) -> AppResult<()> {
    let device = device.ok_or_else(|| AppError::NotFound(format!("Device with id {} not found", device_id)))?;

    if !range.is_ordered() {
        return Err(AppError::InvalidDateRange("End date must be after start date".to_string()));
    }
    if let Some(max_days) = max_days.filter(|max| range.days() > *max) {
        return Err(AppError::InvalidDateRange(format!(
            "Borrow period cannot exceed {} days",
            max_days
        )));
    }

    if device.status != DeviceStatus::Available {
        return Err(AppError::DeviceUnavailable(format!(
            "Device is not available (status: {})",
            device.status
        )));
    }

    if let Some(existing) = reserving
        .iter()
        .find(|r| r.status.reserves_device() && r.range().overlaps(&range))
    {
        return Err(AppError::booking_conflict(format!(
            "Device is already booked from {} to {}",
            existing.start_date, existing.end_date
        )));
    }

    Ok(())
}

/// Decide a status change and its device side effect.
///
/// `other_active` tells whether another request currently holds the device as an active loan.
pub fn plan_borrow_transition(
    request: &BorrowRequest,
    target: BorrowStatus,
    device: &Device,
    other_active: bool,
) -> AppResult<TransitionPlan> {
    if !request.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition(format!(
            "Cannot change status from {} to {}",
            request.status, target
        )));
    }

    let device_status = match target {
        BorrowStatus::Active => {
            if device.status != DeviceStatus::Available {
                return Err(AppError::DeviceUnavailable(format!(
                    "Device is not available (status: {})",
                    device.status
                )));
            }
            Some(DeviceStatus::Borrowed)
        }
        BorrowStatus::Returned => Some(DeviceStatus::Available),
        BorrowStatus::Rejected if device.status == DeviceStatus::Borrowed && !other_active => {
            Some(DeviceStatus::Available)
        }
        _ => None,
    };

    Ok(TransitionPlan { status: target, device_status })
}

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    lending: LendingConfig,
    clock: Arc<dyn Clock>,
}

impl BorrowsService {
    pub fn new(repository: Repository, lending: LendingConfig, clock: Arc<dyn Clock>) -> Self {
        Self { repository, lending, clock }
    }

    /// Submit a borrow request for the acting user
    pub async fn create(&self, actor: &Actor, data: &CreateBorrowRequest) -> AppResult<BorrowRequest> {
        let range = DateRange::new(data.start_date, data.end_date);

        let mut tx = self.repository.pool.begin().await?;

        let device = self.repository.devices.lock(&mut tx, data.device_id).await?;
        let reserving = self
            .repository
            .borrows
            .reserving_for_device(&mut tx, data.device_id)
            .await?;

        if let Err(e) = check_new_borrow(
            data.device_id,
            device.as_ref(),
            range,
            self.lending.max_borrow_days,
            &reserving,
        ) {
            tracing::warn!(device_id = data.device_id, user_id = actor.user_id, "borrow request refused: {}", e);
            return Err(e);
        }

        let created = self
            .repository
            .borrows
            .insert(
                &mut tx,
                data.device_id,
                actor.user_id,
                data.start_date,
                data.end_date,
                data.reason.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            request_id = created.id,
            device_id = created.device_id,
            user_id = created.user_id,
            "Borrow request created for {} to {}",
            created.start_date,
            created.end_date
        );
        Ok(created)
    }

    /// Move a request through the lifecycle, applying the device side effect atomically
    pub async fn transition(&self, actor: &Actor, id: i32, target: BorrowStatus) -> AppResult<BorrowRequest> {
        authorize(actor, Action::DecideRequest)?;

        // device_id never changes, so it is safe to read before locking
        let current = self.repository.borrows.get_by_id(id).await?;

        let mut tx = self.repository.pool.begin().await?;

        let device = self
            .repository
            .devices
            .lock(&mut tx, current.device_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device with id {} not found", current.device_id)))?;
        let request = self
            .repository
            .borrows
            .lock(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow request with id {} not found", id)))?;

        let other_active = if target == BorrowStatus::Rejected {
            self.repository
                .borrows
                .active_exists(&mut tx, device.id, Some(request.id))
                .await?
        } else {
            false
        };

        let plan = match plan_borrow_transition(&request, target, &device, other_active) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(request_id = id, from = %request.status, to = %target, "transition refused: {}", e);
                return Err(e);
            }
        };

        let updated = self.repository.borrows.set_status(&mut tx, id, plan.status).await?;
        if let Some(device_status) = plan.device_status {
            self.repository
                .devices
                .set_status(&mut tx, device.id, device_status)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(
            request_id = id,
            device_id = device.id,
            actor_id = actor.user_id,
            "Borrow request {} -> {}{}",
            request.status,
            updated.status,
            plan.device_status
                .map(|s| format!(", device now {}", s))
                .unwrap_or_default()
        );
        Ok(updated)
    }

    /// List requests visible to the actor
    pub async fn list(
        &self,
        actor: &Actor,
        query: &BorrowQuery,
    ) -> AppResult<Page<BorrowRequestDetails>> {
        let filter = BorrowFilter {
            status: query.status,
            device_id: query.device_id,
            user_id: scope_to_owner(actor, query.user_id)?,
        };
        self.list_filtered(&filter, query.page, query.per_page).await
    }

    /// List one user's requests
    pub async fn list_for_user(
        &self,
        actor: &Actor,
        user_id: i32,
        query: &BorrowQuery,
    ) -> AppResult<Page<BorrowRequestDetails>> {
        let user_id = scope_to_owner(actor, Some(user_id))?;
        if let Some(user_id) = user_id {
            self.repository.users.get_by_id(user_id).await?;
        }

        let filter = BorrowFilter {
            status: query.status,
            device_id: query.device_id,
            user_id,
        };
        self.list_filtered(&filter, query.page, query.per_page).await
    }

    async fn list_filtered(
        &self,
        filter: &BorrowFilter,
        page: Option<i64>,
        per_page: Option<i64>,
    ) -> AppResult<Page<BorrowRequestDetails>> {
        let (page, per_page) = self.lending.page_bounds(page, per_page);
        let (rows, total) = self.repository.borrows.list(filter, page, per_page).await?;

        let today = self.clock.today();
        let items = rows.into_iter().map(|r| r.with_overdue(today)).collect();
        Ok(Page { items, total, page, per_page })
    }

    /// Get one request, owner or admin only
    pub async fn get(&self, actor: &Actor, id: i32) -> AppResult<BorrowRequestDetails> {
        let details = self.repository.borrows.get_details(id).await?;
        authorize(actor, Action::ViewRequest { owner_id: details.user_id })?;
        Ok(details.with_overdue(self.clock.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{day, device, loan};

    #[test]
    fn test_missing_device_is_reported_first() {
        let err = check_new_borrow(4, None, DateRange::new(day(5), day(1)), None, &[]).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_reversed_range_before_availability() {
        let dev = device(DeviceStatus::Maintenance);
        let err = check_new_borrow(dev.id, Some(&dev), DateRange::new(day(5), day(1)), None, &[]).unwrap_err();
        match err {
            AppError::InvalidDateRange(msg) => assert_eq!(msg, "End date must be after start date"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_same_day_borrow_allowed() {
        let dev = device(DeviceStatus::Available);
        assert!(check_new_borrow(dev.id, Some(&dev), DateRange::new(day(3), day(3)), None, &[]).is_ok());
    }

    #[test]
    fn test_max_borrow_days() {
        let dev = device(DeviceStatus::Available);
        assert!(check_new_borrow(dev.id, Some(&dev), DateRange::new(day(1), day(10)), Some(10), &[]).is_ok());
        let err = check_new_borrow(dev.id, Some(&dev), DateRange::new(day(1), day(11)), Some(10), &[]).unwrap_err();
        assert!(matches!(err, AppError::InvalidDateRange(_)));
    }

    #[test]
    fn test_long_borrow_allowed_by_default() {
        let dev = device(DeviceStatus::Available);
        let start = day(1);
        let range = DateRange::new(start, start + chrono::Duration::days(100));
        let max_days = crate::config::LendingConfig::default().max_borrow_days;
        assert!(check_new_borrow(dev.id, Some(&dev), range, max_days, &[]).is_ok());
    }

    #[test]
    fn test_unavailable_device() {
        let dev = device(DeviceStatus::Borrowed);
        let err = check_new_borrow(dev.id, Some(&dev), DateRange::new(day(1), day(2)), None, &[]).unwrap_err();
        assert!(matches!(err, AppError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_overlap_conflict_and_adjacency() {
        let dev = device(DeviceStatus::Available);
        let existing = [loan(1, 10, BorrowStatus::Approved, day(1), day(5))];

        let err = check_new_borrow(dev.id, Some(&dev), DateRange::new(day(5), day(8)), None, &existing).unwrap_err();
        assert_eq!(err.status_and_code().1, crate::error::ErrorCode::BookingConflict);

        assert!(check_new_borrow(dev.id, Some(&dev), DateRange::new(day(6), day(8)), None, &existing).is_ok());
    }

    #[test]
    fn test_terminal_requests_do_not_block() {
        let dev = device(DeviceStatus::Available);
        let existing = [
            loan(1, 10, BorrowStatus::Rejected, day(1), day(5)),
            loan(2, 10, BorrowStatus::Returned, day(1), day(5)),
        ];
        assert!(check_new_borrow(dev.id, Some(&dev), DateRange::new(day(2), day(3)), None, &existing).is_ok());
    }

    #[test]
    fn test_activation_marks_device_borrowed() {
        let request = loan(1, 10, BorrowStatus::Approved, day(1), day(5));
        let plan = plan_borrow_transition(&request, BorrowStatus::Active, &device(DeviceStatus::Available), false).unwrap();
        assert_eq!(plan.status, BorrowStatus::Active);
        assert_eq!(plan.device_status, Some(DeviceStatus::Borrowed));
    }

    #[test]
    fn test_activation_requires_available_device() {
        let request = loan(1, 10, BorrowStatus::Approved, day(1), day(5));
        let err = plan_borrow_transition(&request, BorrowStatus::Active, &device(DeviceStatus::Maintenance), false)
            .unwrap_err();
        assert!(matches!(err, AppError::DeviceUnavailable(_)));
    }

    #[test]
    fn test_direct_return_frees_device() {
        let request = loan(1, 10, BorrowStatus::Active, day(1), day(5));
        let plan = plan_borrow_transition(&request, BorrowStatus::Returned, &device(DeviceStatus::Borrowed), false).unwrap();
        assert_eq!(plan.device_status, Some(DeviceStatus::Available));
    }

    #[test]
    fn test_rejection_leaves_other_loans_alone() {
        let request = loan(1, 10, BorrowStatus::Pending, day(10), day(12));
        let borrowed = device(DeviceStatus::Borrowed);

        let plan = plan_borrow_transition(&request, BorrowStatus::Rejected, &borrowed, true).unwrap();
        assert_eq!(plan.device_status, None);

        let plan = plan_borrow_transition(&request, BorrowStatus::Rejected, &device(DeviceStatus::Available), false)
            .unwrap();
        assert_eq!(plan.device_status, None);

        let plan = plan_borrow_transition(&request, BorrowStatus::Rejected, &borrowed, false).unwrap();
        assert_eq!(plan.device_status, Some(DeviceStatus::Available));
    }

    #[test]
    fn test_approval_has_no_device_effect() {
        let request = loan(1, 10, BorrowStatus::Pending, day(1), day(5));
        let plan = plan_borrow_transition(&request, BorrowStatus::Approved, &device(DeviceStatus::Available), false).unwrap();
        assert_eq!(plan.device_status, None);
    }

    #[test]
    fn test_terminal_states_are_immutable() {
        for from in [BorrowStatus::Returned, BorrowStatus::Rejected] {
            let request = loan(1, 10, from, day(1), day(5));
            for to in BorrowStatus::ALL {
                let err = plan_borrow_transition(&request, *to, &device(DeviceStatus::Available), false).unwrap_err();
                assert!(matches!(err, AppError::InvalidTransition(_)));
            }
        }
    }

    #[test]
    fn test_skipping_approval_is_rejected() {
        let request = loan(1, 10, BorrowStatus::Pending, day(1), day(5));
        let err = plan_borrow_transition(&request, BorrowStatus::Active, &device(DeviceStatus::Available), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid transition: Cannot change status from pending to active");
    }
}
