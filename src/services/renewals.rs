//! Renewal requests: extending an active loan

use chrono::NaiveDate;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        borrow::BorrowRequest,
        enums::{BorrowStatus, RenewalStatus},
        renewal::{CreateRenewalRequest, RenewalQuery, RenewalRequest},
    },
    policy::{authorize, scope_to_owner, Action, Actor},
    repository::{renewals::RenewalFilter, Repository},
};

use super::Page;

/// Validate a renewal submission. Checks run in order and the first failure wins.
pub fn check_new_renewal<'a>(
    actor: &Actor,
    borrow_request_id: i32,
    loan: Option<&'a BorrowRequest>,
    requested_end_date: NaiveDate,
    pending_exists: bool,
) -> AppResult<&'a BorrowRequest> {
    let loan = loan.ok_or_else(|| {
        AppError::NotFound(format!("Borrow request with id {} not found", borrow_request_id))
    })?;

    if loan.status != BorrowStatus::Active {
        return Err(AppError::InvalidState("Loan must be active".to_string()));
    }

    authorize(actor, Action::CreateRenewal { owner_id: loan.user_id })?;

    if requested_end_date <= loan.end_date {
        return Err(AppError::InvalidDateRange(format!(
            "Requested end date must be after the current end date ({})",
            loan.end_date
        )));
    }

    if pending_exists {
        return Err(AppError::duplicate_pending(
            "A renewal request for this loan is already pending",
        ));
    }

    Ok(loan)
}

/// Validate a decision on a renewal. Returns the new loan end date on approval.
pub fn check_renewal_transition(
    renewal: &RenewalRequest,
    target: RenewalStatus,
    loan: &BorrowRequest,
) -> AppResult<Option<NaiveDate>> {
    if target == RenewalStatus::Pending {
        return Err(AppError::Validation("Status must be approved or rejected".to_string()));
    }
    if renewal.status != RenewalStatus::Pending {
        return Err(AppError::InvalidState(format!(
            "Renewal request has already been {}",
            renewal.status
        )));
    }

    match target {
        RenewalStatus::Approved if loan.status != BorrowStatus::Active => {
            Err(AppError::InvalidState("Loan must be active".to_string()))
        }
        RenewalStatus::Approved => Ok(Some(renewal.requested_end_date)),
        _ => Ok(None),
    }
}

#[derive(Clone)]
pub struct RenewalsService {
    repository: Repository,
    lending: LendingConfig,
}

impl RenewalsService {
    pub fn new(repository: Repository, lending: LendingConfig) -> Self {
        Self { repository, lending }
    }

    pub async fn create(&self, actor: &Actor, data: &CreateRenewalRequest) -> AppResult<RenewalRequest> {
        let mut tx = self.repository.pool.begin().await?;

        let loan = self.repository.borrows.lock(&mut tx, data.borrow_request_id).await?;
        let pending_exists = match loan {
            Some(_) => {
                self.repository
                    .renewals
                    .pending_exists(&mut tx, data.borrow_request_id)
                    .await?
            }
            None => false,
        };

        let loan = check_new_renewal(
            actor,
            data.borrow_request_id,
            loan.as_ref(),
            data.requested_end_date,
            pending_exists,
        )
        .inspect_err(|e| {
            tracing::warn!(borrow_request_id = data.borrow_request_id, "renewal refused: {}", e)
        })?;

        let created = self
            .repository
            .renewals
            .insert(
                &mut tx,
                loan.id,
                loan.user_id,
                loan.end_date,
                data.requested_end_date,
                data.reason.as_deref(),
            )
            .await?;

        tx.commit().await?;

        tracing::info!(
            renewal_id = created.id,
            borrow_request_id = loan.id,
            "Renewal requested: {} -> {}",
            created.current_end_date,
            created.requested_end_date
        );
        Ok(created)
    }

    /// Approve or reject a pending renewal
    pub async fn transition(&self, actor: &Actor, id: i32, target: RenewalStatus) -> AppResult<RenewalRequest> {
        authorize(actor, Action::DecideRequest)?;

        let current = self
            .repository
            .renewals
            .get_by_id(id)
            .await?;

        let mut tx = self.repository.pool.begin().await?;

        let loan = self
            .repository
            .borrows
            .lock(&mut tx, current.borrow_request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Borrow request with id {} not found", current.borrow_request_id))
            })?;
        let renewal = self.repository.renewals.lock(&mut tx, id).await?;

        let new_end_date = check_renewal_transition(&renewal, target, &loan).inspect_err(|e| {
            tracing::warn!(renewal_id = id, to = %target, "renewal decision refused: {}", e)
        })?;

        let updated = self.repository.renewals.set_status(&mut tx, id, target).await?;
        if let Some(end_date) = new_end_date {
            self.repository.borrows.set_end_date(&mut tx, loan.id, end_date).await?;
        }

        tx.commit().await?;

        tracing::info!(
            renewal_id = id,
            borrow_request_id = loan.id,
            actor_id = actor.user_id,
            "Renewal {}",
            updated.status
        );
        Ok(updated)
    }

    pub async fn list(&self, actor: &Actor, query: &RenewalQuery) -> AppResult<Page<RenewalRequest>> {
        let filter = RenewalFilter {
            status: query.status,
            borrow_request_id: query.borrow_request_id,
            user_id: scope_to_owner(actor, query.user_id)?,
        };
        let (page, per_page) = self.lending.page_bounds(query.page, query.per_page);
        let (items, total) = self.repository.renewals.list(&filter, page, per_page).await?;
        Ok(Page { items, total, page, per_page })
    }
}
