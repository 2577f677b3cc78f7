//! Return requests: closing a loan and recording device condition

use std::sync::Arc;

use crate::{
    clock::Clock,
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        borrow::BorrowRequest,
        device_return::{CreateReturnRequest, ReturnQuery, ReturnRequest},
        enums::BorrowStatus,
    },
    policy::{authorize, scope_to_owner, Action, Actor},
    repository::{returns::ReturnFilter, Repository},
};

use super::Page;

/// Validate a return submission. Checks run in order and the first failure wins.
pub fn check_new_return<'a>(
    actor: &Actor,
    borrow_request_id: i32,
    loan: Option<&'a BorrowRequest>,
) -> AppResult<&'a BorrowRequest> {
    let loan = loan.ok_or_else(|| {
        AppError::NotFound(format!("Borrow request with id {} not found", borrow_request_id))
    })?;

    if loan.status != BorrowStatus::Active {
        return Err(AppError::InvalidState(format!(
            "Only active loans can be returned (status: {})",
            loan.status
        )));
    }

    authorize(actor, Action::CreateReturn { owner_id: loan.user_id })?;

    Ok(loan)
}

#[derive(Clone)]
pub struct ReturnsService {
    repository: Repository,
    lending: LendingConfig,
    clock: Arc<dyn Clock>,
}

impl ReturnsService {
    pub fn new(repository: Repository, lending: LendingConfig, clock: Arc<dyn Clock>) -> Self {
        Self { repository, lending, clock }
    }

    /// Record a return: closes the loan and sets the device status from its condition
    pub async fn create(&self, actor: &Actor, data: &CreateReturnRequest) -> AppResult<ReturnRequest> {
        // device_id never changes, so it is safe to read before locking
        let current = self.repository.borrows.get_by_id(data.borrow_request_id).await?;

        let mut tx = self.repository.pool.begin().await?;

        self.repository.devices.lock(&mut tx, current.device_id).await?;
        let loan = self.repository.borrows.lock(&mut tx, data.borrow_request_id).await?;

        let loan = check_new_return(actor, data.borrow_request_id, loan.as_ref()).inspect_err(|e| {
            tracing::warn!(borrow_request_id = data.borrow_request_id, "return refused: {}", e)
        })?;

        let device_status = data.device_condition.resulting_device_status();
        let created = self
            .repository
            .returns
            .insert(
                &mut tx,
                loan.id,
                loan.user_id,
                actor.user_id,
                data.device_condition,
                data.notes.as_deref(),
                self.clock.today(),
            )
            .await?;
        self.repository
            .borrows
            .set_status(&mut tx, loan.id, BorrowStatus::Returned)
            .await?;
        self.repository
            .devices
            .set_status(&mut tx, loan.device_id, device_status)
            .await?;

        tx.commit().await?;

        tracing::info!(
            return_id = created.id,
            borrow_request_id = loan.id,
            device_id = loan.device_id,
            "Device returned in {} condition, device now {}",
            created.device_condition,
            device_status
        );
        Ok(created)
    }

    pub async fn list(&self, actor: &Actor, query: &ReturnQuery) -> AppResult<Page<ReturnRequest>> {
        let filter = ReturnFilter {
            borrow_request_id: query.borrow_request_id,
            device_condition: query.device_condition,
            user_id: scope_to_owner(actor, query.user_id)?,
        };
        let (page, per_page) = self.lending.page_bounds(query.page, query.per_page);
        let (items, total) = self.repository.returns.list(&filter, page, per_page).await?;
        Ok(Page { items, total, page, per_page })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::enums::Role,
        services::test_support::{day, loan},
    };

    const OWNER: Actor = Actor { user_id: 10, role: Role::User };
    const STRANGER: Actor = Actor { user_id: 11, role: Role::User };
    const ADMIN: Actor = Actor { user_id: 1, role: Role::Admin };

    #[test]
    fn test_missing_loan() {
        let err = check_new_return(&OWNER, 3, None).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_state_checked_before_ownership() {
        let approved = loan(3, 10, BorrowStatus::Approved, day(1), day(5));
        let err = check_new_return(&STRANGER, 3, Some(&approved)).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }

    #[test]
    fn test_owner_or_admin_may_return() {
        let active = loan(3, 10, BorrowStatus::Active, day(1), day(5));
        assert!(check_new_return(&OWNER, 3, Some(&active)).is_ok());
        assert!(check_new_return(&ADMIN, 3, Some(&active)).is_ok());
        let err = check_new_return(&STRANGER, 3, Some(&active)).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_returned_loan_cannot_be_returned_again() {
        let returned = loan(3, 10, BorrowStatus::Returned, day(1), day(5));
        let err = check_new_return(&OWNER, 3, Some(&returned)).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }
}
