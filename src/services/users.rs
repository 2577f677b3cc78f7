//! User management service

use rand::{distributions::Alphanumeric, Rng};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::{
        enums::Role,
        user::{CreateUser, UpdateUser, User, UserQuery},
    },
    policy::{authorize, Action, Actor},
    repository::{users::UserChanges, Repository},
};

use super::{
    auth::{hash_password, verify_password},
    Page,
};

const TEMPORARY_PASSWORD_LEN: usize = 12;

/// Authorize every part of a profile update against the target account
pub fn check_user_update(actor: &Actor, target: &User, data: &UpdateUser) -> AppResult<()> {
    authorize(actor, Action::EditUser { target_id: target.id })?;

    if data.role.is_some_and(|role| role != target.role) {
        authorize(actor, Action::ChangeRole { target_id: target.id })?;
    }
    if data.is_active.is_some_and(|active| active != target.is_active) {
        authorize(actor, Action::DeactivateUser { target_id: target.id })?;
    }
    // Only administrators move people between departments
    if data.department_id.is_some_and(|d| Some(d) != target.department_id) && !actor.is_admin() {
        return Err(AppError::Authorization(
            "Administrator privileges required to change department".to_string(),
        ));
    }
    if data.password.is_some() {
        if actor.user_id != target.id {
            return Err(AppError::Authorization(
                "Use the password reset to change another user's password".to_string(),
            ));
        }
        if data.current_password.is_none() {
            return Err(AppError::Validation(
                "Current password required to change password".to_string(),
            ));
        }
    }
    Ok(())
}

fn temporary_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TEMPORARY_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
    lending: LendingConfig,
}

impl UsersService {
    pub fn new(repository: Repository, lending: LendingConfig) -> Self {
        Self { repository, lending }
    }

    /// Search users
    pub async fn list(&self, actor: &Actor, query: &UserQuery) -> AppResult<Page<User>> {
        authorize(actor, Action::ListUsers)?;
        let (page, per_page) = self.lending.page_bounds(query.page, query.per_page);
        let (items, total) = self.repository.users.search(query, page, per_page).await?;
        Ok(Page { items, total, page, per_page })
    }

    /// Get user by ID
    pub async fn get(&self, actor: &Actor, id: i32) -> AppResult<User> {
        authorize(actor, Action::ViewUser { target_id: id })?;
        self.repository.users.get_by_id(id).await
    }

    /// Create a new user
    pub async fn create(&self, actor: &Actor, data: &CreateUser) -> AppResult<User> {
        let role = data.role.unwrap_or(Role::User);
        authorize(actor, Action::CreateUser { role })?;

        let password_hash = hash_password(&data.password)?;
        let user = self
            .repository
            .users
            .create(&data.name, &data.email, &password_hash, role, data.department_id)
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, created_by = actor.user_id, "User created");
        Ok(user)
    }

    /// Update an existing user
    pub async fn update(&self, actor: &Actor, id: i32, data: &UpdateUser) -> AppResult<User> {
        let target = self.repository.users.get_by_id(id).await?;
        check_user_update(actor, &target, data)?;

        let password_hash = match (&data.password, &data.current_password) {
            (Some(new_password), Some(current_password)) => {
                if !verify_password(&target, current_password)? {
                    return Err(AppError::Authentication("Current password is incorrect".to_string()));
                }
                Some(hash_password(new_password)?)
            }
            _ => None,
        };

        let changes = UserChanges {
            name: data.name.clone(),
            email: data.email.clone(),
            role: data.role,
            department_id: data.department_id,
            is_active: data.is_active,
            password_hash,
        };
        let updated = self.repository.users.update(id, &changes).await?;

        if updated.role != target.role {
            tracing::info!(user_id = id, "Role changed {} -> {}", target.role, updated.role);
        }
        if updated.is_active != target.is_active {
            tracing::info!(user_id = id, is_active = updated.is_active, "Account activation changed");
        }
        Ok(updated)
    }

    /// Delete a user without lending history
    pub async fn delete(&self, actor: &Actor, id: i32) -> AppResult<()> {
        authorize(actor, Action::DeleteUser { target_id: id })?;
        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, deleted_by = actor.user_id, "User deleted");
        Ok(())
    }

    /// Replace a user's password with a random temporary one, which is returned once
    pub async fn reset_password(&self, actor: &Actor, id: i32) -> AppResult<String> {
        authorize(actor, Action::ResetPassword { target_id: id })?;

        let password = temporary_password();
        let changes = UserChanges {
            password_hash: Some(hash_password(&password)?),
            ..Default::default()
        };
        self.repository.users.update(id, &changes).await?;

        tracing::info!(user_id = id, reset_by = actor.user_id, "Password reset");
        Ok(password)
    }

    /// Create the configured superuser when the database has none
    pub async fn ensure_bootstrap_superuser(&self, email: &str, password: &str) -> AppResult<bool> {
        if self.repository.users.superuser_exists().await? {
            return Ok(false);
        }
        if let Some(existing) = self.repository.users.get_by_email(email).await? {
            let changes = UserChanges {
                role: Some(Role::Superuser),
                is_active: Some(true),
                ..Default::default()
            };
            self.repository.users.update(existing.id, &changes).await?;
            tracing::warn!(user_id = existing.id, "Promoted existing account to superuser");
            return Ok(true);
        }

        let password_hash = hash_password(password)?;
        let user = self
            .repository
            .users
            .create("Administrator", email, &password_hash, Role::Superuser, None)
            .await?;
        tracing::info!(user_id = user.id, "Bootstrap superuser created");
        Ok(true)
    }
}
