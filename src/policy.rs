//! Access policy
//!
//! Every role and ownership rule lives here. Handlers and services describe what the
//! caller wants to do as an [`Action`] and ask [`authorize`] whether the [`Actor`] may.

use crate::{
    error::{AppError, AppResult},
    models::enums::Role,
};

/// The authenticated principal performing a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_superuser(&self) -> bool {
        self.role == Role::Superuser
    }
}

/// Something an actor wants to do, with the owner of the target where it matters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// See every borrow/renewal/return record, not just one's own
    ListAllRequests,
    /// Read one borrow/renewal/return record
    ViewRequest { owner_id: i32 },
    /// Approve, reject, activate or close a borrow request, or decide a renewal
    DecideRequest,
    /// File a renewal for a loan (owner only, admins are not implied)
    CreateRenewal { owner_id: i32 },
    /// File a return for a loan (owner or admin)
    CreateReturn { owner_id: i32 },
    /// Create, update or delete devices and departments
    ManageInventory,
    ListUsers,
    CreateUser { role: Role },
    ViewUser { target_id: i32 },
    EditUser { target_id: i32 },
    ChangeRole { target_id: i32 },
    DeactivateUser { target_id: i32 },
    DeleteUser { target_id: i32 },
    ResetPassword { target_id: i32 },
}

/// Decide whether `actor` may perform `action`
pub fn is_allowed(actor: &Actor, action: Action) -> bool {
    match action {
        Action::ListAllRequests | Action::DecideRequest | Action::ManageInventory | Action::ListUsers => {
            actor.is_admin()
        }
        Action::ViewRequest { owner_id } | Action::CreateReturn { owner_id } => {
            actor.user_id == owner_id || actor.is_admin()
        }
        Action::CreateRenewal { owner_id } => actor.user_id == owner_id,
        Action::CreateUser { role } => match role {
            Role::User => actor.is_admin(),
            Role::Admin | Role::Superuser => actor.is_superuser(),
        },
        Action::ViewUser { target_id } | Action::EditUser { target_id } => {
            actor.user_id == target_id || actor.is_admin()
        }
        Action::ChangeRole { target_id } => actor.is_superuser() && actor.user_id != target_id,
        Action::DeactivateUser { target_id } => actor.is_admin() && actor.user_id != target_id,
        Action::DeleteUser { target_id } => actor.is_superuser() && actor.user_id != target_id,
        Action::ResetPassword { .. } => actor.is_superuser(),
    }
}

/// Like [`is_allowed`], turning a denial into a 403 with a readable reason
pub fn authorize(actor: &Actor, action: Action) -> AppResult<()> {
    if is_allowed(actor, action) {
        return Ok(());
    }

    let message = match action {
        Action::ListAllRequests | Action::ListUsers => "Administrator privileges required",
        Action::DecideRequest => "Only administrators can change request status",
        Action::ViewRequest { .. } => "You can only view your own requests",
        Action::CreateRenewal { .. } => "You can only renew your own loans",
        Action::CreateReturn { .. } => "You can only return your own loans",
        Action::ManageInventory => "Administrator privileges required to manage inventory",
        Action::CreateUser { .. } => "Insufficient privileges to create a user with this role",
        Action::ViewUser { .. } | Action::EditUser { .. } => "You can only access your own profile",
        Action::ChangeRole { target_id } if target_id == actor.user_id => "You cannot change your own role",
        Action::ChangeRole { .. } => "Superuser privileges required to change roles",
        Action::DeactivateUser { target_id } if target_id == actor.user_id => {
            "You cannot deactivate your own account"
        }
        Action::DeactivateUser { .. } => "Administrator privileges required",
        Action::DeleteUser { target_id } if target_id == actor.user_id => "You cannot delete your own account",
        Action::DeleteUser { .. } => "Superuser privileges required to delete users",
        Action::ResetPassword { .. } => "Superuser privileges required to reset passwords",
    };

    tracing::debug!(user_id = actor.user_id, role = %actor.role, ?action, "access denied");
    Err(AppError::Authorization(message.to_string()))
}

/// Resolve which user's records a listing may show.
///
/// Administrators get whatever they asked for (`None` = everyone). Other users are pinned
/// to their own id, and asking for someone else's records is refused.
pub fn scope_to_owner(actor: &Actor, requested: Option<i32>) -> AppResult<Option<i32>> {
    if is_allowed(actor, Action::ListAllRequests) {
        return Ok(requested);
    }
    match requested {
        Some(user_id) if user_id != actor.user_id => {
            Err(AppError::Authorization("You can only view your own requests".to_string()))
        }
        _ => Ok(Some(actor.user_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER: Actor = Actor { user_id: 1, role: Role::User };
    const ADMIN: Actor = Actor { user_id: 2, role: Role::Admin };
    const SUPER: Actor = Actor { user_id: 3, role: Role::Superuser };

    #[test]
    fn test_decisions_are_admin_only() {
        assert!(!is_allowed(&USER, Action::DecideRequest));
        assert!(is_allowed(&ADMIN, Action::DecideRequest));
        assert!(is_allowed(&SUPER, Action::DecideRequest));
    }

    #[test]
    fn test_renewal_ownership_is_strict() {
        assert!(is_allowed(&USER, Action::CreateRenewal { owner_id: 1 }));
        assert!(!is_allowed(&ADMIN, Action::CreateRenewal { owner_id: 1 }));
        assert!(!is_allowed(&SUPER, Action::CreateRenewal { owner_id: 1 }));
    }

    #[test]
    fn test_return_allows_admin() {
        assert!(is_allowed(&USER, Action::CreateReturn { owner_id: 1 }));
        assert!(!is_allowed(&USER, Action::CreateReturn { owner_id: 9 }));
        assert!(is_allowed(&ADMIN, Action::CreateReturn { owner_id: 1 }));
    }

    #[test]
    fn test_profile_access() {
        assert!(is_allowed(&USER, Action::ViewUser { target_id: 1 }));
        assert!(is_allowed(&USER, Action::EditUser { target_id: 1 }));
        assert!(!is_allowed(&USER, Action::ViewUser { target_id: 2 }));
        assert!(is_allowed(&ADMIN, Action::EditUser { target_id: 1 }));
    }

    #[test]
    fn test_superuser_only_actions() {
        for actor in [USER, ADMIN] {
            assert!(!is_allowed(&actor, Action::DeleteUser { target_id: 9 }));
            assert!(!is_allowed(&actor, Action::ResetPassword { target_id: 9 }));
            assert!(!is_allowed(&actor, Action::CreateUser { role: Role::Admin }));
        }
        assert!(is_allowed(&SUPER, Action::DeleteUser { target_id: 9 }));
        assert!(is_allowed(&SUPER, Action::ResetPassword { target_id: 9 }));
        assert!(is_allowed(&ADMIN, Action::CreateUser { role: Role::User }));
    }

    #[test]
    fn test_no_self_destruction() {
        assert!(!is_allowed(&SUPER, Action::DeleteUser { target_id: SUPER.user_id }));
        assert!(!is_allowed(&ADMIN, Action::DeactivateUser { target_id: ADMIN.user_id }));
        assert!(!is_allowed(&SUPER, Action::DeactivateUser { target_id: SUPER.user_id }));
        let err = authorize(&SUPER, Action::DeleteUser { target_id: SUPER.user_id }).unwrap_err();
        assert!(err.to_string().contains("your own account"));
    }

    #[test]
    fn test_scope_to_owner() {
        assert_eq!(scope_to_owner(&ADMIN, None).unwrap(), None);
        assert_eq!(scope_to_owner(&ADMIN, Some(1)).unwrap(), Some(1));
        assert_eq!(scope_to_owner(&USER, None).unwrap(), Some(1));
        assert_eq!(scope_to_owner(&USER, Some(1)).unwrap(), Some(1));
        assert!(matches!(scope_to_owner(&USER, Some(2)), Err(AppError::Authorization(_))));
    }
}
