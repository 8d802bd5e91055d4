//! The row-level access rule: callers read their own records; admins read
//! anyone's.

use crate::error::ApiError;

/// Who is calling, resolved from a validated token and the user table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

pub fn check(caller: &Identity, target_user_id: i64) -> Access {
    if caller.is_admin || caller.user_id == target_user_id {
        Access::Allow
    } else {
        Access::Deny
    }
}

/// Like [`check`], but a denial becomes the same error as a bad credential.
pub fn require(caller: &Identity, target_user_id: i64) -> Result<(), ApiError> {
    match check(caller, target_user_id) {
        Access::Allow => Ok(()),
        Access::Deny => {
            tracing::debug!(
                "User {} denied access to records of user {}",
                caller.user_id,
                target_user_id
            );
            Err(ApiError::Unauthorized)
        }
    }
}
