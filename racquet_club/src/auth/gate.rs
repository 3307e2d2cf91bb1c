//! Role predicates applied before any business logic runs.

use super::errors::{AuthError, AuthResult};
use super::models::User;

/// Fails with [`AuthError::AdminRequired`] unless the caller is an admin
pub fn require_admin(user: &User) -> AuthResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AuthError::AdminRequired)
    }
}

/// Fails with [`AuthError::PlayerRequired`] unless the caller is a player
pub fn require_player(user: &User) -> AuthResult<()> {
    if user.is_player() {
        Ok(())
    } else {
        Err(AuthError::PlayerRequired)
    }
}
