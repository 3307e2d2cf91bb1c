//! Authentication error types.

use crate::error::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// Authentication and account errors
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Token signing failed
    #[error("Token signing failed: {0}")]
    TokenSigning(jsonwebtoken::errors::Error),

    /// Unknown login or wrong password; deliberately indistinguishable
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// Account deactivated
    #[error("Your account has been deactivated")]
    AccountDeactivated,

    /// No bearer credential on the request
    #[error("Missing bearer token")]
    MissingToken,

    /// Signature, expiry or format check failed
    #[error("Invalid or expired token")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    /// Token refers to a user that no longer exists
    #[error("Token subject no longer exists")]
    UnknownSubject,

    /// User not found
    #[error("User not found")]
    UserNotFound,

    /// Username already exists
    #[error("Username already exists")]
    UsernameTaken,

    /// Email already exists
    #[error("Email already exists")]
    EmailTaken,

    /// The user still owns records that block deletion
    #[error("User still administers tournaments")]
    UserInUse,

    /// Invalid username format
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Invalid email format
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// Other malformed field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Current password did not verify during a password change
    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    /// Role text is neither player nor admin
    #[error("Role must be 'player' or 'admin', got {0:?}")]
    InvalidRole(String),

    /// Caller must be an admin
    #[error("Admin role required")]
    AdminRequired,

    /// Caller must be a player
    #[error("Player role required")]
    PlayerRequired,
}

impl ClassifiedError for AuthError {
    fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Database(_) | AuthError::HashingFailed | AuthError::TokenSigning(_) => {
                ErrorKind::Internal
            }
            AuthError::InvalidCredentials
            | AuthError::AccountDeactivated
            | AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::UnknownSubject => ErrorKind::Unauthenticated,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::UsernameTaken | AuthError::EmailTaken | AuthError::UserInUse => {
                ErrorKind::Conflict
            }
            AuthError::InvalidUsername(_)
            | AuthError::InvalidEmail(_)
            | AuthError::WeakPassword(_)
            | AuthError::InvalidInput(_)
            | AuthError::InvalidCurrentPassword
            | AuthError::InvalidRole(_) => ErrorKind::InvalidInput,
            AuthError::AdminRequired | AuthError::PlayerRequired => ErrorKind::Forbidden,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AuthError::Database(_) => "database_error",
            AuthError::HashingFailed => "password_hash_failed",
            AuthError::TokenSigning(_) => "token_generation_failed",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountDeactivated => "account_deactivated",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken(_) | AuthError::UnknownSubject => "invalid_token",
            AuthError::UserNotFound => "user_not_found",
            AuthError::UsernameTaken => "username_taken",
            AuthError::EmailTaken => "email_taken",
            AuthError::UserInUse => "user_in_use",
            AuthError::InvalidUsername(_) | AuthError::InvalidEmail(_) | AuthError::InvalidInput(_) => {
                "invalid_input"
            }
            AuthError::WeakPassword(_) => "weak_password",
            AuthError::InvalidCurrentPassword => "invalid_current_password",
            AuthError::InvalidRole(_) => "invalid_role",
            AuthError::AdminRequired => "admin_required",
            AuthError::PlayerRequired => "player_required",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) | AuthError::TokenSigning(_) => {
                "Internal server error".to_string()
            }
            // Don't expose token structure or which check failed
            AuthError::InvalidToken(_) | AuthError::UnknownSubject => {
                "Invalid or expired token".to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_failures_are_forbidden_not_unauthenticated() {
        assert_eq!(AuthError::PlayerRequired.kind(), ErrorKind::Forbidden);
        assert_eq!(AuthError::AdminRequired.kind(), ErrorKind::Forbidden);
        assert_eq!(AuthError::MissingToken.kind(), ErrorKind::Unauthenticated);
    }

    #[test]
    fn test_database_errors_are_sanitized() {
        let err = AuthError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.client_message(), "Internal server error");
    }
}
