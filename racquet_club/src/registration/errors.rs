//! Registration error types.

use crate::auth::AuthError;
use crate::error::{ClassifiedError, ErrorKind};
use thiserror::Error;

/// Registration errors
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Caller failed a role check
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Tournament not found")]
    TournamentNotFound,

    #[error("Team not found")]
    TeamNotFound,

    /// Tournament status is not upcoming
    #[error("Registration is closed for this tournament")]
    RegistrationClosed,

    #[error("Team registration is only available for doubles tournaments")]
    WrongTournamentType,

    #[error("You are not a member of this team")]
    NotTeamMember,

    #[error("Already registered for this tournament")]
    AlreadyRegistered,

    #[error("Team is already registered for this tournament")]
    TeamAlreadyRegistered,

    #[error("Tournament is full")]
    TournamentFull,

    /// No active registration to withdraw
    #[error("Registration not found")]
    RegistrationNotFound,
}

impl ClassifiedError for RegistrationError {
    fn kind(&self) -> ErrorKind {
        match self {
            RegistrationError::Database(_) => ErrorKind::Internal,
            RegistrationError::Auth(inner) => inner.kind(),
            RegistrationError::TournamentNotFound
            | RegistrationError::TeamNotFound
            | RegistrationError::RegistrationNotFound => ErrorKind::NotFound,
            RegistrationError::RegistrationClosed | RegistrationError::WrongTournamentType => {
                ErrorKind::InvalidInput
            }
            RegistrationError::NotTeamMember => ErrorKind::Forbidden,
            RegistrationError::AlreadyRegistered
            | RegistrationError::TeamAlreadyRegistered
            | RegistrationError::TournamentFull => ErrorKind::Conflict,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RegistrationError::Database(_) => "database_error",
            RegistrationError::Auth(inner) => inner.code(),
            RegistrationError::TournamentNotFound => "tournament_not_found",
            RegistrationError::TeamNotFound => "team_not_found",
            RegistrationError::RegistrationClosed => "registration_closed",
            RegistrationError::WrongTournamentType => "singles_tournament",
            RegistrationError::NotTeamMember => "not_team_member",
            RegistrationError::AlreadyRegistered => "already_registered",
            RegistrationError::TeamAlreadyRegistered => "team_already_registered",
            RegistrationError::TournamentFull => "tournament_full",
            RegistrationError::RegistrationNotFound => "registration_not_found",
        }
    }

    fn client_message(&self) -> String {
        match self {
            RegistrationError::Database(_) => "Internal server error".to_string(),
            RegistrationError::Auth(inner) => inner.client_message(),
            _ => self.to_string(),
        }
    }
}

/// Result type for registration operations
pub type RegistrationResult<T> = Result<T, RegistrationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_and_duplicates_are_conflicts() {
        assert_eq!(RegistrationError::TournamentFull.kind(), ErrorKind::Conflict);
        assert_eq!(RegistrationError::AlreadyRegistered.kind(), ErrorKind::Conflict);
        assert_eq!(
            RegistrationError::TeamAlreadyRegistered.kind(),
            ErrorKind::Conflict
        );
    }

    #[test]
    fn test_closed_and_wrong_type_are_invalid_input() {
        assert_eq!(
            RegistrationError::RegistrationClosed.kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            RegistrationError::WrongTournamentType.kind(),
            ErrorKind::InvalidInput
        );
    }

    #[test]
    fn test_role_failure_keeps_auth_classification() {
        let err = RegistrationError::from(AuthError::PlayerRequired);
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.code(), "player_required");
    }
}
