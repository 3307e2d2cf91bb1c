//! Admission rules shared by every store.
//!
//! Stores gather a consistent snapshot (inside a transaction or under a
//! lock) and hand it to these functions, so the check order and the
//! resulting error are identical no matter where the data lives.

use super::errors::{RegistrationError, RegistrationResult};
use crate::tournament::Tournament;

/// What a store knows about a tournament when a player asks to join
#[derive(Debug, Clone, Copy)]
pub struct PlayerAdmission<'a> {
    pub tournament: &'a Tournament,
    /// Active player registrations, excluding withdrawn ones
    pub active_count: i64,
    /// The caller already holds an active registration
    pub already_registered: bool,
}

/// What a store knows about a tournament and a team when the team asks to join
#[derive(Debug, Clone, Copy)]
pub struct TeamAdmission<'a> {
    pub tournament: &'a Tournament,
    pub team_exists: bool,
    pub caller_is_member: bool,
    /// Active team registrations, excluding withdrawn ones
    pub active_count: i64,
    pub already_registered: bool,
}

/// Status, then duplicate, then capacity
pub fn check_player_admission(admission: &PlayerAdmission<'_>) -> RegistrationResult<()> {
    if !admission.tournament.accepts_registrations() {
        return Err(RegistrationError::RegistrationClosed);
    }
    if admission.already_registered {
        return Err(RegistrationError::AlreadyRegistered);
    }
    if admission.active_count >= admission.tournament.capacity() {
        return Err(RegistrationError::TournamentFull);
    }
    Ok(())
}

/// Type, team, membership, status, duplicate, then capacity
pub fn check_team_admission(admission: &TeamAdmission<'_>) -> RegistrationResult<()> {
    let tournament = admission.tournament;
    if !tournament.is_team_tournament() {
        return Err(RegistrationError::WrongTournamentType);
    }
    if !admission.team_exists {
        return Err(RegistrationError::TeamNotFound);
    }
    if !admission.caller_is_member {
        return Err(RegistrationError::NotTeamMember);
    }
    if !tournament.accepts_registrations() {
        return Err(RegistrationError::RegistrationClosed);
    }
    if admission.already_registered {
        return Err(RegistrationError::TeamAlreadyRegistered);
    }
    if admission.active_count >= i64::from(tournament.max_teams) {
        return Err(RegistrationError::TournamentFull);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tournament::models::sample_tournament;
    use crate::tournament::{TournamentStatus, TournamentType};
    use proptest::prelude::*;

    fn status_strategy() -> impl Strategy<Value = TournamentStatus> {
        prop_oneof![
            Just(TournamentStatus::Upcoming),
            Just(TournamentStatus::Ongoing),
            Just(TournamentStatus::Completed),
            Just(TournamentStatus::Cancelled),
        ]
    }

    #[test]
    fn test_closed_wins_over_full() {
        let mut tournament = sample_tournament(TournamentType::Singles);
        tournament.status = TournamentStatus::Ongoing;
        tournament.max_players = 1;

        let result = check_player_admission(&PlayerAdmission {
            tournament: &tournament,
            active_count: 1,
            already_registered: true,
        });
        assert!(matches!(result, Err(RegistrationError::RegistrationClosed)));
    }

    #[test]
    fn test_duplicate_wins_over_full() {
        let mut tournament = sample_tournament(TournamentType::Singles);
        tournament.max_players = 1;

        let result = check_player_admission(&PlayerAdmission {
            tournament: &tournament,
            active_count: 1,
            already_registered: true,
        });
        assert!(matches!(result, Err(RegistrationError::AlreadyRegistered)));
    }

    #[test]
    fn test_player_capacity_uses_max_teams_for_doubles() {
        let mut tournament = sample_tournament(TournamentType::Doubles);
        tournament.max_players = 16;
        tournament.max_teams = 2;

        let result = check_player_admission(&PlayerAdmission {
            tournament: &tournament,
            active_count: 2,
            already_registered: false,
        });
        assert!(matches!(result, Err(RegistrationError::TournamentFull)));
    }

    #[test]
    fn test_team_on_singles_is_wrong_type_before_anything_else() {
        let tournament = sample_tournament(TournamentType::Singles);
        let result = check_team_admission(&TeamAdmission {
            tournament: &tournament,
            team_exists: false,
            caller_is_member: false,
            active_count: 0,
            already_registered: false,
        });
        assert!(matches!(result, Err(RegistrationError::WrongTournamentType)));
    }

    #[test]
    fn test_team_membership_checked_before_status() {
        let mut tournament = sample_tournament(TournamentType::Doubles);
        tournament.status = TournamentStatus::Completed;

        let result = check_team_admission(&TeamAdmission {
            tournament: &tournament,
            team_exists: true,
            caller_is_member: false,
            active_count: 0,
            already_registered: false,
        });
        assert!(matches!(result, Err(RegistrationError::NotTeamMember)));
    }

    #[test]
    fn test_team_requires_upcoming_status() {
        let mut tournament = sample_tournament(TournamentType::Doubles);
        tournament.status = TournamentStatus::Cancelled;

        let result = check_team_admission(&TeamAdmission {
            tournament: &tournament,
            team_exists: true,
            caller_is_member: true,
            active_count: 0,
            already_registered: false,
        });
        assert!(matches!(result, Err(RegistrationError::RegistrationClosed)));
    }

    proptest! {
        #[test]
        fn prop_player_admitted_only_below_capacity(
            capacity in 1i32..64,
            active in 0i64..128,
            already in any::<bool>(),
            status in status_strategy(),
        ) {
            let mut tournament = sample_tournament(TournamentType::Singles);
            tournament.max_players = capacity;
            tournament.status = status;

            let admitted = check_player_admission(&PlayerAdmission {
                tournament: &tournament,
                active_count: active,
                already_registered: already,
            })
            .is_ok();

            let expected = status == TournamentStatus::Upcoming
                && !already
                && active < i64::from(capacity);
            prop_assert_eq!(admitted, expected);
        }

        #[test]
        fn prop_sequential_admissions_stop_at_capacity(capacity in 1i32..40, attempts in 0usize..80) {
            let mut tournament = sample_tournament(TournamentType::Singles);
            tournament.max_players = capacity;

            let mut active = 0i64;
            for _ in 0..attempts {
                let admission = PlayerAdmission {
                    tournament: &tournament,
                    active_count: active,
                    already_registered: false,
                };
                if check_player_admission(&admission).is_ok() {
                    active += 1;
                }
            }

            prop_assert!(active <= i64::from(capacity));
            prop_assert_eq!(active, (attempts as i64).min(i64::from(capacity)));
        }

        #[test]
        fn prop_team_admission_bounded_by_max_teams(
            max_teams in 1i32..32,
            active in 0i64..64,
            member in any::<bool>(),
        ) {
            let mut tournament = sample_tournament(TournamentType::Doubles);
            tournament.max_teams = max_teams;

            let admitted = check_team_admission(&TeamAdmission {
                tournament: &tournament,
                team_exists: true,
                caller_is_member: member,
                active_count: active,
                already_registered: false,
            })
            .is_ok();

            prop_assert_eq!(admitted, member && active < i64::from(max_teams));
        }
    }
}
