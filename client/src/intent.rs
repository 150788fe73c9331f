//! Local checks run before a player command is encoded

use catchline_battle::{CombatantId, Roster};

use crate::error::IntentError;

/// `index` is 1-based, as the engine counts moves
pub fn check_move(roster: &Roster, index: usize) -> Result<(), IntentError> {
    let available = roster.active().moves.len();
    if index == 0 || index > available {
        return Err(IntentError::MoveOutOfRange { index, available });
    }
    Ok(())
}

/// The incoming combatant must be on the team, conscious and on the bench
pub fn check_switch(roster: &Roster, id: &CombatantId) -> Result<(), IntentError> {
    let position = roster
        .position(id)
        .ok_or_else(|| IntentError::UnknownSwitchTarget(id.to_string()))?;
    if position == roster.active_index() {
        return Err(IntentError::AlreadyActive(id.to_string()));
    }
    if roster[position].is_fainted() {
        return Err(IntentError::FaintedSwitchTarget(id.to_string()));
    }
    Ok(())
}
