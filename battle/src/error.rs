use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("a roster needs at least one combatant")]
    Empty,

    #[error("every combatant in the roster has fainted")]
    AllFainted,
}

/// Failure to apply one message to the tracked state. Never fatal to the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("unknown combatant: {0}")]
    UnknownCombatant(String),

    #[error("malformed {kind} message: {reason}")]
    Malformed { kind: &'static str, reason: String },
}
