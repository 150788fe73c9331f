use catchline_team::TeamError;
use thiserror::Error;

/// A command the local side asked for that cannot be sent as is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntentError {
    #[error("move {index} is out of range, the active combatant knows {available}")]
    MoveOutOfRange { index: usize, available: usize },

    #[error("no combatant {0} on the player's team")]
    UnknownSwitchTarget(String),

    #[error("{0} has fainted")]
    FaintedSwitchTarget(String),

    #[error("{0} is already active")]
    AlreadyActive(String),

    #[error("bad team: {0}")]
    Team(#[from] TeamError),
}

#[derive(Error, Debug)]
pub enum SessionError {
    /// Only `create` is allowed before the engine has assigned a battle id
    #[error("battle has not been created yet")]
    NotReady,

    #[error("invalid intent: {0}")]
    InvalidIntent(#[from] IntentError),

    #[error("connection lost")]
    ConnectionLost,

    #[error("trainer battles do not allow captures")]
    TrainerBattle,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize envelope: {0}")]
    Serialize(#[from] serde_json::Error),
}
