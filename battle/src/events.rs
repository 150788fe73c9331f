//! Typed events raised while a battle is tracked

use catchline_protocol::{Player, Stat};

use crate::capture::Ball;
use crate::types::{CombatantId, Status};

/// A resolved combatant together with the side it fights for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    pub side: Player,
    pub id: CombatantId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Effectiveness {
    Super,
    Resisted,
    Immune,
}

/// Everything a subscriber can observe about a battle
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // === Session ===
    /// The engine acknowledged a create request
    Created { battle_id: String },
    /// Outcome of a local capture attempt, raised before the command is sent
    Catch { success: bool, ball: Ball, shakes: u8 },
    /// Raw inbound line, outbound command or local note, in arrival order
    Log(String),
    DecodeFailed { line: String, error: String },
    ProtocolViolation { line: String, error: String },
    RemoteError(String),
    UnknownCombatant { ident: String, line: String },
    /// Transport failed or closed; the session is now disconnected
    ConnectionLost(String),

    // === Major actions ===
    MoveUsed {
        user: Subject,
        move_name: String,
        target: Option<Subject>,
        miss: bool,
        still: bool,
    },
    Switched {
        subject: Subject,
        health: u32,
        max_health: u32,
    },
    Fainted(Subject),
    TurnAdvanced(u32),
    Ended { won: bool, winner: String },
    PpUpdated {
        subject: Subject,
        moves: Vec<(String, u32)>,
    },

    // === Attack outcomes ===
    Failed {
        subject: Subject,
        action: Option<String>,
    },
    Blocked {
        subject: Subject,
        effect: String,
    },
    CriticalHit(Subject),
    Effectiveness {
        subject: Subject,
        outcome: Effectiveness,
    },

    // === Health and status ===
    Damaged {
        subject: Subject,
        health: u32,
        max_health: u32,
    },
    Healed {
        subject: Subject,
        health: u32,
        max_health: u32,
    },
    StatusInflicted {
        subject: Subject,
        status: Status,
        phrase: &'static str,
    },
    StatusCured {
        subject: Subject,
        status: Option<Status>,
    },
    TeamCured(Player),

    // === Boosts ===
    /// Signed change: unboosts arrive negated
    Boost {
        subject: Subject,
        stat: Stat,
        delta: i8,
    },
    BoostsSwapped {
        source: Subject,
        target: Subject,
        stats: Vec<Stat>,
    },
    BoostsInverted(Subject),
    BoostsCleared(Subject),
    AllBoostsCleared,
    PositiveBoostsCleared(Subject),
    NegativeBoostsCleared(Subject),
    BoostsCopied {
        source: Subject,
        target: Subject,
    },

    // === Field ===
    Weather { weather: String, upkeep: bool },
    FieldStarted(String),
    FieldEnded(String),
    SideStarted { side: Player, condition: String },
    SideEnded { side: Player, condition: String },
    SideConditionsSwapped,

    // === Volatiles, abilities, forms ===
    VolatileStarted {
        subject: Subject,
        effect: String,
    },
    VolatileEnded {
        subject: Subject,
        effect: String,
    },
    /// `from` is set when the ability was changed by another effect
    Ability {
        subject: Subject,
        ability: String,
        from: Option<String>,
    },
    AbilityEnded(Subject),
    Transformed {
        subject: Subject,
        species: String,
    },

    // === Move mechanics ===
    Preparing {
        subject: Subject,
        move_name: String,
    },
    NothingHappened,
    MustRecharge(Subject),
    HitCount {
        subject: Subject,
        count: u32,
    },
    SingleMove {
        subject: Subject,
        move_name: String,
    },
    SingleTurn {
        subject: Subject,
        move_name: String,
    },
}

/// Discriminant of [`BattleEvent`], used as the subscription key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Created,
    Catch,
    Log,
    DecodeFailed,
    ProtocolViolation,
    RemoteError,
    UnknownCombatant,
    ConnectionLost,
    MoveUsed,
    Switched,
    Fainted,
    TurnAdvanced,
    Ended,
    PpUpdated,
    Failed,
    Blocked,
    CriticalHit,
    Effectiveness,
    Damaged,
    Healed,
    StatusInflicted,
    StatusCured,
    TeamCured,
    Boost,
    BoostsSwapped,
    BoostsInverted,
    BoostsCleared,
    AllBoostsCleared,
    PositiveBoostsCleared,
    NegativeBoostsCleared,
    BoostsCopied,
    Weather,
    FieldStarted,
    FieldEnded,
    SideStarted,
    SideEnded,
    SideConditionsSwapped,
    VolatileStarted,
    VolatileEnded,
    Ability,
    AbilityEnded,
    Transformed,
    Preparing,
    NothingHappened,
    MustRecharge,
    HitCount,
    SingleMove,
    SingleTurn,
}

impl BattleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            BattleEvent::Created { .. } => EventKind::Created,
            BattleEvent::Catch { .. } => EventKind::Catch,
            BattleEvent::Log(_) => EventKind::Log,
            BattleEvent::DecodeFailed { .. } => EventKind::DecodeFailed,
            BattleEvent::ProtocolViolation { .. } => EventKind::ProtocolViolation,
            BattleEvent::RemoteError(_) => EventKind::RemoteError,
            BattleEvent::UnknownCombatant { .. } => EventKind::UnknownCombatant,
            BattleEvent::ConnectionLost(_) => EventKind::ConnectionLost,
            BattleEvent::MoveUsed { .. } => EventKind::MoveUsed,
            BattleEvent::Switched { .. } => EventKind::Switched,
            BattleEvent::Fainted(_) => EventKind::Fainted,
            BattleEvent::TurnAdvanced(_) => EventKind::TurnAdvanced,
            BattleEvent::Ended { .. } => EventKind::Ended,
            BattleEvent::PpUpdated { .. } => EventKind::PpUpdated,
            BattleEvent::Failed { .. } => EventKind::Failed,
            BattleEvent::Blocked { .. } => EventKind::Blocked,
            BattleEvent::CriticalHit(_) => EventKind::CriticalHit,
            BattleEvent::Effectiveness { .. } => EventKind::Effectiveness,
            BattleEvent::Damaged { .. } => EventKind::Damaged,
            BattleEvent::Healed { .. } => EventKind::Healed,
            BattleEvent::StatusInflicted { .. } => EventKind::StatusInflicted,
            BattleEvent::StatusCured { .. } => EventKind::StatusCured,
            BattleEvent::TeamCured(_) => EventKind::TeamCured,
            BattleEvent::Boost { .. } => EventKind::Boost,
            BattleEvent::BoostsSwapped { .. } => EventKind::BoostsSwapped,
            BattleEvent::BoostsInverted(_) => EventKind::BoostsInverted,
            BattleEvent::BoostsCleared(_) => EventKind::BoostsCleared,
            BattleEvent::AllBoostsCleared => EventKind::AllBoostsCleared,
            BattleEvent::PositiveBoostsCleared(_) => EventKind::PositiveBoostsCleared,
            BattleEvent::NegativeBoostsCleared(_) => EventKind::NegativeBoostsCleared,
            BattleEvent::BoostsCopied { .. } => EventKind::BoostsCopied,
            BattleEvent::Weather { .. } => EventKind::Weather,
            BattleEvent::FieldStarted(_) => EventKind::FieldStarted,
            BattleEvent::FieldEnded(_) => EventKind::FieldEnded,
            BattleEvent::SideStarted { .. } => EventKind::SideStarted,
            BattleEvent::SideEnded { .. } => EventKind::SideEnded,
            BattleEvent::SideConditionsSwapped => EventKind::SideConditionsSwapped,
            BattleEvent::VolatileStarted { .. } => EventKind::VolatileStarted,
            BattleEvent::VolatileEnded { .. } => EventKind::VolatileEnded,
            BattleEvent::Ability { .. } => EventKind::Ability,
            BattleEvent::AbilityEnded(_) => EventKind::AbilityEnded,
            BattleEvent::Transformed { .. } => EventKind::Transformed,
            BattleEvent::Preparing { .. } => EventKind::Preparing,
            BattleEvent::NothingHappened => EventKind::NothingHappened,
            BattleEvent::MustRecharge(_) => EventKind::MustRecharge,
            BattleEvent::HitCount { .. } => EventKind::HitCount,
            BattleEvent::SingleMove { .. } => EventKind::SingleMove,
            BattleEvent::SingleTurn { .. } => EventKind::SingleTurn,
        }
    }
}
