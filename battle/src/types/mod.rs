//! Domain types for battle state tracking

mod combatant;
mod roster;
mod stats;
mod status;

pub use combatant::{Combatant, CombatantId, Gender, MoveSlot};
pub use roster::Roster;
pub use stats::{Nature, StatStages, StatTable};
pub use status::Status;
