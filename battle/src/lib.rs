//! Battle state tracking, capture math and domain types for catchline.
//!
//! # Overview
//!
//! `catchline-battle` sits between `catchline-protocol` (wire format) and the
//! session that drives a battle:
//!
//! ```text
//! catchline-protocol (wire format)
//!        │
//!        ▼
//! catchline-battle (domain types + tracking + capture) ← THIS CRATE
//!        │
//!        ├─> catchline-team (packed team strings)
//!        └─> catchline-client (battle session)
//! ```
//!
//! # Main Types
//!
//! - [`Combatant`], [`Roster`] - creatures and the team each side fields
//! - [`Catalog`] - read-only species and move data, injected by the caller
//! - [`Tracker`] - applies engine messages and raises [`BattleEvent`]s
//! - [`capture::attempt_capture`] - catch rate formula with shake simulation
//! - [`choose_opponent_move`] - move heuristic for the computer-controlled side
//!
//! # Example Usage
//!
//! ```ignore
//! use catchline_battle::{Tracker, BattleEvent};
//! use catchline_protocol::parse_server_message;
//!
//! let mut tracker = Tracker::new(catalog, player, opponent, "player");
//!
//! if let Some(BattleEvent::TurnAdvanced(turn)) = tracker.apply(&parse_server_message("|turn|1")?)? {
//!     println!("turn {turn}");
//! }
//! ```

pub mod capture;
pub mod catalog;
pub mod error;
pub mod events;
pub mod query;
pub mod tracking;
pub mod types;

pub use capture::{Ball, CaptureInput, CaptureOutcome, CatchContext, Terrain, attempt_capture};
pub use catalog::{Catalog, MemoryCatalog, MoveData, Species};
pub use error::{RosterError, TrackError};
pub use events::{BattleEvent, Effectiveness, EventKind, Subject};
pub use query::choose_opponent_move;
pub use tracking::Tracker;
pub use types::{
    Combatant, CombatantId, Gender, MoveSlot, Nature, Roster, StatStages, StatTable, Status,
};

// Re-export commonly used protocol types
pub use catchline_protocol::{Player, Stat};
