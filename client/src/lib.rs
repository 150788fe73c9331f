//! Async client for the catchline battle engine.
//!
//! A [`BattleSession`] owns one TCP connection. A background task reads the
//! engine's newline-delimited envelopes, feeds battle log lines through the
//! [`Tracker`](catchline_battle::Tracker) and hands every resulting
//! [`BattleEvent`] to the subscribers registered for its [`EventKind`].
//! Commands go out through the same session:
//!
//! ```ignore
//! use catchline_client::{BattleSession, EventKind, SessionConfig};
//!
//! let session = BattleSession::connect(SessionConfig::default(), catalog, player, opponent).await?;
//! session.subscribe(EventKind::TurnAdvanced, |event| println!("{event:?}"));
//!
//! session.create().await?;
//! // wait for EventKind::Created, then
//! session.start().await?;
//! session.send_teams().await?;
//! session.send_layouts().await?;
//! session.select_move(1).await?;
//! ```

mod config;
mod connection;
mod error;
mod handler;
pub mod intent;
mod log;
mod receiver;
mod session;
mod state;

pub use config::{Encounter, SessionConfig};
pub use error::{IntentError, SessionError};
pub use handler::{Handler, SubscriptionId};
pub use log::{BattleLog, LogEntry};
pub use session::BattleSession;
pub use state::{Phase, Snapshot};

pub use catchline_battle::{Ball, BattleEvent, CaptureOutcome, EventKind};
