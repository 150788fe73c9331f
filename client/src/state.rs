use catchline_battle::{BattleEvent, Combatant, Player, Tracker};

use crate::error::SessionError;
use crate::log::{BattleLog, LogEntry};

/// Lifecycle of a session
///
/// `Idle → Created → Started → InProgress → Ended`, with `Disconnected`
/// reachable from any of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    /// The engine assigned a battle id
    Created,
    /// `>start` was sent
    Started,
    /// At least one turn has begun
    InProgress,
    /// Someone won; the connection stays open until the caller disconnects
    Ended,
    Disconnected,
}

/// The two active combatants and the turn, copied out of the session
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub turn: u32,
    pub player: Combatant,
    pub opponent: Combatant,
}

/// Everything the read loop and the public API share
pub(crate) struct SessionState {
    pub phase: Phase,
    pub battle_id: Option<String>,
    pub tracker: Tracker,
    pub log: BattleLog,
}

impl SessionState {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            phase: Phase::Idle,
            battle_id: None,
            tracker,
            log: BattleLog::new(),
        }
    }

    /// Battle id for a command, if commands may be sent right now
    pub fn command_target(&self) -> Result<String, SessionError> {
        match (self.phase, &self.battle_id) {
            (Phase::Disconnected, _) => Err(SessionError::ConnectionLost),
            (Phase::Idle, _) | (_, None) => Err(SessionError::NotReady),
            (_, Some(id)) => Ok(id.clone()),
        }
    }

    /// Append to the log and return the matching `Log` event
    pub fn record(&mut self, entry: LogEntry) -> BattleEvent {
        let event = BattleEvent::Log(entry.text().to_string());
        self.log.push(entry);
        event
    }

    /// Phase changes driven by tracked events
    pub fn observe(&mut self, event: &BattleEvent) {
        match event {
            BattleEvent::TurnAdvanced(_)
                if matches!(self.phase, Phase::Created | Phase::Started) =>
            {
                self.phase = Phase::InProgress;
            }
            BattleEvent::Ended { .. } if self.phase != Phase::Disconnected => {
                self.phase = Phase::Ended;
            }
            _ => {}
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            turn: self.tracker.turn(),
            player: self.tracker.active(Player::P1).clone(),
            opponent: self.tracker.active(Player::P2).clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catchline_battle::{MemoryCatalog, Roster, StatTable};

    use super::*;

    fn state() -> SessionState {
        let roster = |id: &str| {
            Roster::new(vec![Combatant::new(id, "eevee", 5, StatTable::splat(50))]).unwrap()
        };
        SessionState::new(Tracker::new(
            Arc::new(MemoryCatalog::default()),
            roster("mine"),
            roster("wild"),
            "player",
        ))
    }

    #[test]
    fn test_command_target_by_phase() {
        let mut state = state();
        assert!(matches!(state.command_target(), Err(SessionError::NotReady)));

        state.phase = Phase::Created;
        state.battle_id = Some("abc".to_string());
        assert_eq!(state.command_target().unwrap(), "abc");

        state.phase = Phase::Disconnected;
        assert!(matches!(
            state.command_target(),
            Err(SessionError::ConnectionLost)
        ));
    }

    #[test]
    fn test_phase_follows_events() {
        let mut state = state();
        state.phase = Phase::Started;
        state.observe(&BattleEvent::TurnAdvanced(1));
        assert_eq!(state.phase, Phase::InProgress);

        state.observe(&BattleEvent::Ended {
            won: true,
            winner: "player".to_string(),
        });
        assert_eq!(state.phase, Phase::Ended);

        state.observe(&BattleEvent::TurnAdvanced(9));
        assert_eq!(state.phase, Phase::Ended);
    }

    #[test]
    fn test_snapshot_has_both_actives() {
        let snapshot = state().snapshot();
        assert_eq!(snapshot.player.id.as_str(), "mine");
        assert_eq!(snapshot.opponent.id.as_str(), "wild");
        assert_eq!(snapshot.turn, 0);
    }
}
