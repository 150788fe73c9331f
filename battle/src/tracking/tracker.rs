//! Tracker - the two rosters as the engine reports them

use std::collections::HashMap;
use std::sync::Arc;

use catchline_protocol::{CombatantRef, Player};

use crate::catalog::Catalog;
use crate::error::TrackError;
use crate::events::Subject;
use crate::types::{Combatant, CombatantId, Roster};

/// Where a registered combatant lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Slot {
    pub side: Player,
    pub index: usize,
}

/// Battle state reconstructed from engine messages
///
/// Owns both rosters. Combatants are found through an identifier index built
/// at construction; the engine can only ever refer to combatants registered here.
pub struct Tracker {
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) sides: [Roster; 2],
    index: HashMap<String, Slot>,
    pub(crate) turn: u32,
    player_name: String,
    pub(crate) winner: Option<String>,
    /// Current weather, None when clear
    pub weather: Option<String>,
    /// Field-wide conditions (terrains, rooms, ...)
    pub field: Vec<String>,
}

impl Tracker {
    /// `player_name` is the name the local side registered with; a win by that
    /// name is a win for the player.
    pub fn new(
        catalog: Arc<dyn Catalog>,
        player: Roster,
        opponent: Roster,
        player_name: impl Into<String>,
    ) -> Self {
        let mut index = HashMap::new();
        for (side, roster) in [(Player::P1, &player), (Player::P2, &opponent)] {
            for (i, combatant) in roster.members().iter().enumerate() {
                index.insert(normalize(combatant.id.as_str()), Slot { side, index: i });
            }
        }

        Self {
            catalog,
            sides: [player, opponent],
            index,
            turn: 0,
            player_name: player_name.into(),
            winner: None,
            weather: None,
            field: Vec::new(),
        }
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn winner(&self) -> Option<&str> {
        self.winner.as_deref()
    }

    pub fn is_ended(&self) -> bool {
        self.winner.is_some()
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn roster(&self, side: Player) -> &Roster {
        &self.sides[side_index(side)]
    }

    pub(crate) fn roster_mut(&mut self, side: Player) -> &mut Roster {
        &mut self.sides[side_index(side)]
    }

    /// The combatant currently on the field for a side
    pub fn active(&self, side: Player) -> &Combatant {
        self.roster(side).active()
    }

    /// Look up any registered combatant by identifier
    pub fn combatant(&self, id: &CombatantId) -> Option<&Combatant> {
        let slot = self.index.get(&normalize(id.as_str()))?;
        self.roster(slot.side).get(slot.index)
    }

    /// Resolve an engine reference; the side prefix is informational only
    pub(crate) fn resolve(&self, reference: &CombatantRef) -> Result<Slot, TrackError> {
        self.index
            .get(&reference.ident)
            .copied()
            .ok_or_else(|| TrackError::UnknownCombatant(reference.ident.clone()))
    }

    pub(crate) fn get_mut(&mut self, slot: Slot) -> &mut Combatant {
        &mut self.sides[side_index(slot.side)][slot.index]
    }

    pub(crate) fn get(&self, slot: Slot) -> &Combatant {
        &self.sides[side_index(slot.side)][slot.index]
    }

    pub(crate) fn subject(&self, slot: Slot) -> Subject {
        Subject {
            side: slot.side,
            id: self.get(slot).id.clone(),
        }
    }
}

pub(crate) fn side_index(side: Player) -> usize {
    match side {
        Player::P1 => 0,
        Player::P2 => 1,
    }
}

/// Identifiers are compared with all whitespace removed, as references arrive
fn normalize(id: &str) -> String {
    id.chars().filter(|c| !c.is_whitespace()).collect()
}
