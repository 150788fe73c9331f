//! Combatant identity and battle condition

use catchline_protocol::Stat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::stats::{Nature, StatStages, StatTable};
use super::status::Status;
use crate::catalog::{MoveData, Species, to_id};

/// Identifier the engine echoes back in every reference to a combatant
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombatantId(String);

impl CombatantId {
    /// Fresh identifier for a newly spawned combatant
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CombatantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CombatantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Genderless,
}

impl Gender {
    /// Marker used in packed sets ("M", "F" or empty)
    pub fn marker(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
            Gender::Genderless => "",
        }
    }

    pub fn from_marker(s: &str) -> Self {
        match s {
            "M" => Gender::Male,
            "F" => Gender::Female,
            _ => Gender::Genderless,
        }
    }
}

/// One move known by a combatant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveSlot {
    pub name: String,
    pub pp: u32,
    pub max_pp: u32,
    pub disabled: bool,
}

impl MoveSlot {
    pub fn new(name: impl Into<String>, max_pp: u32) -> Self {
        Self {
            name: name.into(),
            pp: max_pp,
            max_pp,
            disabled: false,
        }
    }

    /// Loose name comparison: case, spaces, dashes and underscores are ignored
    pub fn matches(&self, name: &str) -> bool {
        to_id(&self.name) == to_id(name)
    }

    pub fn usable(&self) -> bool {
        self.pp > 0 && !self.disabled
    }
}

/// A creature instance taking part in a battle
#[derive(Debug, Clone, PartialEq)]
pub struct Combatant {
    pub id: CombatantId,
    pub nickname: String,
    /// Species id as the catalog knows it
    pub species: String,
    pub types: Vec<String>,
    pub catch_rate: u8,
    pub level: u8,
    pub base_stats: StatTable,
    pub ivs: StatTable,
    pub evs: StatTable,
    pub nature: Nature,
    pub gender: Gender,
    pub shiny: bool,
    pub ability: String,
    pub friendship: u8,
    pub ball: String,
    pub moves: Vec<MoveSlot>,
    pub boosts: StatStages,
    pub status: Option<Status>,
    pub volatiles: Vec<String>,
    health: u32,
}

impl Combatant {
    /// Bare combatant at full health with neutral stats
    pub fn new(
        id: impl Into<CombatantId>,
        species: impl Into<String>,
        level: u8,
        base_stats: StatTable,
    ) -> Self {
        let species = species.into();
        let mut combatant = Self {
            id: id.into(),
            nickname: species.clone(),
            species,
            types: Vec::new(),
            catch_rate: 0,
            level,
            base_stats,
            ivs: StatTable::default(),
            evs: StatTable::default(),
            nature: Nature::default(),
            gender: Gender::default(),
            shiny: false,
            ability: String::new(),
            friendship: 0,
            ball: "pokeball".to_string(),
            moves: Vec::new(),
            boosts: StatStages::new(),
            status: None,
            volatiles: Vec::new(),
            health: 0,
        };
        combatant.health = combatant.max_hp();
        combatant
    }

    /// Wild combatant of a catalog species at the given level
    pub fn spawn(species: &Species, level: u8, moves: &[&MoveData]) -> Self {
        let mut combatant = Self::new(
            CombatantId::random(),
            species.id.clone(),
            level,
            species.base_stats,
        );
        combatant.nickname = species.name.clone();
        combatant.types = species.types.clone();
        combatant.catch_rate = species.catch_rate;
        combatant.friendship = species.base_friendship;
        combatant.ability = species.abilities.first().cloned().unwrap_or_default();
        combatant.moves = moves
            .iter()
            .map(|m| MoveSlot::new(m.name.clone(), u32::from(m.pp)))
            .collect();
        combatant
    }

    fn scaled(&self, base: u16, iv: u16, ev: u16) -> u32 {
        (2 * u32::from(base) + u32::from(iv) + u32::from(ev) / 4) * u32::from(self.level) / 100
    }

    pub fn max_hp(&self) -> u32 {
        self.scaled(self.base_stats.hp, self.ivs.hp, self.evs.hp) + u32::from(self.level) + 10
    }

    /// Computed value of a permanent stat; None for accuracy and evasion
    pub fn stat(&self, stat: Stat) -> Option<u32> {
        let base = self.base_stats.get(stat)?;
        let iv = self.ivs.get(stat)?;
        let ev = self.evs.get(stat)?;
        let raw = f64::from(self.scaled(base, iv, ev) + 5) * self.nature.modifier(stat);
        Some(raw.floor() as u32)
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    /// Set health, clamped to [0, max_hp]
    pub fn set_health(&mut self, health: u32) {
        self.health = health.min(self.max_hp());
    }

    pub fn is_fainted(&self) -> bool {
        self.health == 0
    }

    pub fn move_slot_mut(&mut self, name: &str) -> Option<&mut MoveSlot> {
        self.moves.iter_mut().find(|m| m.matches(name))
    }

    pub fn has_type(&self, type_name: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(type_name))
    }

    /// Volatile conditions and boosts go away on switch out
    pub fn on_switch_out(&mut self) {
        self.boosts.clear();
        self.volatiles.clear();
    }
}
