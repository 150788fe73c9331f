//! Read-only species and move data
//!
//! The catalog is built ahead of time and handed to whoever needs it; nothing
//! in this crate reaches for global lookup tables.

use std::collections::HashMap;

use serde::Deserialize;

use crate::types::StatTable;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Species {
    /// Lowercase lookup key, also what the engine expects in packed sets
    pub id: String,
    pub name: String,
    pub types: Vec<String>,
    pub catch_rate: u8,
    #[serde(default = "default_friendship")]
    pub base_friendship: u8,
    pub base_stats: StatTable,
    #[serde(default)]
    pub abilities: Vec<String>,
}

fn default_friendship() -> u8 {
    70
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MoveData {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    /// None for status moves
    #[serde(default)]
    pub power: Option<u16>,
    pub pp: u8,
    #[serde(default)]
    pub accuracy: Option<u8>,
    #[serde(default)]
    pub priority: i8,
}

pub trait Catalog: Send + Sync {
    fn species(&self, id: &str) -> Option<&Species>;
    fn move_data(&self, id: &str) -> Option<&MoveData>;
}

/// Normalize a name into a lookup key: lowercase, no spaces, dashes or underscores
pub fn to_id(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Catalog held entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    species: HashMap<String, Species>,
    moves: HashMap<String, MoveData>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    species: Vec<Species>,
    #[serde(default)]
    moves: Vec<MoveData>,
}

impl MemoryCatalog {
    pub fn new(species: Vec<Species>, moves: Vec<MoveData>) -> Self {
        Self {
            species: species.into_iter().map(|s| (to_id(&s.id), s)).collect(),
            moves: moves.into_iter().map(|m| (to_id(&m.id), m)).collect(),
        }
    }

    /// Load from a document of the form `{"species": [...], "moves": [...]}`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Ok(Self::new(file.species, file.moves))
    }
}

impl Catalog for MemoryCatalog {
    fn species(&self, id: &str) -> Option<&Species> {
        self.species.get(&to_id(id))
    }

    fn move_data(&self, id: &str) -> Option<&MoveData> {
        self.moves.get(&to_id(id))
    }
}
