//! Shared types for battle protocol messages

use crate::ParseError;

/// Player slot in a battle (p1 is the local player, p2 the remote opponent)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    P1,
    P2,
}

impl Player {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "p1" => Some(Player::P1),
            "p2" => Some(Player::P2),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Player::P1 => "p1",
            Player::P2 => "p2",
        }
    }

    fn from_prefix(s: &str) -> Option<Self> {
        if s.starts_with("p1") {
            Some(Player::P1)
        } else if s.starts_with("p2") {
            Some(Player::P2)
        } else {
            None
        }
    }
}

/// Reference to a combatant as the engine writes it: "p1a: IDENT" or a bare "IDENT"
#[derive(Debug, Clone, PartialEq)]
pub struct CombatantRef {
    /// Side named in the prefix, if any
    pub player: Option<Player>,
    /// Position letter following the side (a, b, ...)
    pub position: Option<char>,
    /// Identifier with the side prefix and all whitespace removed
    pub ident: String,
}

impl CombatantRef {
    /// Parse "p1a: 1f0c…" or "1f0c…"
    pub fn parse(s: &str) -> Option<Self> {
        let (player, position, rest) = match s.split_once(':') {
            Some((prefix, rest)) => {
                let prefix = prefix.trim();
                (
                    Player::from_prefix(prefix),
                    prefix.chars().nth(2),
                    rest,
                )
            }
            None => (None, None, s),
        };

        let ident: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
        if ident.is_empty() {
            return None;
        }

        Some(CombatantRef {
            player,
            position,
            ident,
        })
    }
}

/// Details string (species, level, gender, shiny)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CombatantDetails {
    pub species: String,
    pub level: Option<u8>,
    pub gender: Option<char>,
    pub shiny: bool,
}

impl CombatantDetails {
    /// Parse a details string like "Pikachu, L50, M, shiny"
    pub fn parse(s: &str) -> Self {
        let mut details = CombatantDetails::default();
        let parts: Vec<&str> = s.split(", ").collect();

        if let Some(species) = parts.first() {
            details.species = species.trim().to_string();
        }

        for part in parts.iter().skip(1) {
            if let Some(level_str) = part.strip_prefix('L') {
                details.level = level_str.parse().ok();
            } else if *part == "M" {
                details.gender = Some('M');
            } else if *part == "F" {
                details.gender = Some('F');
            } else if *part == "shiny" {
                details.shiny = true;
            }
        }

        details
    }
}

/// HP and status condition (e.g., "20/20", "50/100 slp", "0 fnt")
///
/// The engine sends HP either as `current/max` in absolute points or as a
/// percentage over 100; nothing in the text says which.
#[derive(Debug, Clone, PartialEq)]
pub struct HpStatus {
    pub current: u32,
    pub max: Option<u32>,
    /// Status condition (slp, par, brn, psn, tox, frz, fnt)
    pub status: Option<String>,
}

impl HpStatus {
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        if parts.is_empty() {
            return None;
        }

        let hp_part = parts[0];
        let status = parts.get(1).map(|s| s.to_string());

        if let Some((current_str, max_str)) = hp_part.split_once('/') {
            Some(HpStatus {
                current: current_str.parse().ok()?,
                max: Some(max_str.parse().ok()?),
                status,
            })
        } else {
            Some(HpStatus {
                current: hp_part.parse().ok()?,
                max: None,
                status,
            })
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.status.as_deref() == Some("fnt")
    }
}

/// Boostable battle stat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Atk,
    Def,
    Spa,
    Spd,
    Spe,
    Accuracy,
    Evasion,
}

impl Stat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "atk" => Some(Stat::Atk),
            "def" => Some(Stat::Def),
            "spa" => Some(Stat::Spa),
            "spd" => Some(Stat::Spd),
            "spe" => Some(Stat::Spe),
            "accuracy" => Some(Stat::Accuracy),
            "evasion" => Some(Stat::Evasion),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Atk => "atk",
            Stat::Def => "def",
            Stat::Spa => "spa",
            Stat::Spd => "spd",
            Stat::Spe => "spe",
            Stat::Accuracy => "accuracy",
            Stat::Evasion => "evasion",
        }
    }

    pub const ALL: [Stat; 7] = [
        Stat::Atk,
        Stat::Def,
        Stat::Spa,
        Stat::Spd,
        Stat::Spe,
        Stat::Accuracy,
        Stat::Evasion,
    ];
}

/// Side of the field (for side conditions), e.g. "p1: player"
#[derive(Debug, Clone, PartialEq)]
pub struct Side {
    pub player: Player,
    pub raw: String,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        let player = Player::from_prefix(s)?;
        Some(Side {
            player,
            raw: s.to_string(),
        })
    }
}

/// Helper to parse a combatant reference from message args
pub fn parse_ref(args: &[&str], index: usize) -> Result<CombatantRef, anyhow::Error> {
    args.get(index)
        .and_then(|s| CombatantRef::parse(s))
        .ok_or_else(|| ParseError::MissingField("combatant".to_string()).into())
}

/// Helper for optional references; only side-prefixed values count, so tags
/// such as `[still]` in the same slot are not mistaken for a combatant
pub fn parse_optional_ref(args: &[&str], index: usize) -> Option<CombatantRef> {
    args.get(index)
        .filter(|s| s.contains(':'))
        .and_then(|s| CombatantRef::parse(s))
}

/// Helper to parse CombatantDetails from message args
pub fn parse_details(args: &[&str], index: usize) -> CombatantDetails {
    args.get(index)
        .map(|s| CombatantDetails::parse(s))
        .unwrap_or_default()
}

/// Helper to parse HpStatus from message args
pub fn parse_hp_status(args: &[&str], index: usize) -> Option<HpStatus> {
    args.get(index).and_then(|s| HpStatus::parse(s))
}

/// Helper for a required stat field
pub fn parse_stat(args: &[&str], index: usize) -> Result<Stat, anyhow::Error> {
    args.get(index)
        .and_then(|s| Stat::parse(s))
        .ok_or_else(|| ParseError::MissingField("stat".to_string()).into())
}

/// Helper for a required numeric field
pub fn parse_number<T: std::str::FromStr>(
    args: &[&str],
    index: usize,
    field: &str,
) -> Result<T, anyhow::Error> {
    args.get(index)
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ParseError::MissingField(field.to_string()).into())
}

/// Helper for a text field that defaults to empty
pub fn text(args: &[&str], index: usize) -> String {
    args.get(index).unwrap_or(&"").to_string()
}
