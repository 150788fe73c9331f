//! One combatant as a single packed line
//!
//! Fields are joined by `|` in this order:
//!
//! ```text
//! SPECIES|ID|HEALTH|STATUS|ABILITY|MOVES|PP|NATURE|EVS|GENDER|IVS|SHINY|LEVEL|FRIENDSHIP,BALL,,,,
//! ```
//!
//! MOVES is a comma list of names, PP a comma list of `current/max` pairs in the
//! same order, EVS and IVS six comma-separated values (hp, atk, def, spa, spd, spe),
//! SHINY is `S` or empty. The last field carries friendship and ball followed by
//! four reserved slots the engine leaves blank.

use std::fmt;
use std::str::FromStr;

use catchline_battle::{Combatant, CombatantId, Gender, Nature, StatTable, Status};

use crate::error::TeamError;

const FIELD_COUNT: usize = 14;
const RESERVED_SLOTS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct PackedSet {
    pub species: String,
    pub id: CombatantId,
    pub health: u32,
    pub status: Option<Status>,
    pub ability: String,
    pub moves: Vec<String>,
    /// (current, max) per move
    pub pp: Vec<(u32, u32)>,
    pub nature: Nature,
    pub evs: StatTable,
    pub gender: Gender,
    pub ivs: StatTable,
    pub shiny: bool,
    pub level: u8,
    pub friendship: u8,
    pub ball: String,
}

impl From<&Combatant> for PackedSet {
    fn from(c: &Combatant) -> Self {
        Self {
            species: c.species.clone(),
            id: c.id.clone(),
            health: c.health(),
            status: c.status,
            ability: c.ability.clone(),
            moves: c.moves.iter().map(|m| m.name.clone()).collect(),
            pp: c.moves.iter().map(|m| (m.pp, m.max_pp)).collect(),
            nature: c.nature,
            evs: c.evs,
            gender: c.gender,
            ivs: c.ivs,
            shiny: c.shiny,
            level: c.level,
            friendship: c.friendship,
            ball: c.ball.clone(),
        }
    }
}

/// Text that ends up inside a field must not contain any separator
fn check_text(field: &'static str, value: &str) -> Result<(), TeamError> {
    if value.contains(['|', ']', ',']) {
        return Err(TeamError::InvalidField {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn number<T: FromStr>(field: &'static str, value: &str) -> Result<T, TeamError> {
    value.trim().parse().map_err(|_| TeamError::Number {
        field,
        value: value.to_string(),
    })
}

fn stat_list(table: StatTable) -> String {
    table
        .to_array()
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_stat_list(field: &'static str, value: &str) -> Result<StatTable, TeamError> {
    let parts: Vec<&str> = value.split(',').collect();
    let values: [&str; 6] = parts
        .try_into()
        .map_err(|_| TeamError::InvalidField {
            field,
            value: value.to_string(),
        })?;
    let mut table = [0u16; 6];
    for (slot, raw) in table.iter_mut().zip(values) {
        *slot = number(field, raw)?;
    }
    Ok(StatTable::from_array(table))
}

fn list(value: &str) -> Vec<&str> {
    if value.is_empty() {
        Vec::new()
    } else {
        value.split(',').collect()
    }
}

impl PackedSet {
    /// Reject values that would not survive a round trip
    pub fn validate(&self) -> Result<(), TeamError> {
        check_text("species", &self.species)?;
        check_text("id", self.id.as_str())?;
        check_text("ability", &self.ability)?;
        check_text("ball", &self.ball)?;
        if self.species.is_empty() {
            return Err(TeamError::InvalidField {
                field: "species",
                value: String::new(),
            });
        }
        if self.id.as_str().is_empty() {
            return Err(TeamError::InvalidField {
                field: "id",
                value: String::new(),
            });
        }
        for name in &self.moves {
            check_text("move", name)?;
        }
        if self.pp.len() != self.moves.len() {
            return Err(TeamError::InvalidField {
                field: "pp",
                value: format!("{} entries for {} moves", self.pp.len(), self.moves.len()),
            });
        }
        Ok(())
    }
}

impl fmt::Display for PackedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pp = self
            .pp
            .iter()
            .map(|(cur, max)| format!("{cur}/{max}"))
            .collect::<Vec<_>>()
            .join(",");

        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{},{}{}",
            self.species,
            self.id,
            self.health,
            self.status.map(|s| s.to_protocol()).unwrap_or(""),
            self.ability,
            self.moves.join(","),
            pp,
            self.nature.as_str(),
            stat_list(self.evs),
            self.gender.marker(),
            stat_list(self.ivs),
            if self.shiny { "S" } else { "" },
            self.level,
            self.friendship,
            self.ball,
            ",".repeat(RESERVED_SLOTS),
        )
    }
}

impl FromStr for PackedSet {
    type Err = TeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('|').collect();
        if fields.len() != FIELD_COUNT {
            return Err(TeamError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
            });
        }

        let status = match fields[3] {
            "" => None,
            code => Some(Status::from_protocol(code).ok_or_else(|| TeamError::InvalidField {
                field: "status",
                value: code.to_string(),
            })?),
        };

        let pp = list(fields[6])
            .into_iter()
            .map(|pair| {
                let (cur, max) = pair.split_once('/').ok_or_else(|| TeamError::InvalidField {
                    field: "pp",
                    value: pair.to_string(),
                })?;
                Ok((number("pp", cur)?, number("pp", max)?))
            })
            .collect::<Result<Vec<_>, TeamError>>()?;

        let nature = Nature::parse(fields[7]).ok_or_else(|| TeamError::InvalidField {
            field: "nature",
            value: fields[7].to_string(),
        })?;

        let mut trailing = fields[13].split(',');
        let friendship = number("friendship", trailing.next().unwrap_or_default())?;
        let ball = trailing.next().unwrap_or_default().to_string();

        let set = PackedSet {
            species: fields[0].to_string(),
            id: CombatantId::from(fields[1]),
            health: number("health", fields[2])?,
            status,
            ability: fields[4].to_string(),
            moves: list(fields[5]).into_iter().map(str::to_string).collect(),
            pp,
            nature,
            evs: parse_stat_list("evs", fields[8])?,
            gender: Gender::from_marker(fields[9]),
            ivs: parse_stat_list("ivs", fields[10])?,
            shiny: fields[11] == "S",
            level: number("level", fields[12])?,
            friendship,
            ball,
        };
        set.validate()?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catchline_battle::MoveSlot;

    fn combatant() -> Combatant {
        let mut c = Combatant::new("1f0c-aa", "bulbasaur", 12, StatTable::new(45, 49, 49, 65, 65, 45));
        c.ability = "Overgrow".to_string();
        c.nature = Nature::Modest;
        c.gender = Gender::Female;
        c.ivs = StatTable::new(31, 0, 31, 31, 31, 30);
        c.evs = StatTable::new(4, 0, 0, 252, 0, 252);
        c.friendship = 70;
        c.moves = vec![MoveSlot::new("Tackle", 35), MoveSlot::new("Vine Whip", 25)];
        c.moves[1].pp = 20;
        c.status = Some(Status::Poison);
        c
    }

    #[test]
    fn test_field_order() {
        let packed = PackedSet::from(&combatant()).to_string();
        let hp = combatant().health();
        assert_eq!(
            packed,
            format!(
                "bulbasaur|1f0c-aa|{hp}|psn|Overgrow|Tackle,Vine Whip|35/35,20/25|Modest|4,0,0,252,0,252|F|31,0,31,31,31,30||12|70,pokeball,,,,"
            )
        );
    }

    #[test]
    fn test_decode_keeps_order() {
        let set = PackedSet::from(&combatant());
        let decoded: PackedSet = set.to_string().parse().unwrap();
        assert_eq!(decoded, set);
        assert_eq!(decoded.moves, vec!["Tackle", "Vine Whip"]);
        assert_eq!(decoded.evs.to_array(), [4, 0, 0, 252, 0, 252]);
    }

    #[test]
    fn test_moveless_set() {
        let mut c = combatant();
        c.moves.clear();
        c.shiny = true;
        let set = PackedSet::from(&c);
        let text = set.to_string();
        assert!(text.contains("|Overgrow|||Modest|"));
        assert_eq!(text.parse::<PackedSet>().unwrap(), set);
    }

    #[test]
    fn test_separator_in_field_rejected() {
        let mut set = PackedSet::from(&combatant());
        set.moves[0] = "Bad|Move".to_string();
        assert!(matches!(
            set.validate(),
            Err(TeamError::InvalidField { field: "move", .. })
        ));
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            "a|b|c".parse::<PackedSet>(),
            Err(TeamError::FieldCount {
                expected: 14,
                found: 3
            })
        );
    }

    #[test]
    fn test_bad_number() {
        let text = PackedSet::from(&combatant())
            .to_string()
            .replacen("|12|", "|twelve|", 1);
        assert!(matches!(
            text.parse::<PackedSet>(),
            Err(TeamError::Number { field: "level", .. })
        ));
    }
}
