//! Packed team strings for the catchline battle engine.
//!
//! A team is a list of [`PackedSet`]s joined by `]`; see [`packed`] for the
//! layout of a single set.

pub mod error;
pub mod packed;

pub use error::TeamError;
pub use packed::PackedSet;

use catchline_battle::Combatant;

/// Pack a single combatant, validating every field
pub fn pack_combatant(combatant: &Combatant) -> Result<String, TeamError> {
    let set = PackedSet::from(combatant);
    set.validate()?;
    Ok(set.to_string())
}

/// Pack a whole team into the string sent with `>player`
pub fn pack_team<'a>(team: impl IntoIterator<Item = &'a Combatant>) -> Result<String, TeamError> {
    let packed = team
        .into_iter()
        .map(pack_combatant)
        .collect::<Result<Vec<_>, _>>()?;
    if packed.is_empty() {
        return Err(TeamError::EmptyTeam);
    }
    Ok(packed.join("]"))
}

pub fn unpack_team(team: &str) -> Result<Vec<PackedSet>, TeamError> {
    if team.trim().is_empty() {
        return Err(TeamError::EmptyTeam);
    }
    team.split(']').map(str::parse).collect()
}

/// Team order for `>team`: the 0-based `lead` slot first, the rest as packed.
///
/// `team_layout(3, 0)` is "123", `team_layout(3, 1)` is "213".
pub fn team_layout(size: usize, lead: usize) -> String {
    let lead = (lead < size).then_some(lead + 1);
    lead.into_iter()
        .chain((1..=size).filter(|slot| Some(*slot) != lead))
        .map(|slot| slot.to_string())
        .collect()
}
