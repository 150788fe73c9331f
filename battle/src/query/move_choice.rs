//! Move selection for the computer-controlled side

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::Catalog;
use crate::types::{Combatant, MoveSlot};

/// Chance the opponent ignores power and picks among its moves at random
pub const SHUFFLE_CHANCE: f64 = 0.3;

const STAB: f64 = 1.5;

/// Base power with the same-type bonus; moves missing from the catalog count as 0
pub fn effective_power(combatant: &Combatant, slot: &MoveSlot, catalog: &dyn Catalog) -> f64 {
    let Some(data) = catalog.move_data(&slot.name) else {
        return 0.0;
    };
    let power = f64::from(data.power.unwrap_or(0));
    if combatant.has_type(&data.move_type) {
        power * STAB
    } else {
        power
    }
}

/// Pick a move for the opponent's active combatant.
///
/// Returns the 1-based index into its move list, or None when no move has PP left.
pub fn choose_opponent_move<R: Rng + ?Sized>(
    combatant: &Combatant,
    catalog: &dyn Catalog,
    rng: &mut R,
) -> Option<usize> {
    let mut candidates: Vec<(usize, f64)> = combatant
        .moves
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.usable())
        .map(|(i, slot)| (i, effective_power(combatant, slot, catalog)))
        .collect();

    if rng.gen_bool(SHUFFLE_CHANCE) {
        candidates.shuffle(rng);
    } else {
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    }

    candidates.first().map(|(i, _)| i + 1)
}
