//! One side's team of combatants

use super::combatant::{Combatant, CombatantId};
use crate::error::RosterError;

/// Ordered team for one side; exactly one member is active at any time
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    members: Vec<Combatant>,
    active: usize,
    /// Side conditions currently in effect (hazards, screens, ...)
    pub conditions: Vec<String>,
}

impl Roster {
    /// Build a roster whose first healthy member leads.
    ///
    /// Member order is kept as given; only the active index points past any
    /// fainted members at the front.
    pub fn new(members: Vec<Combatant>) -> Result<Self, RosterError> {
        if members.is_empty() {
            return Err(RosterError::Empty);
        }
        let lead = members
            .iter()
            .position(|c| !c.is_fainted())
            .ok_or(RosterError::AllFainted)?;

        Ok(Self {
            members,
            active: lead,
            conditions: Vec::new(),
        })
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> &Combatant {
        &self.members[self.active]
    }

    pub fn active_mut(&mut self) -> &mut Combatant {
        &mut self.members[self.active]
    }

    pub fn get(&self, index: usize) -> Option<&Combatant> {
        self.members.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Combatant> {
        self.members.get_mut(index)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Combatant> {
        self.members.iter_mut()
    }

    pub fn position(&self, id: &CombatantId) -> Option<usize> {
        self.members.iter().position(|c| &c.id == id)
    }

    /// Make another member active; the outgoing one loses its volatile state.
    /// Returns false when the index is out of range.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.members.len() {
            return false;
        }
        if index != self.active {
            self.members[self.active].on_switch_out();
            self.active = index;
        }
        true
    }

    pub fn alive_count(&self) -> usize {
        self.members.iter().filter(|c| !c.is_fainted()).count()
    }

    pub fn all_fainted(&self) -> bool {
        self.alive_count() == 0
    }

    pub fn add_condition(&mut self, condition: &str) {
        if !self.conditions.iter().any(|c| c == condition) {
            self.conditions.push(condition.to_string());
        }
    }

    pub fn remove_condition(&mut self, condition: &str) -> bool {
        let before = self.conditions.len();
        self.conditions.retain(|c| c != condition);
        self.conditions.len() != before
    }
}

impl std::ops::Index<usize> for Roster {
    type Output = Combatant;

    fn index(&self, index: usize) -> &Combatant {
        &self.members[index]
    }
}

impl std::ops::IndexMut<usize> for Roster {
    fn index_mut(&mut self, index: usize) -> &mut Combatant {
        &mut self.members[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatTable;

    fn member(id: &str) -> Combatant {
        Combatant::new(id, "foo", 5, StatTable::splat(50))
    }

    #[test]
    fn test_empty_roster_rejected() {
        assert_eq!(Roster::new(Vec::new()), Err(RosterError::Empty));
    }

    #[test]
    fn test_first_healthy_member_leads() {
        let mut fainted = member("a");
        fainted.set_health(0);
        let roster = Roster::new(vec![fainted, member("b"), member("c")]).unwrap();

        assert_eq!(roster.active().id.as_str(), "b");
        assert_eq!(roster.active_index(), 1);
        assert_eq!(roster.alive_count(), 2);

        let order: Vec<&str> = roster.members().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn test_all_fainted_rejected() {
        let mut a = member("a");
        a.set_health(0);
        assert_eq!(Roster::new(vec![a]), Err(RosterError::AllFainted));
    }

    #[test]
    fn test_set_active_clears_outgoing_boosts() {
        let mut roster = Roster::new(vec![member("a"), member("b")]).unwrap();
        roster
            .active_mut()
            .boosts
            .apply(catchline_protocol::Stat::Atk, 2);

        assert!(roster.set_active(1));
        assert_eq!(roster.active().id.as_str(), "b");
        assert!(roster.get(0).unwrap().boosts.is_clear());
        assert!(!roster.set_active(7));
    }

    #[test]
    fn test_conditions() {
        let mut roster = Roster::new(vec![member("a")]).unwrap();
        roster.add_condition("Reflect");
        roster.add_condition("Reflect");
        assert_eq!(roster.conditions.len(), 1);
        assert!(roster.remove_condition("Reflect"));
        assert!(!roster.remove_condition("Reflect"));
    }
}
