//! Permanent stats, natures and in-battle stat stages

use catchline_protocol::Stat;
use serde::{Deserialize, Serialize};

/// One value per permanent stat, in the engine's canonical order
/// (hp, atk, def, spa, spd, spe)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatTable {
    pub hp: u16,
    pub atk: u16,
    pub def: u16,
    pub spa: u16,
    pub spd: u16,
    pub spe: u16,
}

impl StatTable {
    pub const fn new(hp: u16, atk: u16, def: u16, spa: u16, spd: u16, spe: u16) -> Self {
        Self {
            hp,
            atk,
            def,
            spa,
            spd,
            spe,
        }
    }

    /// Same value in every slot
    pub const fn splat(value: u16) -> Self {
        Self::new(value, value, value, value, value, value)
    }

    pub fn to_array(self) -> [u16; 6] {
        [self.hp, self.atk, self.def, self.spa, self.spd, self.spe]
    }

    pub fn from_array(values: [u16; 6]) -> Self {
        let [hp, atk, def, spa, spd, spe] = values;
        Self::new(hp, atk, def, spa, spd, spe)
    }

    /// Value for a boostable stat; accuracy and evasion have no permanent value
    pub fn get(&self, stat: Stat) -> Option<u16> {
        match stat {
            Stat::Atk => Some(self.atk),
            Stat::Def => Some(self.def),
            Stat::Spa => Some(self.spa),
            Stat::Spd => Some(self.spd),
            Stat::Spe => Some(self.spe),
            Stat::Accuracy | Stat::Evasion => None,
        }
    }
}

/// Personality that raises one stat by 10% and lowers another by 10%.
/// Neutral natures raise and lower the same stat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    Adamant,
    Bashful,
    Bold,
    Brave,
    Calm,
    Careful,
    Docile,
    Gentle,
    #[default]
    Hardy,
    Hasty,
    Impish,
    Jolly,
    Lax,
    Lonely,
    Mild,
    Modest,
    Naive,
    Naughty,
    Quiet,
    Quirky,
    Rash,
    Relaxed,
    Sassy,
    Serious,
    Timid,
}

impl Nature {
    pub const ALL: [Nature; 25] = [
        Nature::Adamant,
        Nature::Bashful,
        Nature::Bold,
        Nature::Brave,
        Nature::Calm,
        Nature::Careful,
        Nature::Docile,
        Nature::Gentle,
        Nature::Hardy,
        Nature::Hasty,
        Nature::Impish,
        Nature::Jolly,
        Nature::Lax,
        Nature::Lonely,
        Nature::Mild,
        Nature::Modest,
        Nature::Naive,
        Nature::Naughty,
        Nature::Quiet,
        Nature::Quirky,
        Nature::Rash,
        Nature::Relaxed,
        Nature::Sassy,
        Nature::Serious,
        Nature::Timid,
    ];

    /// (raised, lowered)
    pub fn effect(&self) -> (Stat, Stat) {
        use Stat::*;
        match self {
            Nature::Adamant => (Atk, Spa),
            Nature::Bashful => (Spa, Spa),
            Nature::Bold => (Def, Atk),
            Nature::Brave => (Atk, Spe),
            Nature::Calm => (Spd, Atk),
            Nature::Careful => (Spd, Spa),
            Nature::Docile => (Def, Def),
            Nature::Gentle => (Spd, Def),
            Nature::Hardy => (Atk, Atk),
            Nature::Hasty => (Spe, Def),
            Nature::Impish => (Def, Spa),
            Nature::Jolly => (Spe, Spa),
            Nature::Lax => (Def, Spd),
            Nature::Lonely => (Atk, Def),
            Nature::Mild => (Spa, Def),
            Nature::Modest => (Spa, Atk),
            Nature::Naive => (Spe, Spd),
            Nature::Naughty => (Atk, Spd),
            Nature::Quiet => (Spa, Spe),
            Nature::Quirky => (Spd, Spd),
            Nature::Rash => (Spa, Spd),
            Nature::Relaxed => (Def, Spe),
            Nature::Sassy => (Spd, Spe),
            Nature::Serious => (Spe, Spe),
            Nature::Timid => (Spe, Atk),
        }
    }

    /// Multiplier this nature applies to a stat (1.1, 0.9 or 1.0)
    pub fn modifier(&self, stat: Stat) -> f64 {
        let (up, down) = self.effect();
        if up == down {
            1.0
        } else if stat == up {
            1.1
        } else if stat == down {
            0.9
        } else {
            1.0
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Nature::Adamant => "Adamant",
            Nature::Bashful => "Bashful",
            Nature::Bold => "Bold",
            Nature::Brave => "Brave",
            Nature::Calm => "Calm",
            Nature::Careful => "Careful",
            Nature::Docile => "Docile",
            Nature::Gentle => "Gentle",
            Nature::Hardy => "Hardy",
            Nature::Hasty => "Hasty",
            Nature::Impish => "Impish",
            Nature::Jolly => "Jolly",
            Nature::Lax => "Lax",
            Nature::Lonely => "Lonely",
            Nature::Mild => "Mild",
            Nature::Modest => "Modest",
            Nature::Naive => "Naive",
            Nature::Naughty => "Naughty",
            Nature::Quiet => "Quiet",
            Nature::Quirky => "Quirky",
            Nature::Rash => "Rash",
            Nature::Relaxed => "Relaxed",
            Nature::Sassy => "Sassy",
            Nature::Serious => "Serious",
            Nature::Timid => "Timid",
        }
    }

    /// Case-insensitive lookup by name
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|n| n.as_str().eq_ignore_ascii_case(s))
    }
}

const MIN_STAGE: i8 = -6;
const MAX_STAGE: i8 = 6;

/// Stat stages (-6 to +6), one slot per boostable stat
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatStages {
    stages: [i8; 7],
}

fn slot(stat: Stat) -> usize {
    match stat {
        Stat::Atk => 0,
        Stat::Def => 1,
        Stat::Spa => 2,
        Stat::Spd => 3,
        Stat::Spe => 4,
        Stat::Accuracy => 5,
        Stat::Evasion => 6,
    }
}

impl StatStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> i8 {
        self.stages[slot(stat)]
    }

    /// Set stage for a stat (clamped)
    pub fn set(&mut self, stat: Stat, value: i8) {
        self.stages[slot(stat)] = value.clamp(MIN_STAGE, MAX_STAGE);
    }

    /// Apply a signed change, returns the change actually applied
    pub fn apply(&mut self, stat: Stat, delta: i8) -> i8 {
        let current = self.get(stat);
        let next = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        self.set(stat, next);
        next - current
    }

    pub fn clear(&mut self) {
        self.stages = [0; 7];
    }

    pub fn clear_positive(&mut self) {
        self.stages.iter_mut().filter(|s| **s > 0).for_each(|s| *s = 0);
    }

    pub fn clear_negative(&mut self) {
        self.stages.iter_mut().filter(|s| **s < 0).for_each(|s| *s = 0);
    }

    /// Topsy-Turvy
    pub fn invert(&mut self) {
        self.stages.iter_mut().for_each(|s| *s = -*s);
    }

    /// Exchange the listed stats with another set of stages
    pub fn swap(&mut self, other: &mut StatStages, stats: &[Stat]) {
        for stat in stats {
            let i = slot(*stat);
            std::mem::swap(&mut self.stages[i], &mut other.stages[i]);
        }
    }

    pub fn is_clear(&self) -> bool {
        self.stages.iter().all(|s| *s == 0)
    }

    /// Multiplier for a stage on atk/def/spa/spd/spe
    /// +1 = 1.5x ... +6 = 4x, -1 = 0.67x ... -6 = 0.25x
    pub fn multiplier(stage: i8) -> f32 {
        let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as i32;
        if stage >= 0 {
            (2 + stage) as f32 / 2.0
        } else {
            2.0 / (2 - stage) as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_reports_clamped_change() {
        let mut stages = StatStages::new();
        assert_eq!(stages.apply(Stat::Atk, 2), 2);

        stages.set(Stat::Atk, 5);
        assert_eq!(stages.apply(Stat::Atk, 3), 1);
        assert_eq!(stages.get(Stat::Atk), 6);
        assert_eq!(stages.apply(Stat::Atk, 1), 0);

        assert_eq!(stages.apply(Stat::Def, -8), -6);
    }

    #[test]
    fn test_clear_positive_and_negative() {
        let mut stages = StatStages::new();
        stages.set(Stat::Atk, 3);
        stages.set(Stat::Def, -2);

        let mut positive = stages;
        positive.clear_positive();
        assert_eq!(positive.get(Stat::Atk), 0);
        assert_eq!(positive.get(Stat::Def), -2);

        stages.clear_negative();
        assert_eq!(stages.get(Stat::Atk), 3);
        assert_eq!(stages.get(Stat::Def), 0);
    }

    #[test]
    fn test_invert_and_swap() {
        let mut a = StatStages::new();
        a.set(Stat::Spe, -6);
        a.set(Stat::Evasion, 1);
        a.invert();
        assert_eq!(a.get(Stat::Spe), 6);
        assert_eq!(a.get(Stat::Evasion), -1);

        let mut b = StatStages::new();
        b.set(Stat::Atk, 2);
        a.swap(&mut b, &[Stat::Atk, Stat::Spe]);
        assert_eq!(a.get(Stat::Atk), 2);
        assert_eq!(b.get(Stat::Spe), 6);
        assert_eq!(a.get(Stat::Spe), 0);
        assert_eq!(a.get(Stat::Evasion), -1);
    }

    #[test]
    fn test_multiplier() {
        assert!((StatStages::multiplier(0) - 1.0).abs() < 0.001);
        assert!((StatStages::multiplier(1) - 1.5).abs() < 0.001);
        assert!((StatStages::multiplier(6) - 4.0).abs() < 0.001);
        assert!((StatStages::multiplier(-2) - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_nature_modifier() {
        assert_eq!(Nature::Adamant.modifier(Stat::Atk), 1.1);
        assert_eq!(Nature::Adamant.modifier(Stat::Spa), 0.9);
        assert_eq!(Nature::Adamant.modifier(Stat::Spe), 1.0);
        assert_eq!(Nature::Serious.modifier(Stat::Spe), 1.0);
        assert_eq!(Nature::parse("timid"), Some(Nature::Timid));
        assert_eq!(Nature::parse("grumpy"), None);
    }
}
