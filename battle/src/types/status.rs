//! Non-volatile status conditions

use serde::{Deserialize, Serialize};

/// Non-volatile status conditions (persist through switching)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    BadPoison,
    Sleep,
}

impl Status {
    /// Parse from protocol string ("brn", "frz", "par", "psn", "tox", "slp")
    pub fn from_protocol(s: &str) -> Option<Self> {
        match s.trim() {
            "brn" => Some(Status::Burn),
            "frz" => Some(Status::Freeze),
            "par" => Some(Status::Paralysis),
            "psn" => Some(Status::Poison),
            "tox" => Some(Status::BadPoison),
            "slp" => Some(Status::Sleep),
            _ => None,
        }
    }

    pub fn to_protocol(&self) -> &'static str {
        match self {
            Status::Burn => "brn",
            Status::Freeze => "frz",
            Status::Paralysis => "par",
            Status::Poison => "psn",
            Status::BadPoison => "tox",
            Status::Sleep => "slp",
        }
    }

    /// How the battle log words the condition being inflicted
    pub fn phrase(&self) -> &'static str {
        match self {
            Status::Burn => "was burned",
            Status::Freeze => "was frozen solid",
            Status::Paralysis => "was paralyzed",
            Status::Poison => "was poisoned",
            Status::BadPoison => "was badly poisoned",
            Status::Sleep => "fell asleep",
        }
    }

    /// Bonus this condition gives to a capture attempt
    pub fn capture_modifier(status: Option<Status>) -> f64 {
        match status {
            Some(Status::Sleep | Status::Freeze) => 2.0,
            Some(Status::Paralysis | Status::Poison | Status::BadPoison | Status::Burn) => 1.5,
            None => 1.0,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_protocol())
    }
}
