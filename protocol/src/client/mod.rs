use serde::Serialize;

use crate::server::Player;

/// Body of a `>player` command
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSpec {
    pub name: String,
    pub team: String,
}

/// Commands the client asks the engine to run inside a battle
#[derive(Debug, Clone, PartialEq)]
pub enum ClientCommand {
    /// >start {"format":"FORMAT"}
    Start { format: String },

    /// >player pN {"name":"NAME","team":"PACKED"}
    Player { player: Player, spec: PlayerSpec },

    /// >pN team DIGITS
    TeamOrder { player: Player, order: String },

    /// >pN move INDEX (1-based)
    Move { player: Player, index: usize },

    /// >pN switch IDENT
    Switch { player: Player, ident: String },

    /// >capture pNa, where pN is the side being captured
    Capture { target: Player },

    /// >pN pass
    Pass { player: Player },

    /// Raw command text for catch-all
    Raw(String),
}

impl ClientCommand {
    /// Serialize command to protocol format
    pub fn to_protocol_string(&self) -> String {
        match self {
            Self::Start { format } => {
                format!(">start {}", serde_json::json!({ "format": format }))
            }
            Self::Player { player, spec } => {
                let body = serde_json::to_value(spec).unwrap_or_default();
                format!(">player {} {}", player.as_str(), body)
            }
            Self::TeamOrder { player, order } => format!(">{} team {}", player.as_str(), order),
            Self::Move { player, index } => format!(">{} move {}", player.as_str(), index),
            Self::Switch { player, ident } => format!(">{} switch {}", player.as_str(), ident),
            Self::Capture { target } => format!(">capture {}a", target.as_str()),
            Self::Pass { player } => format!(">{} pass", player.as_str()),
            Self::Raw(command) => command.clone(),
        }
    }
}
