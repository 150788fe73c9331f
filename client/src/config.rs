use catchline_battle::Terrain;
use catchline_protocol::DEFAULT_MAX_LINE;
use serde::Deserialize;

/// Whether the opposing side can be captured
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encounter {
    #[default]
    Wild,
    Trainer,
}

/// Everything a session needs besides the rosters and the catalog
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub host: String,
    pub port: u16,
    /// Format passed to `>start`
    pub format: String,
    pub player_name: String,
    pub opponent_name: String,
    /// Global multiplier applied to the capture value
    pub catch_rate_multiplier: f64,
    /// Pick and send the opponent's move whenever a turn begins
    pub auto_opponent: bool,
    pub encounter: Encounter,
    pub terrain: Terrain,
    /// Inbound lines longer than this are dropped and reported as decode failures
    pub max_line_bytes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            format: "nationaldexag".to_string(),
            player_name: "player".to_string(),
            opponent_name: "opponent".to_string(),
            catch_rate_multiplier: 1.0,
            auto_opponent: true,
            encounter: Encounter::Wild,
            terrain: Terrain::Grass,
            max_line_bytes: DEFAULT_MAX_LINE,
        }
    }
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
