mod battle;
mod battle_major;
mod battle_minor;

pub use battle::{CombatantDetails, CombatantRef, HpStatus, Player, Side, Stat};

use crate::ParseError;
use anyhow::Result;

/// A battle log line interpreted by kind
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    // === Major actions ===
    Move {
        user: CombatantRef,
        move_name: String,
        target: Option<CombatantRef>,
        miss: bool,
        still: bool,
    },
    Switch {
        target: CombatantRef,
        details: CombatantDetails,
        hp_status: Option<HpStatus>,
    },
    Faint(CombatantRef),
    Turn(u32),
    Win(String),
    PpUpdate {
        target: CombatantRef,
        entries: Vec<(String, u32)>,
    },

    // === Attack outcomes ===
    Fail {
        target: CombatantRef,
        action: Option<String>,
    },
    Block {
        target: CombatantRef,
        effect: String,
        move_name: Option<String>,
        attacker: Option<CombatantRef>,
    },
    Crit(CombatantRef),
    SuperEffective(CombatantRef),
    Resisted(CombatantRef),
    Immune(CombatantRef),

    // === HP and status ===
    Damage {
        target: CombatantRef,
        hp_status: Option<HpStatus>,
    },
    Heal {
        target: CombatantRef,
        hp_status: Option<HpStatus>,
    },
    Status {
        target: CombatantRef,
        status: String,
    },
    CureStatus {
        target: CombatantRef,
        status: String,
    },
    CureTeam(CombatantRef),

    // === Boosts ===
    Boost {
        target: CombatantRef,
        stat: Stat,
        amount: i8,
    },
    Unboost {
        target: CombatantRef,
        stat: Stat,
        amount: i8,
    },
    SwapBoost {
        source: CombatantRef,
        target: CombatantRef,
        stats: Vec<Stat>,
    },
    InvertBoost(CombatantRef),
    ClearBoost(CombatantRef),
    ClearAllBoost,
    ClearPositiveBoost {
        target: CombatantRef,
        source: Option<CombatantRef>,
        effect: Option<String>,
    },
    ClearNegativeBoost(CombatantRef),
    CopyBoost {
        source: CombatantRef,
        target: CombatantRef,
    },

    // === Field ===
    Weather {
        weather: String,
        upkeep: bool,
    },
    FieldStart(String),
    FieldEnd(String),
    SideStart {
        side: Side,
        condition: String,
    },
    SideEnd {
        side: Side,
        condition: String,
    },
    SwapSideConditions,

    // === Volatiles, abilities, forms ===
    VolatileStart {
        target: CombatantRef,
        effect: String,
    },
    VolatileEnd {
        target: CombatantRef,
        effect: String,
    },
    Ability {
        target: CombatantRef,
        ability: String,
        from: Option<String>,
    },
    EndAbility(CombatantRef),
    Transform {
        target: CombatantRef,
        species: String,
    },

    // === Move mechanics ===
    Prepare {
        attacker: CombatantRef,
        move_name: String,
        defender: Option<CombatantRef>,
    },
    Nothing,
    MustRecharge(CombatantRef),
    HitCount {
        target: CombatantRef,
        count: u32,
    },
    SingleMove {
        target: CombatantRef,
        move_name: String,
    },
    SingleTurn {
        target: CombatantRef,
        move_name: String,
    },

    /// Well-formed line of a kind this client does not interpret
    Unknown { kind: String, line: String },
    /// Line without any `|` structure
    Raw(String),
}

/// A `|`-delimited line split into its kind and arguments
#[derive(Debug, Clone, PartialEq)]
pub struct Tokens<'a> {
    pub kind: &'a str,
    pub args: Vec<&'a str>,
}

/// Split a line on `|`; the first non-empty token is the kind
pub fn tokenize(line: &str) -> Option<Tokens<'_>> {
    if !line.contains('|') {
        return None;
    }

    let mut parts = line.split('|').skip_while(|p| p.trim().is_empty());
    let kind = parts.next()?.trim();
    Some(Tokens {
        kind,
        args: parts.collect(),
    })
}

/// Parse a single battle log line into a ServerMessage
pub fn parse_server_message(line: &str) -> Result<ServerMessage> {
    let line = line.trim_end_matches(['\r', '\n']);

    if line.trim().is_empty() {
        return Err(ParseError::EmptyMessage.into());
    }

    let Some(tokens) = tokenize(line) else {
        return Ok(ServerMessage::Raw(line.to_string()));
    };
    let args = tokens.args.as_slice();

    match tokens.kind {
        "move" => battle_major::parse_move(args),
        "switch" => battle_major::parse_switch(args),
        "faint" => battle_major::parse_faint(args),
        "turn" => battle_major::parse_turn(args),
        "win" => battle_major::parse_win(args),
        "pp_update" => battle_major::parse_pp_update(args),

        "-fail" => battle_minor::parse_fail(args),
        "-block" => battle_minor::parse_block(args),
        "-crit" => battle_minor::parse_crit(args),
        "-supereffective" => battle_minor::parse_supereffective(args),
        "-resisted" => battle_minor::parse_resisted(args),
        "-immune" => battle_minor::parse_immune(args),

        "-damage" => battle_minor::parse_damage(args),
        "-heal" | "heal" => battle_minor::parse_heal(args),
        "-status" => battle_minor::parse_status(args),
        "-curestatus" => battle_minor::parse_curestatus(args),
        "-cureteam" => battle_minor::parse_cureteam(args),

        "-boost" => battle_minor::parse_boost(args),
        "-unboost" => battle_minor::parse_unboost(args),
        "-swapboost" => battle_minor::parse_swapboost(args),
        "-invertboost" => battle_minor::parse_invertboost(args),
        "-clearboost" => battle_minor::parse_clearboost(args),
        "-clearallboost" => Ok(ServerMessage::ClearAllBoost),
        "-clearpositiveboost" => battle_minor::parse_clearpositiveboost(args),
        "-clearnegativeboost" => battle_minor::parse_clearnegativeboost(args),
        "-copyboost" => battle_minor::parse_copyboost(args),

        "-weather" => battle_minor::parse_weather(args),
        "-fieldstart" => battle_minor::parse_fieldstart(args),
        "-fieldend" => battle_minor::parse_fieldend(args),
        "-sidestart" => battle_minor::parse_sidestart(args),
        "-sideend" => battle_minor::parse_sideend(args),
        "-swapsideconditions" => Ok(ServerMessage::SwapSideConditions),

        "-start" => battle_minor::parse_start(args),
        "-end" => battle_minor::parse_end(args),
        "-ability" => battle_minor::parse_ability(args),
        "-endability" => battle_minor::parse_endability(args),
        "-transform" => battle_minor::parse_transform(args),

        "-prepare" => battle_minor::parse_prepare(args),
        "-nothing" => Ok(ServerMessage::Nothing),
        "-mustrecharge" => battle_minor::parse_mustrecharge(args),
        "-hitcount" => battle_minor::parse_hitcount(args),
        "-singlemove" => battle_minor::parse_singlemove(args),
        "-singleturn" => battle_minor::parse_singleturn(args),

        other => Ok(ServerMessage::Unknown {
            kind: other.to_string(),
            line: line.to_string(),
        }),
    }
}
