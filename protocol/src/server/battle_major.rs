//! Major battle action message parsers
//!
//! These are the primary actions in battle: moves, switches, faints, turns and
//! the end of the battle. Every parser receives the arguments that follow the
//! message kind, so `args[0]` is the first field after `|kind|`.

use super::ServerMessage;
use super::battle::{
    parse_details, parse_hp_status, parse_number, parse_optional_ref, parse_ref, text,
};
use crate::ParseError;
use anyhow::Result;

/// Parse |move|USER|MOVE|TARGET with optional [miss] / [still] tags
pub fn parse_move(args: &[&str]) -> Result<ServerMessage> {
    let user = parse_ref(args, 0)?;
    let move_name = text(args, 1);
    let target = parse_optional_ref(args, 2);

    let tags = args.iter().skip(2);
    let mut miss = false;
    let mut still = false;
    for tag in tags {
        miss |= tag.contains("[miss]");
        still |= tag.contains("[still]");
    }

    Ok(ServerMessage::Move {
        user,
        move_name,
        target,
        miss,
        still,
    })
}

/// Parse |switch|TARGET|DETAILS|HP STATUS
pub fn parse_switch(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    if target.player.is_none() {
        return Err(ParseError::InvalidFormat("switch target has no side prefix".into()).into());
    }
    let details = parse_details(args, 1);
    let hp_status = parse_hp_status(args, 2);

    Ok(ServerMessage::Switch {
        target,
        details,
        hp_status,
    })
}

/// Parse |faint|TARGET
pub fn parse_faint(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    Ok(ServerMessage::Faint(target))
}

/// Parse |turn|NUMBER
pub fn parse_turn(args: &[&str]) -> Result<ServerMessage> {
    let turn = parse_number(args, 0, "turn")?;
    Ok(ServerMessage::Turn(turn))
}

/// Parse |win|USER
pub fn parse_win(args: &[&str]) -> Result<ServerMessage> {
    let winner = args
        .first()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ParseError::MissingField("winner".to_string()))?;
    Ok(ServerMessage::Win(winner))
}

/// Parse |pp_update|TARGET|Move A: 12, Move B: 30
pub fn parse_pp_update(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let raw = args
        .get(1)
        .ok_or_else(|| ParseError::MissingField("pp list".to_string()))?;

    let mut entries = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, count) = entry
            .rsplit_once(':')
            .ok_or_else(|| ParseError::InvalidFormat(format!("pp entry: {entry}")))?;
        let count: u32 = count
            .trim()
            .parse()
            .map_err(|_| ParseError::InvalidFormat(format!("pp count: {entry}")))?;
        entries.push((name.trim().to_string(), count));
    }

    Ok(ServerMessage::PpUpdate { target, entries })
}
