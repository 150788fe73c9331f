//! Minor battle action message parsers
//!
//! These are secondary effects in battle: damage, stat changes, status, etc.
//! In the official client, they're usually displayed in smaller font.

use super::ServerMessage;
use super::battle::{
    Side, Stat, parse_hp_status, parse_number, parse_optional_ref, parse_ref, parse_stat, text,
};
use crate::ParseError;
use anyhow::Result;

fn find_from(args: &[&str]) -> Option<String> {
    args.iter()
        .find(|a| a.contains("[from]"))
        .map(|a| a.replace("[from]", "").trim().to_string())
}

/// Parse |-fail|TARGET|ACTION
pub fn parse_fail(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let action = args.get(1).map(|s| s.to_string());

    Ok(ServerMessage::Fail { target, action })
}

/// Parse |-block|TARGET|EFFECT|MOVE|ATTACKER
pub fn parse_block(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let effect = text(args, 1);
    let move_name = args.get(2).map(|s| s.to_string());
    let attacker = parse_optional_ref(args, 3);

    Ok(ServerMessage::Block {
        target,
        effect,
        move_name,
        attacker,
    })
}

/// Parse |-damage|TARGET|HP STATUS
pub fn parse_damage(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let hp_status = parse_hp_status(args, 1);

    Ok(ServerMessage::Damage { target, hp_status })
}

/// Parse |-heal|TARGET|HP STATUS (the original engine also sends |heal|)
pub fn parse_heal(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let hp_status = parse_hp_status(args, 1);

    Ok(ServerMessage::Heal { target, hp_status })
}

/// Parse |-status|TARGET|STATUS
pub fn parse_status(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let status = text(args, 1);

    Ok(ServerMessage::Status { target, status })
}

/// Parse |-curestatus|TARGET|STATUS
pub fn parse_curestatus(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let status = text(args, 1);

    Ok(ServerMessage::CureStatus { target, status })
}

/// Parse |-cureteam|TARGET
pub fn parse_cureteam(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    Ok(ServerMessage::CureTeam(target))
}

/// Parse |-boost|TARGET|STAT|AMOUNT
pub fn parse_boost(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let stat = parse_stat(args, 1)?;
    let amount = parse_number(args, 2, "amount")?;

    Ok(ServerMessage::Boost {
        target,
        stat,
        amount,
    })
}

/// Parse |-unboost|TARGET|STAT|AMOUNT
pub fn parse_unboost(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let stat = parse_stat(args, 1)?;
    let amount = parse_number(args, 2, "amount")?;

    Ok(ServerMessage::Unboost {
        target,
        stat,
        amount,
    })
}

/// Parse |-swapboost|SOURCE|TARGET|STATS
pub fn parse_swapboost(args: &[&str]) -> Result<ServerMessage> {
    let source = parse_ref(args, 0)?;
    let target = parse_ref(args, 1)?;
    let stats: Vec<Stat> = args
        .get(2)
        .map(|s| s.split(',').filter_map(Stat::parse).collect())
        .unwrap_or_else(|| Stat::ALL.to_vec());

    Ok(ServerMessage::SwapBoost {
        source,
        target,
        stats,
    })
}

/// Parse |-invertboost|TARGET
pub fn parse_invertboost(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    Ok(ServerMessage::InvertBoost(target))
}

/// Parse |-clearboost|TARGET
pub fn parse_clearboost(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    Ok(ServerMessage::ClearBoost(target))
}

/// Parse |-clearpositiveboost|TARGET|SOURCE|EFFECT
pub fn parse_clearpositiveboost(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let source = parse_optional_ref(args, 1);
    let effect = args.get(2).map(|s| s.to_string());

    Ok(ServerMessage::ClearPositiveBoost {
        target,
        source,
        effect,
    })
}

/// Parse |-clearnegativeboost|TARGET
pub fn parse_clearnegativeboost(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    Ok(ServerMessage::ClearNegativeBoost(target))
}

/// Parse |-copyboost|SOURCE|TARGET
pub fn parse_copyboost(args: &[&str]) -> Result<ServerMessage> {
    let source = parse_ref(args, 0)?;
    let target = parse_ref(args, 1)?;

    Ok(ServerMessage::CopyBoost { source, target })
}

/// Parse |-weather|WEATHER
pub fn parse_weather(args: &[&str]) -> Result<ServerMessage> {
    let weather = args.first().unwrap_or(&"none").to_string();
    let upkeep = args.iter().any(|a| *a == "[upkeep]");

    Ok(ServerMessage::Weather { weather, upkeep })
}

/// Parse |-fieldstart|CONDITION
pub fn parse_fieldstart(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::FieldStart(text(args, 0)))
}

/// Parse |-fieldend|CONDITION
pub fn parse_fieldend(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::FieldEnd(text(args, 0)))
}

fn parse_side(args: &[&str]) -> Result<Side> {
    args.first()
        .and_then(|s| Side::parse(s))
        .ok_or_else(|| ParseError::MissingField("side".to_string()).into())
}

/// Parse |-sidestart|SIDE|CONDITION
pub fn parse_sidestart(args: &[&str]) -> Result<ServerMessage> {
    let side = parse_side(args)?;
    let condition = text(args, 1);

    Ok(ServerMessage::SideStart { side, condition })
}

/// Parse |-sideend|SIDE|CONDITION
pub fn parse_sideend(args: &[&str]) -> Result<ServerMessage> {
    let side = parse_side(args)?;
    let condition = text(args, 1);

    Ok(ServerMessage::SideEnd { side, condition })
}

/// Parse |-start|TARGET|EFFECT
pub fn parse_start(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let effect = text(args, 1);

    Ok(ServerMessage::VolatileStart { target, effect })
}

/// Parse |-end|TARGET|EFFECT
pub fn parse_end(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let effect = text(args, 1);

    Ok(ServerMessage::VolatileEnd { target, effect })
}

/// Parse |-crit|TARGET
pub fn parse_crit(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Crit(parse_ref(args, 0)?))
}

/// Parse |-supereffective|TARGET
pub fn parse_supereffective(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::SuperEffective(parse_ref(args, 0)?))
}

/// Parse |-resisted|TARGET
pub fn parse_resisted(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Resisted(parse_ref(args, 0)?))
}

/// Parse |-immune|TARGET
pub fn parse_immune(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::Immune(parse_ref(args, 0)?))
}

/// Parse |-ability|TARGET|ABILITY with optional [from]EFFECT
pub fn parse_ability(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let ability = text(args, 1);
    let from = args.get(2..).and_then(find_from);

    Ok(ServerMessage::Ability {
        target,
        ability,
        from,
    })
}

/// Parse |-endability|TARGET
pub fn parse_endability(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::EndAbility(parse_ref(args, 0)?))
}

/// Parse |-transform|TARGET|SPECIES
pub fn parse_transform(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let species = text(args, 1);

    Ok(ServerMessage::Transform { target, species })
}

/// Parse |-prepare|ATTACKER|MOVE or |-prepare|ATTACKER|MOVE|DEFENDER
pub fn parse_prepare(args: &[&str]) -> Result<ServerMessage> {
    let attacker = parse_ref(args, 0)?;
    let move_name = text(args, 1);
    let defender = parse_optional_ref(args, 2);

    Ok(ServerMessage::Prepare {
        attacker,
        move_name,
        defender,
    })
}

/// Parse |-mustrecharge|TARGET
pub fn parse_mustrecharge(args: &[&str]) -> Result<ServerMessage> {
    Ok(ServerMessage::MustRecharge(parse_ref(args, 0)?))
}

/// Parse |-hitcount|TARGET|NUM
pub fn parse_hitcount(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let count = parse_number(args, 1, "hit count")?;

    Ok(ServerMessage::HitCount { target, count })
}

/// Parse |-singlemove|TARGET|MOVE
pub fn parse_singlemove(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let move_name = text(args, 1);

    Ok(ServerMessage::SingleMove { target, move_name })
}

/// Parse |-singleturn|TARGET|MOVE
pub fn parse_singleturn(args: &[&str]) -> Result<ServerMessage> {
    let target = parse_ref(args, 0)?;
    let move_name = text(args, 1);

    Ok(ServerMessage::SingleTurn { target, move_name })
}
