//! Update logic for applying ServerMessage to the tracked state
//!
//! Every rule resolves all referenced combatants first and only then mutates,
//! so a message naming an unknown combatant leaves the state untouched.

use catchline_protocol::{CombatantRef, HpStatus, Player, ServerMessage};

use super::tracker::Tracker;
use crate::catalog::to_id;
use crate::error::TrackError;
use crate::events::{BattleEvent, Effectiveness};
use crate::types::{Combatant, Status};

/// Apply a reported health value when it is in absolute points.
///
/// The engine sends either `current/max` in points or a percentage over 100 and
/// the text does not say which, so only a max that matches ours is trusted.
fn apply_health(combatant: &mut Combatant, hp: Option<&HpStatus>) -> bool {
    match hp {
        Some(HpStatus {
            current,
            max: Some(max),
            ..
        }) if *max == combatant.max_hp() => {
            combatant.set_health(*current);
            true
        }
        _ => false,
    }
}

fn parse_status(code: &str) -> Result<Status, TrackError> {
    Status::from_protocol(code).ok_or_else(|| TrackError::Malformed {
        kind: "status",
        reason: format!("unknown status code {code:?}"),
    })
}

impl Tracker {
    /// Apply one engine message, returning the event it produces, if any
    pub fn apply(&mut self, msg: &ServerMessage) -> Result<Option<BattleEvent>, TrackError> {
        let event = match msg {
            // === Major actions ===
            ServerMessage::Move {
                user,
                move_name,
                target,
                miss,
                still,
            } => {
                let user = self.resolve(user)?;
                let target = target.as_ref().map(|t| self.resolve(t)).transpose()?;
                BattleEvent::MoveUsed {
                    user: self.subject(user),
                    move_name: move_name.clone(),
                    target: target.map(|t| self.subject(t)),
                    miss: *miss,
                    still: *still,
                }
            }

            ServerMessage::Switch {
                target, hp_status, ..
            } => {
                let slot = self.resolve(target)?;
                self.roster_mut(slot.side).set_active(slot.index);
                let combatant = self.get_mut(slot);
                if !apply_health(combatant, hp_status.as_ref()) {
                    tracing::debug!(id = %combatant.id, ?hp_status, "ignoring non-absolute health on switch");
                }
                BattleEvent::Switched {
                    subject: self.subject(slot),
                    health: self.get(slot).health(),
                    max_health: self.get(slot).max_hp(),
                }
            }

            ServerMessage::Faint(target) => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).set_health(0);
                BattleEvent::Fainted(self.subject(slot))
            }

            ServerMessage::Turn(turn) => {
                self.turn = *turn;
                BattleEvent::TurnAdvanced(*turn)
            }

            ServerMessage::Win(winner) => {
                self.winner = Some(winner.clone());
                BattleEvent::Ended {
                    won: winner == self.player_name(),
                    winner: winner.clone(),
                }
            }

            ServerMessage::PpUpdate { target, entries } => {
                let slot = self.resolve(target)?;
                let combatant = self.get_mut(slot);
                let id = combatant.id.clone();
                for (name, pp) in entries {
                    match combatant.move_slot_mut(name) {
                        Some(move_slot) => move_slot.pp = *pp,
                        None => tracing::debug!(%id, name = %name, "pp update for unknown move"),
                    }
                }
                BattleEvent::PpUpdated {
                    subject: self.subject(slot),
                    moves: entries.clone(),
                }
            }

            // === Attack outcomes ===
            ServerMessage::Fail { target, action } => BattleEvent::Failed {
                subject: self.subject(self.resolve(target)?),
                action: action.clone(),
            },
            ServerMessage::Block { target, effect, .. } => BattleEvent::Blocked {
                subject: self.subject(self.resolve(target)?),
                effect: effect.clone(),
            },
            ServerMessage::Crit(target) => BattleEvent::CriticalHit(self.subject(self.resolve(target)?)),
            ServerMessage::SuperEffective(target) => self.effectiveness(target, Effectiveness::Super)?,
            ServerMessage::Resisted(target) => self.effectiveness(target, Effectiveness::Resisted)?,
            ServerMessage::Immune(target) => self.effectiveness(target, Effectiveness::Immune)?,

            // === Health and status ===
            ServerMessage::Damage { target, hp_status } => {
                let slot = self.resolve(target)?;
                if hp_status.as_ref().is_some_and(HpStatus::is_fainted) {
                    // the faint message that follows does the bookkeeping
                    return Ok(None);
                }
                if !apply_health(self.get_mut(slot), hp_status.as_ref()) {
                    tracing::debug!(?target, ?hp_status, "ignoring non-absolute health on damage");
                    return Ok(None);
                }
                BattleEvent::Damaged {
                    subject: self.subject(slot),
                    health: self.get(slot).health(),
                    max_health: self.get(slot).max_hp(),
                }
            }

            ServerMessage::Heal { target, hp_status } => {
                let slot = self.resolve(target)?;
                if !apply_health(self.get_mut(slot), hp_status.as_ref()) {
                    tracing::debug!(?target, ?hp_status, "ignoring non-absolute health on heal");
                    return Ok(None);
                }
                BattleEvent::Healed {
                    subject: self.subject(slot),
                    health: self.get(slot).health(),
                    max_health: self.get(slot).max_hp(),
                }
            }

            ServerMessage::Status { target, status } => {
                let slot = self.resolve(target)?;
                let status = parse_status(status)?;
                self.get_mut(slot).status = Some(status);
                BattleEvent::StatusInflicted {
                    subject: self.subject(slot),
                    status,
                    phrase: status.phrase(),
                }
            }

            ServerMessage::CureStatus { target, status } => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).status = None;
                BattleEvent::StatusCured {
                    subject: self.subject(slot),
                    status: Status::from_protocol(status),
                }
            }

            ServerMessage::CureTeam(target) => {
                let slot = self.resolve(target)?;
                for combatant in self.roster_mut(slot.side).iter_mut() {
                    combatant.status = None;
                }
                BattleEvent::TeamCured(slot.side)
            }

            // === Boosts ===
            ServerMessage::Boost {
                target,
                stat,
                amount,
            } => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).boosts.apply(*stat, *amount);
                BattleEvent::Boost {
                    subject: self.subject(slot),
                    stat: *stat,
                    delta: *amount,
                }
            }

            ServerMessage::Unboost {
                target,
                stat,
                amount,
            } => {
                let slot = self.resolve(target)?;
                let delta = amount.saturating_neg();
                self.get_mut(slot).boosts.apply(*stat, delta);
                BattleEvent::Boost {
                    subject: self.subject(slot),
                    stat: *stat,
                    delta,
                }
            }

            ServerMessage::SwapBoost {
                source,
                target,
                stats,
            } => {
                let (source, target) = (self.resolve(source)?, self.resolve(target)?);
                let mut source_boosts = self.get(source).boosts;
                let mut target_boosts = self.get(target).boosts;
                source_boosts.swap(&mut target_boosts, stats);
                self.get_mut(source).boosts = source_boosts;
                self.get_mut(target).boosts = target_boosts;
                BattleEvent::BoostsSwapped {
                    source: self.subject(source),
                    target: self.subject(target),
                    stats: stats.clone(),
                }
            }

            ServerMessage::InvertBoost(target) => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).boosts.invert();
                BattleEvent::BoostsInverted(self.subject(slot))
            }

            ServerMessage::ClearBoost(target) => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).boosts.clear();
                BattleEvent::BoostsCleared(self.subject(slot))
            }

            ServerMessage::ClearAllBoost => {
                for side in [Player::P1, Player::P2] {
                    self.roster_mut(side).active_mut().boosts.clear();
                }
                BattleEvent::AllBoostsCleared
            }

            ServerMessage::ClearPositiveBoost { target, .. } => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).boosts.clear_positive();
                BattleEvent::PositiveBoostsCleared(self.subject(slot))
            }

            ServerMessage::ClearNegativeBoost(target) => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).boosts.clear_negative();
                BattleEvent::NegativeBoostsCleared(self.subject(slot))
            }

            ServerMessage::CopyBoost { source, target } => {
                let (source, target) = (self.resolve(source)?, self.resolve(target)?);
                let boosts = self.get(source).boosts;
                self.get_mut(target).boosts = boosts;
                BattleEvent::BoostsCopied {
                    source: self.subject(source),
                    target: self.subject(target),
                }
            }

            // === Field ===
            ServerMessage::Weather { weather, upkeep } => {
                if !upkeep {
                    self.weather = match weather.as_str() {
                        "" | "none" => None,
                        w => Some(w.to_string()),
                    };
                }
                BattleEvent::Weather {
                    weather: weather.clone(),
                    upkeep: *upkeep,
                }
            }

            ServerMessage::FieldStart(condition) => {
                if !self.field.contains(condition) {
                    self.field.push(condition.clone());
                }
                BattleEvent::FieldStarted(condition.clone())
            }

            ServerMessage::FieldEnd(condition) => {
                self.field.retain(|c| c != condition);
                BattleEvent::FieldEnded(condition.clone())
            }

            ServerMessage::SideStart { side, condition } => {
                self.roster_mut(side.player).add_condition(condition);
                BattleEvent::SideStarted {
                    side: side.player,
                    condition: condition.clone(),
                }
            }

            ServerMessage::SideEnd { side, condition } => {
                self.roster_mut(side.player).remove_condition(condition);
                BattleEvent::SideEnded {
                    side: side.player,
                    condition: condition.clone(),
                }
            }

            ServerMessage::SwapSideConditions => {
                let [p1, p2] = &mut self.sides;
                std::mem::swap(&mut p1.conditions, &mut p2.conditions);
                BattleEvent::SideConditionsSwapped
            }

            // === Volatiles, abilities, forms ===
            ServerMessage::VolatileStart { target, effect } => {
                let slot = self.resolve(target)?;
                let volatiles = &mut self.get_mut(slot).volatiles;
                if !volatiles.contains(effect) {
                    volatiles.push(effect.clone());
                }
                BattleEvent::VolatileStarted {
                    subject: self.subject(slot),
                    effect: effect.clone(),
                }
            }

            ServerMessage::VolatileEnd { target, effect } => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).volatiles.retain(|v| v != effect);
                BattleEvent::VolatileEnded {
                    subject: self.subject(slot),
                    effect: effect.clone(),
                }
            }

            ServerMessage::Ability {
                target,
                ability,
                from,
            } => {
                let slot = self.resolve(target)?;
                self.get_mut(slot).ability = ability.clone();
                BattleEvent::Ability {
                    subject: self.subject(slot),
                    ability: ability.clone(),
                    from: from.clone(),
                }
            }

            ServerMessage::EndAbility(target) => BattleEvent::AbilityEnded(self.subject(self.resolve(target)?)),

            ServerMessage::Transform { target, species } => {
                let slot = self.resolve(target)?;
                let types = self
                    .catalog
                    .species(species)
                    .map(|s| (s.id.clone(), s.types.clone()));
                let combatant = self.get_mut(slot);
                match types {
                    Some((id, types)) => {
                        combatant.species = id;
                        combatant.types = types;
                    }
                    None => combatant.species = to_id(species),
                }
                BattleEvent::Transformed {
                    subject: self.subject(slot),
                    species: species.clone(),
                }
            }

            // === Move mechanics ===
            ServerMessage::Prepare {
                attacker,
                move_name,
                ..
            } => BattleEvent::Preparing {
                subject: self.subject(self.resolve(attacker)?),
                move_name: move_name.clone(),
            },
            ServerMessage::Nothing => BattleEvent::NothingHappened,
            ServerMessage::MustRecharge(target) => {
                BattleEvent::MustRecharge(self.subject(self.resolve(target)?))
            }
            ServerMessage::HitCount { target, count } => BattleEvent::HitCount {
                subject: self.subject(self.resolve(target)?),
                count: *count,
            },
            ServerMessage::SingleMove { target, move_name } => BattleEvent::SingleMove {
                subject: self.subject(self.resolve(target)?),
                move_name: move_name.clone(),
            },
            ServerMessage::SingleTurn { target, move_name } => BattleEvent::SingleTurn {
                subject: self.subject(self.resolve(target)?),
                move_name: move_name.clone(),
            },

            ServerMessage::Unknown { kind, .. } => {
                tracing::debug!(kind = %kind, "dropping uninterpreted message");
                return Ok(None);
            }
            ServerMessage::Raw(_) => return Ok(None),
        };

        Ok(Some(event))
    }

    fn effectiveness(
        &self,
        target: &CombatantRef,
        outcome: Effectiveness,
    ) -> Result<BattleEvent, TrackError> {
        Ok(BattleEvent::Effectiveness {
            subject: self.subject(self.resolve(target)?),
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use catchline_protocol::{Stat, parse_server_message};

    use super::*;
    use crate::catalog::MemoryCatalog;
    use crate::events::Subject;
    use crate::types::{MoveSlot, Roster, StatTable};

    fn combatant(id: &str) -> Combatant {
        let mut c = Combatant::new(id, "foo", 5, StatTable::splat(50));
        c.moves = vec![MoveSlot::new("Tackle", 35), MoveSlot::new("Vine Whip", 25)];
        c
    }

    fn tracker() -> Tracker {
        let player = Roster::new(vec![combatant("Foo"), combatant("Baz")]).unwrap();
        let opponent = Roster::new(vec![combatant("Bar")]).unwrap();
        Tracker::new(Arc::new(MemoryCatalog::default()), player, opponent, "player")
    }

    fn apply(t: &mut Tracker, line: &str) -> Result<Option<BattleEvent>, TrackError> {
        t.apply(&parse_server_message(line).unwrap())
    }

    fn subject(side: Player, id: &str) -> Subject {
        Subject {
            side,
            id: id.into(),
        }
    }

    #[test]
    fn test_switch_with_matching_max() {
        let mut t = tracker();
        t.roster_mut(Player::P1).get_mut(0).unwrap().set_health(7);

        let event = apply(&mut t, "|switch|p1a: Foo|Foo, L5|20/20").unwrap();
        assert_eq!(
            event,
            Some(BattleEvent::Switched {
                subject: subject(Player::P1, "Foo"),
                health: 20,
                max_health: 20
            })
        );
        assert_eq!(t.active(Player::P1).id.as_str(), "Foo");
        assert_eq!(t.active(Player::P1).health(), 20);
    }

    #[test]
    fn test_switch_changes_active() {
        let mut t = tracker();
        apply(&mut t, "|switch|p1a: Baz|Foo, L5|20/20").unwrap();
        assert_eq!(t.active(Player::P1).id.as_str(), "Baz");
    }

    #[test]
    fn test_percentage_health_is_ignored() {
        let mut t = tracker();
        assert_eq!(apply(&mut t, "|-damage|p2a: Bar|50/100").unwrap(), None);
        assert_eq!(t.active(Player::P2).health(), 20);

        let event = apply(&mut t, "|-damage|p2a: Bar|13/20").unwrap();
        assert_eq!(
            event,
            Some(BattleEvent::Damaged {
                subject: subject(Player::P2, "Bar"),
                health: 13,
                max_health: 20
            })
        );
        assert_eq!(t.active(Player::P2).health(), 13);

        assert_eq!(apply(&mut t, "|-heal|p2a: Bar|90/100").unwrap(), None);
        assert_eq!(t.active(Player::P2).health(), 13);

        let event = apply(&mut t, "|-heal|p2a: Bar|18/20").unwrap();
        assert!(matches!(event, Some(BattleEvent::Healed { health: 18, .. })));
    }

    #[test]
    fn test_fatal_damage_has_no_event() {
        let mut t = tracker();
        assert_eq!(apply(&mut t, "|-damage|p2a: Bar|0 fnt").unwrap(), None);

        let event = apply(&mut t, "|faint|p2a: Bar").unwrap();
        assert_eq!(event, Some(BattleEvent::Fainted(subject(Player::P2, "Bar"))));
        assert!(t.active(Player::P2).is_fainted());
    }

    #[test]
    fn test_unknown_combatant_leaves_state_untouched() {
        let mut t = tracker();
        let before = (t.roster(Player::P1).clone(), t.roster(Player::P2).clone());

        for line in [
            "|switch|p1a: Ghost|Ghost, L5|20/20",
            "|-damage|p1a: Ghost|1/20",
            "|-swapboost|p1a: Foo|p2a: Ghost|atk",
            "|move|p1a: Foo|Tackle|p2a: Ghost",
        ] {
            let err = apply(&mut t, line).unwrap_err();
            assert_eq!(err, TrackError::UnknownCombatant("Ghost".to_string()));
        }

        assert_eq!(t.roster(Player::P1), &before.0);
        assert_eq!(t.roster(Player::P2), &before.1);
    }

    #[test]
    fn test_unboost_reports_negative_delta() {
        let mut t = tracker();
        let event = apply(&mut t, "|-unboost|p2a: Bar|def|2").unwrap();
        assert_eq!(
            event,
            Some(BattleEvent::Boost {
                subject: subject(Player::P2, "Bar"),
                stat: Stat::Def,
                delta: -2
            })
        );
        assert_eq!(t.active(Player::P2).boosts.get(Stat::Def), -2);

        apply(&mut t, "|-boost|p2a: Bar|def|1").unwrap();
        assert_eq!(t.active(Player::P2).boosts.get(Stat::Def), -1);
    }

    #[test]
    fn test_move_used() {
        let mut t = tracker();
        let event = apply(&mut t, "|move|p1a: Foo|Tackle|p2a: Bar|[miss]").unwrap();
        assert_eq!(
            event,
            Some(BattleEvent::MoveUsed {
                user: subject(Player::P1, "Foo"),
                move_name: "Tackle".to_string(),
                target: Some(subject(Player::P2, "Bar")),
                miss: true,
                still: false
            })
        );
    }

    #[test]
    fn test_pp_update_loose_names() {
        let mut t = tracker();
        apply(&mut t, "|pp_update|p1a: Foo|tackle: 30, vine_whip: 4, Growl: 9").unwrap();
        let moves = &t.active(Player::P1).moves;
        assert_eq!(moves[0].pp, 30);
        assert_eq!(moves[1].pp, 4);
    }

    #[test]
    fn test_turn_and_win() {
        let mut t = tracker();
        assert_eq!(
            apply(&mut t, "|turn|3").unwrap(),
            Some(BattleEvent::TurnAdvanced(3))
        );
        assert_eq!(t.turn(), 3);

        let event = apply(&mut t, "|win|opponent").unwrap();
        assert_eq!(
            event,
            Some(BattleEvent::Ended {
                won: false,
                winner: "opponent".to_string()
            })
        );
        assert!(t.is_ended());
    }

    #[test]
    fn test_status_and_cure() {
        let mut t = tracker();
        let event = apply(&mut t, "|-status|p2a: Bar|brn").unwrap();
        assert!(matches!(
            event,
            Some(BattleEvent::StatusInflicted {
                status: Status::Burn,
                phrase: "was burned",
                ..
            })
        ));
        assert_eq!(t.active(Player::P2).status, Some(Status::Burn));

        apply(&mut t, "|-curestatus|p2a: Bar|brn").unwrap();
        assert_eq!(t.active(Player::P2).status, None);

        assert!(apply(&mut t, "|-status|p2a: Bar|zzz").is_err());
    }

    #[test]
    fn test_swap_and_copy_boosts() {
        let mut t = tracker();
        apply(&mut t, "|-boost|p1a: Foo|atk|2").unwrap();
        apply(&mut t, "|-swapboost|p1a: Foo|p2a: Bar|atk").unwrap();
        assert_eq!(t.active(Player::P1).boosts.get(Stat::Atk), 0);
        assert_eq!(t.active(Player::P2).boosts.get(Stat::Atk), 2);

        apply(&mut t, "|-copyboost|p2a: Bar|p1a: Foo").unwrap();
        assert_eq!(t.active(Player::P1).boosts.get(Stat::Atk), 2);

        apply(&mut t, "|-clearallboost").unwrap();
        assert!(t.active(Player::P1).boosts.is_clear());
        assert!(t.active(Player::P2).boosts.is_clear());
    }

    #[test]
    fn test_side_conditions_swap() {
        let mut t = tracker();
        apply(&mut t, "|-sidestart|p1: player|Reflect").unwrap();
        apply(&mut t, "|-swapsideconditions").unwrap();
        assert!(t.roster(Player::P1).conditions.is_empty());
        assert_eq!(t.roster(Player::P2).conditions, vec!["Reflect".to_string()]);
    }

    #[test]
    fn test_weather_upkeep_keeps_state() {
        let mut t = tracker();
        apply(&mut t, "|-weather|RainDance").unwrap();
        apply(&mut t, "|-weather|none|[upkeep]").unwrap();
        assert_eq!(t.weather.as_deref(), Some("RainDance"));
        apply(&mut t, "|-weather|none").unwrap();
        assert_eq!(t.weather, None);
    }

    #[test]
    fn test_unknown_kind_is_dropped() {
        let mut t = tracker();
        assert_eq!(apply(&mut t, "|-anim|p1a: Foo|Tackle").unwrap(), None);
        assert_eq!(apply(&mut t, "Battle started").unwrap(), None);
    }
}
