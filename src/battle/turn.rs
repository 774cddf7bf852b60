use crate::battle::calculators::compute_damage;
use crate::battle::modes::{BattleMode, FaintDisposition};
use crate::battle::state::{BattleEvent, EventBus, Side, Winner};
use crate::errors::{EngineError, EngineResult, StateInvariantError};
use crate::team::Team;
use crate::trainer::DamageContext;
use crate::type_chart::TypeChart;
use arena_schema::{MoveCategory, MoveData, SpecialEffect, SpeciesId};
use serde::{Deserialize, Serialize};

/// Phases a round passes through. Exposed on the round outcome so tests can
/// assert the machine ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    AwaitingActions,
    OrderingComputed,
    ActionAExecuted,
    ActionBExecuted,
    RoundComplete,
}

/// A combatant knocked out during a round: which side lost it, who it was,
/// and which opposing roster slot landed the hit (for experience credit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaintRecord {
    pub side: Side,
    pub slot: usize,
    pub species: SpeciesId,
    pub level: u8,
    pub credited_to: Option<usize>,
}

/// A validated move choice: the roster slot that chose it and the resolved
/// catalog record.
#[derive(Debug, Clone)]
pub(crate) struct ChosenMove {
    pub actor_slot: usize,
    pub data: MoveData,
}

pub(crate) struct RoundContext<'a> {
    pub chart: &'a TypeChart,
    pub mode: BattleMode,
    pub damage: [DamageContext; 2],
}

#[derive(Debug)]
pub(crate) struct RoundOutcome {
    pub phase: RoundPhase,
    pub decided: Option<Winner>,
    pub faints: Vec<FaintRecord>,
    /// Whether each team's round-start active fainted this round; feeds the
    /// mode's end-of-turn hook.
    pub active_fainted: [bool; 2],
}

const SIDES: [Side; 2] = [Side::A, Side::B];

/// Resolve one round given both sides' validated choices.
///
/// Higher effective Speed acts first; an exact tie resolves both actions
/// simultaneously against pre-round snapshots. In the sequential case the
/// faster action is fully applied -- damage, faint, and the mode's faint
/// hook -- before the slower is attempted, and a fainted chooser never acts.
pub(crate) fn resolve_round(
    teams: &mut [Team; 2],
    chosen: [ChosenMove; 2],
    ctx: &RoundContext<'_>,
    bus: &mut EventBus,
) -> EngineResult<RoundOutcome> {
    let mut outcome = RoundOutcome {
        phase: RoundPhase::AwaitingActions,
        decided: None,
        faints: Vec::new(),
        active_fainted: [false, false],
    };

    let speed_a = actor_speed(&teams[0], &chosen[0])?;
    let speed_b = actor_speed(&teams[1], &chosen[1])?;
    outcome.phase = RoundPhase::OrderingComputed;

    if speed_a == speed_b {
        resolve_simultaneous(teams, &chosen, ctx, bus, &mut outcome)?;
    } else {
        let first = if speed_a > speed_b { Side::A } else { Side::B };
        let second = first.opponent();

        execute_action(teams, &chosen, first, ctx, bus, &mut outcome, false)?;
        outcome.phase = ordered_phase(first);

        if outcome.decided.is_none() {
            execute_action(teams, &chosen, second, ctx, bus, &mut outcome, true)?;
            outcome.phase = ordered_phase(second);
        }
    }

    outcome.phase = RoundPhase::RoundComplete;
    Ok(outcome)
}

fn ordered_phase(side: Side) -> RoundPhase {
    match side {
        Side::A => RoundPhase::ActionAExecuted,
        Side::B => RoundPhase::ActionBExecuted,
    }
}

fn actor_speed(team: &Team, chosen: &ChosenMove) -> EngineResult<u16> {
    let actor = team.member(chosen.actor_slot).ok_or_else(|| {
        EngineError::StateInvariant(StateInvariantError::OrderingOutOfBounds {
            team: team.trainer_name.clone(),
            slot: chosen.actor_slot,
        })
    })?;
    Ok(actor.stats.speed)
}

/// Execute one side's action in the sequential case.
fn execute_action(
    teams: &mut [Team; 2],
    chosen: &[ChosenMove; 2],
    side: Side,
    ctx: &RoundContext<'_>,
    bus: &mut EventBus,
    outcome: &mut RoundOutcome,
    may_be_fainted: bool,
) -> EngineResult<()> {
    let choice = &chosen[side.index()];
    let actor = &teams[side.index()].members()[choice.actor_slot];

    if actor.is_fainted() {
        if !may_be_fainted {
            return Err(EngineError::StateInvariant(
                StateInvariantError::ActivePointerOnFainted {
                    team: teams[side.index()].trainer_name.clone(),
                    slot: choice.actor_slot,
                },
            ));
        }
        bus.push(BattleEvent::ActionSkipped {
            side,
            combatant: actor.name.clone(),
        });
        return Ok(());
    }

    bus.push(BattleEvent::MoveUsed {
        side,
        combatant: actor.name.clone(),
        move_name: choice.data.name.clone(),
    });

    match choice.data.category {
        MoveCategory::Damage => {
            let damage = {
                let attacker = &teams[side.index()].members()[choice.actor_slot];
                let defender_team = &teams[side.opponent().index()];
                let Some(defender) = defender_team.active() else {
                    return Err(EngineError::StateInvariant(
                        StateInvariantError::NoActiveCombatant {
                            team: defender_team.trainer_name.clone(),
                        },
                    ));
                };
                compute_damage(
                    attacker,
                    defender,
                    &choice.data,
                    ctx.chart,
                    ctx.damage[side.index()],
                )?
            };
            apply_hit(teams, side, choice.actor_slot, damage, ctx, bus, outcome)?;
        }
        MoveCategory::Special(effect) => {
            apply_special(&mut teams[side.index()], side, effect, ctx, bus);
        }
    }
    Ok(())
}

/// Commit a damage outcome to the defending side's active combatant and run
/// the faint path if it drops.
fn apply_hit(
    teams: &mut [Team; 2],
    attacker_side: Side,
    attacker_slot: usize,
    damage: crate::battle::calculators::DamageOutcome,
    ctx: &RoundContext<'_>,
    bus: &mut EventBus,
    outcome: &mut RoundOutcome,
) -> EngineResult<()> {
    let defender_side = attacker_side.opponent();
    let defender_team = &mut teams[defender_side.index()];
    let defender_slot = defender_team.active_slot().ok_or_else(|| {
        EngineError::StateInvariant(StateInvariantError::NoActiveCombatant {
            team: defender_team.trainer_name.clone(),
        })
    })?;

    let defender = defender_team
        .member_mut(defender_slot)
        .expect("active slot is in the roster");
    defender.apply_damage(damage.amount);
    bus.push(BattleEvent::DamageDealt {
        side: defender_side,
        combatant: defender.name.clone(),
        amount: damage.amount,
        effectiveness: damage.effectiveness,
        remaining_hp: defender.current_hp(),
    });

    if defender.is_fainted() {
        record_faint(
            teams,
            defender_side,
            defender_slot,
            Some(attacker_slot),
            bus,
            outcome,
        );
        handle_faint(teams, defender_side, ctx, bus, outcome);
    } else {
        ctx.mode.on_state_change(&mut teams[defender_side.index()]);
    }
    Ok(())
}

fn record_faint(
    teams: &[Team; 2],
    side: Side,
    slot: usize,
    credited_to: Option<usize>,
    bus: &mut EventBus,
    outcome: &mut RoundOutcome,
) {
    let fallen = &teams[side.index()].members()[slot];
    bus.push(BattleEvent::Fainted {
        side,
        combatant: fallen.name.clone(),
    });
    outcome.faints.push(FaintRecord {
        side,
        slot,
        species: fallen.species.clone(),
        level: fallen.level,
        credited_to,
    });
    if teams[side.index()].active_slot() == Some(slot) {
        outcome.active_fainted[side.index()] = true;
    }
}

/// Run the mode's faint hook and translate its disposition into either a
/// decided battle or a new active combatant.
fn handle_faint(
    teams: &mut [Team; 2],
    fainted_side: Side,
    ctx: &RoundContext<'_>,
    bus: &mut EventBus,
    outcome: &mut RoundOutcome,
) {
    let team = &mut teams[fainted_side.index()];
    match ctx.mode.on_faint(team) {
        FaintDisposition::TeamDefeated => {
            bus.push(BattleEvent::TeamDefeated { side: fainted_side });
            let winner = match outcome.decided {
                // The other side was already defeated this round.
                Some(_) => Winner::Draw,
                None => Winner::for_side(fainted_side.opponent()),
            };
            outcome.decided = Some(winner);
        }
        FaintDisposition::Continue => {
            if let Some(next) = team.active() {
                bus.push(BattleEvent::ActiveChanged {
                    side: fainted_side,
                    combatant: next.name.clone(),
                });
            }
            bus.push(BattleEvent::TeamReordered {
                side: fainted_side,
                order: team.order().to_vec(),
            });
        }
    }
}

fn apply_special(
    team: &mut Team,
    side: Side,
    effect: SpecialEffect,
    ctx: &RoundContext<'_>,
    bus: &mut EventBus,
) {
    match effect {
        SpecialEffect::InvertOrder => {
            team.inverted = !team.inverted;
            ctx.mode.on_state_change(team);
        }
        SpecialEffect::ReverseBench => {
            team.reverse_bench();
        }
    }
    bus.push(BattleEvent::SpecialTriggered { side, effect });
    bus.push(BattleEvent::TeamReordered {
        side,
        order: team.order().to_vec(),
    });
    if let Some(active) = team.active() {
        bus.push(BattleEvent::ActiveChanged {
            side,
            combatant: active.name.clone(),
        });
    }
}

/// Speed-tie path: both damages are computed from the same pre-round
/// snapshot of both actives, then committed together, so the order of
/// computation cannot affect either number. Specials apply after the
/// damage commit; faints are processed last, and a double knockout of both
/// final combatants is a draw.
fn resolve_simultaneous(
    teams: &mut [Team; 2],
    chosen: &[ChosenMove; 2],
    ctx: &RoundContext<'_>,
    bus: &mut EventBus,
    outcome: &mut RoundOutcome,
) -> EngineResult<()> {
    // Pre-round snapshot: the active combatants as they stand, frozen.
    let snapshot: Vec<_> = SIDES
        .map(|side| {
            let team = &teams[side.index()];
            team.active_slot().map(|slot| team.members()[slot].clone())
        })
        .into_iter()
        .collect();

    // Compute both damage outcomes against the frozen state.
    let mut hits: [Option<(usize, crate::battle::calculators::DamageOutcome)>; 2] = [None, None];
    for side in SIDES {
        let choice = &chosen[side.index()];
        let attacker = &teams[side.index()].members()[choice.actor_slot];
        if attacker.is_fainted() {
            return Err(EngineError::StateInvariant(
                StateInvariantError::ActivePointerOnFainted {
                    team: teams[side.index()].trainer_name.clone(),
                    slot: choice.actor_slot,
                },
            ));
        }
        bus.push(BattleEvent::MoveUsed {
            side,
            combatant: attacker.name.clone(),
            move_name: choice.data.name.clone(),
        });
        if let MoveCategory::Damage = choice.data.category {
            let defender_side = side.opponent();
            let Some(defender) = snapshot[defender_side.index()].as_ref() else {
                return Err(EngineError::StateInvariant(
                    StateInvariantError::NoActiveCombatant {
                        team: teams[defender_side.index()].trainer_name.clone(),
                    },
                ));
            };
            let defender_slot = teams[defender_side.index()]
                .active_slot()
                .expect("snapshot implies an active slot");
            let damage = compute_damage(
                attacker,
                defender,
                &choice.data,
                ctx.chart,
                ctx.damage[side.index()],
            )?;
            hits[side.index()] = Some((defender_slot, damage));
        }
    }

    // Commit both HP changes together.
    for side in SIDES {
        if let Some((defender_slot, damage)) = hits[side.index()] {
            let defender_side = side.opponent();
            let defender = teams[defender_side.index()]
                .member_mut(defender_slot)
                .expect("snapshot slot is in the roster");
            defender.apply_damage(damage.amount);
            bus.push(BattleEvent::DamageDealt {
                side: defender_side,
                combatant: defender.name.clone(),
                amount: damage.amount,
                effectiveness: damage.effectiveness,
                remaining_hp: defender.current_hp(),
            });
        }
    }

    // Specials apply to their own team after the damage commit.
    for side in SIDES {
        let choice = &chosen[side.index()];
        if let MoveCategory::Special(effect) = choice.data.category {
            apply_special(&mut teams[side.index()], side, effect, ctx, bus);
        }
    }

    // Process faints after both commits; both teams may lose here.
    for side in SIDES {
        if let Some((defender_slot, _)) = hits[side.opponent().index()] {
            let defender_team = &teams[side.index()];
            if defender_team.members()[defender_slot].is_fainted() {
                let attacker_slot = chosen[side.opponent().index()].actor_slot;
                record_faint(teams, side, defender_slot, Some(attacker_slot), bus, outcome);
                handle_faint(teams, side, ctx, bus, outcome);
            } else {
                ctx.mode.on_state_change(&mut teams[side.index()]);
            }
        }
    }
    Ok(())
}
