use crate::battle::modes::BattleMode;
use crate::battle::selectors::ActionSelector;
use crate::battle::state::{BattleEvent, EventBus, GameState, Side, Winner};
use crate::battle::turn::{self, ChosenMove, FaintRecord, RoundContext};
use crate::catalog::MoveCatalog;
use crate::combatant::Combatant;
use crate::errors::{
    ConfigurationError, EngineError, EngineResult, InvalidActionError, StateInvariantError,
};
use crate::team::Team;
use crate::trainer::DamageContext;
use crate::type_chart::TypeChart;
use arena_schema::SpeciesId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// An action submitted for one side's active combatant. Which move or
/// target gets chosen is always the caller's decision, never the engine's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    UseMove { move_index: usize },
    Forfeit,
}

/// Engine tuning knobs. The round limit converts a special-move stalemate
/// into a draw; the retry budget bounds re-prompting after invalid actions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BattleConfig {
    pub round_limit: u32,
    pub action_retries: u32,
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            round_limit: 500,
            action_retries: 3,
        }
    }
}

/// Read-only static data a battle runs against.
#[derive(Debug, Clone, Copy)]
pub struct EngineContext<'a> {
    pub chart: &'a TypeChart,
    pub moves: &'a MoveCatalog,
}

/// Structured result of a finished (or aborted) battle. Team ownership
/// moves back out to the caller here.
#[derive(Debug)]
pub struct BattleOutcome {
    /// None only when the battle was abandoned between rounds.
    pub winner: Option<Winner>,
    /// Completed rounds.
    pub rounds: u32,
    pub events: Vec<BattleEvent>,
    pub faints: Vec<FaintRecord>,
    /// Species each side encountered on the opposing side, for Pokedex
    /// registration.
    pub encountered: [Vec<SpeciesId>; 2],
    pub teams: [Team; 2],
}

impl BattleOutcome {
    pub fn survivors(&self, side: Side) -> Vec<&Combatant> {
        self.teams[side.index()]
            .members()
            .iter()
            .filter(|c| !c.is_fainted())
            .collect()
    }
}

/// A battle in progress. Owns both teams exclusively for its duration and
/// drives rounds to a terminal result.
///
/// Hosts that need an abort point drive the battle round by round with
/// [`Battle::resolve_round`]; after any completed round the event log is
/// consistent and the battle can be dropped or converted with
/// [`Battle::into_outcome`].
pub struct Battle<'a> {
    ctx: EngineContext<'a>,
    mode: BattleMode,
    config: BattleConfig,
    teams: [Team; 2],
    damage: [DamageContext; 2],
    round: u32,
    state: GameState,
    bus: EventBus,
    faints: Vec<FaintRecord>,
    encountered: [BTreeSet<SpeciesId>; 2],
}

impl<'a> Battle<'a> {
    pub fn new(
        ctx: EngineContext<'a>,
        mut team_a: Team,
        mut team_b: Team,
        mode: BattleMode,
        damage_a: DamageContext,
        damage_b: DamageContext,
        config: BattleConfig,
    ) -> EngineResult<Battle<'a>> {
        for team in [&team_a, &team_b] {
            if team.is_defeated() {
                return Err(ConfigurationError::InvalidTeam(format!(
                    "{} has no conscious combatants to field",
                    team.trainer_name
                ))
                .into());
            }
        }
        mode.select_initial_active(&mut team_a);
        mode.select_initial_active(&mut team_b);

        let mut battle = Battle {
            ctx,
            mode,
            config,
            teams: [team_a, team_b],
            damage: [damage_a, damage_b],
            round: 1,
            state: GameState::WaitingForActions,
            bus: EventBus::new(),
            faints: Vec::new(),
            encountered: [BTreeSet::new(), BTreeSet::new()],
        };
        battle.record_encounters();
        Ok(battle)
    }

    pub fn context(&self) -> EngineContext<'a> {
        self.ctx
    }

    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    pub fn team(&self, side: Side) -> &Team {
        &self.teams[side.index()]
    }

    pub fn damage_context(&self, side: Side) -> DamageContext {
        self.damage[side.index()]
    }

    pub fn game_state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        matches!(self.state, GameState::Finished(_))
    }

    /// Current round number (1-based); rounds already completed is one less.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn events(&self) -> &[BattleEvent] {
        self.bus.events()
    }

    /// Every action the given side may legally submit this round.
    pub fn legal_actions(&self, side: Side) -> Vec<Action> {
        if self.is_over() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        if let Some(active) = self.teams[side.index()].active() {
            if !active.is_fainted() {
                for (index, move_id) in active.moves.iter().enumerate() {
                    let legal = match self.ctx.moves.get(move_id) {
                        Ok(data) => self.mode.is_special_move_legal(data),
                        Err(_) => false,
                    };
                    if legal {
                        actions.push(Action::UseMove { move_index: index });
                    }
                }
            }
        }
        actions.push(Action::Forfeit);
        actions
    }

    /// Check an action without advancing any state. Invalid submissions are
    /// recoverable: the caller re-prompts and submits again.
    pub fn validate(&self, side: Side, action: Action) -> EngineResult<()> {
        if self.is_over() {
            return Err(InvalidActionError::BattleFinished.into());
        }
        match action {
            Action::Forfeit => Ok(()),
            Action::UseMove { move_index } => {
                let team = &self.teams[side.index()];
                let active = team.active().ok_or_else(|| {
                    EngineError::StateInvariant(StateInvariantError::NoActiveCombatant {
                        team: team.trainer_name.clone(),
                    })
                })?;
                if active.is_fainted() {
                    return Err(InvalidActionError::FaintedActor {
                        combatant: active.name.clone(),
                    }
                    .into());
                }
                let move_id = active.moves.get(move_index).ok_or(
                    InvalidActionError::MoveIndexOutOfRange {
                        index: move_index,
                        moves: active.moves.len(),
                    },
                )?;
                let data = self.ctx.moves.get(move_id)?;
                if data.is_special() && !self.mode.is_special_move_legal(data) {
                    return Err(InvalidActionError::SpecialMoveIllegal {
                        move_id: data.id.clone(),
                        mode: self.mode.kind(),
                    }
                    .into());
                }
                Ok(())
            }
        }
    }

    /// Resolve one full round from both sides' submitted actions.
    pub fn resolve_round(&mut self, action_a: Action, action_b: Action) -> EngineResult<GameState> {
        if let GameState::Finished(_) = self.state {
            return Err(EngineError::StateInvariant(
                StateInvariantError::RoundAfterCompletion { turn: self.round },
            ));
        }
        self.validate(Side::A, action_a)?;
        self.validate(Side::B, action_b)?;

        self.state = GameState::RoundInProgress;
        self.bus.push(BattleEvent::RoundStarted { round: self.round });
        self.record_encounters();

        // Forfeits settle before any move resolves.
        match (action_a, action_b) {
            (Action::Forfeit, Action::Forfeit) => {
                self.bus.push(BattleEvent::Forfeited { side: Side::A });
                self.bus.push(BattleEvent::Forfeited { side: Side::B });
                return Ok(self.finish(Winner::Draw));
            }
            (Action::Forfeit, _) => {
                self.bus.push(BattleEvent::Forfeited { side: Side::A });
                return Ok(self.finish(Winner::TeamB));
            }
            (_, Action::Forfeit) => {
                self.bus.push(BattleEvent::Forfeited { side: Side::B });
                return Ok(self.finish(Winner::TeamA));
            }
            _ => {}
        }

        let chosen = [
            self.resolve_choice(Side::A, action_a)?,
            self.resolve_choice(Side::B, action_b)?,
        ];
        let round_ctx = RoundContext {
            chart: self.ctx.chart,
            mode: self.mode,
            damage: self.damage,
        };
        let result = turn::resolve_round(&mut self.teams, chosen, &round_ctx, &mut self.bus)?;
        self.faints.extend(result.faints);

        if let Some(winner) = result.decided {
            return Ok(self.finish(winner));
        }

        for side in [Side::A, Side::B] {
            let team = &mut self.teams[side.index()];
            let before = team.order().to_vec();
            self.mode
                .on_turn_end(team, result.active_fainted[side.index()]);
            if team.order() != before.as_slice() {
                self.bus.push(BattleEvent::TeamReordered {
                    side,
                    order: team.order().to_vec(),
                });
            }
        }
        self.check_active_invariants()?;

        log::debug!(
            "round {} complete: {} vs {} live",
            self.round,
            self.teams[0].live_count(),
            self.teams[1].live_count()
        );

        self.round += 1;
        if self.round > self.config.round_limit {
            self.bus.push(BattleEvent::RoundLimitReached {
                limit: self.config.round_limit,
            });
            return Ok(self.finish(Winner::Draw));
        }
        self.state = GameState::WaitingForActions;
        Ok(self.state)
    }

    /// Consume the battle, returning teams and the full log to the caller.
    pub fn into_outcome(self) -> BattleOutcome {
        let winner = match self.state {
            GameState::Finished(winner) => Some(winner),
            _ => None,
        };
        BattleOutcome {
            winner,
            rounds: self.round.saturating_sub(1),
            events: self.bus.into_events(),
            faints: self.faints,
            encountered: self
                .encountered
                .map(|seen| seen.into_iter().collect::<Vec<_>>()),
            teams: self.teams,
        }
    }

    fn resolve_choice(&self, side: Side, action: Action) -> EngineResult<ChosenMove> {
        let Action::UseMove { move_index } = action else {
            unreachable!("forfeits are settled before choices are resolved");
        };
        let team = &self.teams[side.index()];
        let actor_slot = team.active_slot().ok_or_else(|| {
            EngineError::StateInvariant(StateInvariantError::NoActiveCombatant {
                team: team.trainer_name.clone(),
            })
        })?;
        let move_id = &team.members()[actor_slot].moves[move_index];
        let data = self.ctx.moves.get(move_id)?.clone();
        Ok(ChosenMove { actor_slot, data })
    }

    /// Each side sees the opposing active combatant.
    fn record_encounters(&mut self) {
        for side in [Side::A, Side::B] {
            if let Some(opposing) = self.teams[side.opponent().index()].active() {
                self.encountered[side.index()].insert(opposing.species.clone());
            }
        }
    }

    /// A fainted combatant must never be left as an active pointer in a
    /// battle that continues.
    fn check_active_invariants(&self) -> EngineResult<()> {
        for team in &self.teams {
            if let Some(active) = team.active() {
                if active.is_fainted() {
                    return Err(EngineError::StateInvariant(
                        StateInvariantError::ActivePointerOnFainted {
                            team: team.trainer_name.clone(),
                            slot: team.active_slot().unwrap_or_default(),
                        },
                    ));
                }
            } else if !team.is_defeated() {
                return Err(EngineError::StateInvariant(
                    StateInvariantError::NoActiveCombatant {
                        team: team.trainer_name.clone(),
                    },
                ));
            }
        }
        Ok(())
    }

    fn finish(&mut self, winner: Winner) -> GameState {
        self.bus.push(BattleEvent::BattleEnded { winner });
        self.state = GameState::Finished(winner);
        log::debug!("battle finished after {} rounds: {:?}", self.round, winner);
        self.state
    }
}

/// Drive a battle to completion with externally supplied selectors.
///
/// Invalid submissions are surfaced back to the same selector, which is
/// re-prompted without the turn state advancing; the engine never
/// substitutes an action of its own. The retry budget bounds how often a
/// misbehaving selector is asked again.
pub fn run_battle(
    ctx: EngineContext<'_>,
    team_a: Team,
    team_b: Team,
    mode: BattleMode,
    damage_a: DamageContext,
    damage_b: DamageContext,
    config: BattleConfig,
    selector_a: &mut dyn ActionSelector,
    selector_b: &mut dyn ActionSelector,
) -> EngineResult<BattleOutcome> {
    let mut battle = Battle::new(ctx, team_a, team_b, mode, damage_a, damage_b, config)?;
    while !battle.is_over() {
        let action_a = prompt(&battle, Side::A, selector_a)?;
        let action_b = prompt(&battle, Side::B, selector_b)?;
        battle.resolve_round(action_a, action_b)?;
    }
    Ok(battle.into_outcome())
}

fn prompt(
    battle: &Battle<'_>,
    side: Side,
    selector: &mut dyn ActionSelector,
) -> EngineResult<Action> {
    let legal = battle.legal_actions(side);
    let retries = battle.config.action_retries.max(1);
    let mut last_error = None;
    for attempt in 0..retries {
        let action = selector.choose(battle, side, &legal);
        match battle.validate(side, action) {
            Ok(()) => return Ok(action),
            Err(err @ EngineError::InvalidAction(_)) => {
                log::debug!(
                    "{} submitted an invalid action on attempt {}: {}",
                    side,
                    attempt + 1,
                    err
                );
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }
    Err(last_error.expect("retry loop runs at least once"))
}
