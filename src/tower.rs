use crate::battle::engine::{run_battle, BattleConfig, EngineContext};
use crate::battle::modes::BattleMode;
use crate::battle::selectors::ActionSelector;
use crate::battle::state::{Side, Winner};
use crate::catalog::SpeciesCatalog;
use crate::errors::{ConfigurationError, EngineResult, InvalidActionError};
use crate::progression::{ExperienceConfig, ExperienceResolver, LevelChangeEvent};
use crate::team::Team;
use crate::trainer::{DamageContext, PokedexScaling, Trainer};
use arena_schema::Criterion;
use serde::{Deserialize, Serialize};

/// Gauntlet configuration, supplied once at run start. Loadable from RON
/// for file-driven hosts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerConfig {
    /// Challenger's lives budget; each loss (or draw) costs one.
    pub lives: u32,
    /// Keep battle damage on the challenger team when retrying an opponent.
    pub restore_between_attempts: bool,
    /// Heal the challenger team after defeating an opponent.
    pub restore_on_advance: bool,
    pub mode: BattleMode,
    pub battle: BattleConfig,
    pub scaling: PokedexScaling,
    pub experience: ExperienceConfig,
}

impl Default for TowerConfig {
    fn default() -> Self {
        TowerConfig {
            lives: 3,
            restore_between_attempts: false,
            restore_on_advance: true,
            mode: BattleMode::Rotating,
            battle: BattleConfig::default(),
            scaling: PokedexScaling::default(),
            experience: ExperienceConfig::default(),
        }
    }
}

impl TowerConfig {
    /// Parse a RON document holding a tower configuration.
    pub fn from_ron(source: &str) -> Result<TowerConfig, ConfigurationError> {
        ron::from_str(source)
            .map_err(|e| ConfigurationError::MalformedData(format!("tower config: {}", e)))
    }

    pub fn optimised(criterion: Criterion) -> TowerConfig {
        TowerConfig {
            mode: BattleMode::Optimised { criterion },
            ..TowerConfig::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerOutcome {
    /// Every opponent defeated with lives to spare.
    Cleared,
    /// Lives exhausted; no further opponents are attempted.
    Eliminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TowerState {
    NotStarted,
    InProgress { opponent_index: usize, lives: u32 },
    Completed(TowerOutcome),
}

/// One opponent station in the gauntlet: a trainer and the team template
/// it fields. The template is cloned (at full HP) for every attempt.
#[derive(Debug, Clone)]
pub struct Opponent {
    pub trainer: Trainer,
    pub team: Team,
}

/// Result of one gauntlet battle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerRecord {
    pub opponent_index: usize,
    pub opponent_name: String,
    pub winner: Option<Winner>,
    pub rounds: u32,
    pub lives_remaining: u32,
    pub level_changes: Vec<LevelChangeEvent>,
}

/// Sequential multi-battle controller over the battle engine.
///
/// Runs one battle at a time against `opponents[opponent_index]`: a win
/// awards experience, registers encountered species, and advances; a loss
/// or draw costs a life and retries the same opponent, with challenger HP
/// persisting across attempts unless configured otherwise.
pub struct BattleTower<'a> {
    ctx: EngineContext<'a>,
    species: &'a SpeciesCatalog,
    config: TowerConfig,
    challenger: Trainer,
    team: Option<Team>,
    opponents: Vec<Opponent>,
    state: TowerState,
    records: Vec<TowerRecord>,
}

impl<'a> BattleTower<'a> {
    pub fn new(
        ctx: EngineContext<'a>,
        species: &'a SpeciesCatalog,
        challenger: Trainer,
        team: Team,
        opponents: Vec<Opponent>,
        config: TowerConfig,
    ) -> Result<BattleTower<'a>, ConfigurationError> {
        if opponents.is_empty() {
            return Err(ConfigurationError::MalformedData(
                "a tower run needs at least one opponent".to_string(),
            ));
        }
        if config.lives == 0 {
            return Err(ConfigurationError::MalformedData(
                "a tower run needs at least one life".to_string(),
            ));
        }
        Ok(BattleTower {
            ctx,
            species,
            config,
            challenger,
            team: Some(team),
            opponents,
            state: TowerState::NotStarted,
            records: Vec::new(),
        })
    }

    pub fn state(&self) -> TowerState {
        self.state
    }

    pub fn records(&self) -> &[TowerRecord] {
        &self.records
    }

    pub fn challenger(&self) -> &Trainer {
        &self.challenger
    }

    pub fn challenger_team(&self) -> &Team {
        self.team.as_ref().expect("team is parked between battles")
    }

    pub fn opponents_defeated(&self) -> usize {
        match self.state {
            TowerState::NotStarted => 0,
            TowerState::InProgress { opponent_index, .. } => opponent_index,
            TowerState::Completed(TowerOutcome::Cleared) => self.opponents.len(),
            TowerState::Completed(TowerOutcome::Eliminated) => self
                .records
                .iter()
                .filter(|r| r.winner == Some(Winner::TeamA))
                .count(),
        }
    }

    pub fn battles_remaining(&self) -> bool {
        matches!(
            self.state,
            TowerState::NotStarted | TowerState::InProgress { .. }
        )
    }

    /// Run the next battle of the gauntlet.
    pub fn play_next(
        &mut self,
        challenger_selector: &mut dyn ActionSelector,
        opponent_selector: &mut dyn ActionSelector,
    ) -> EngineResult<&TowerRecord> {
        let (opponent_index, lives) = match self.state {
            TowerState::NotStarted => (0, self.config.lives),
            TowerState::InProgress {
                opponent_index,
                lives,
            } => (opponent_index, lives),
            TowerState::Completed(_) => {
                return Err(InvalidActionError::BattleFinished.into());
            }
        };

        let challenger_team = self.team.take().expect("team is parked between battles");

        // A team with no conscious combatants cannot be fielded; with HP
        // persistence on, the attempt is an automatic loss.
        if challenger_team.is_defeated() {
            let lives = lives - 1;
            self.state = if lives == 0 {
                TowerState::Completed(TowerOutcome::Eliminated)
            } else {
                TowerState::InProgress {
                    opponent_index,
                    lives,
                }
            };
            self.team = Some(challenger_team);
            self.records.push(TowerRecord {
                opponent_index,
                opponent_name: self.opponents[opponent_index].trainer.name.clone(),
                winner: Some(Winner::TeamB),
                rounds: 0,
                lives_remaining: lives,
                level_changes: Vec::new(),
            });
            return Ok(self.records.last().expect("record was just pushed"));
        }

        let opponent = self.opponents[opponent_index].clone();
        let mut opponent_team = opponent.team;
        opponent_team.restore_all();

        let catalog_size = self.species.len();
        let damage_a =
            DamageContext::for_trainer(&self.challenger, catalog_size, self.config.scaling);
        let damage_b =
            DamageContext::for_trainer(&opponent.trainer, catalog_size, self.config.scaling);

        log::debug!(
            "tower battle: {} vs {} (opponent {} of {}, {} lives)",
            self.challenger.name,
            opponent.trainer.name,
            opponent_index + 1,
            self.opponents.len(),
            lives
        );

        let outcome = run_battle(
            self.ctx,
            challenger_team,
            opponent_team,
            self.config.mode,
            damage_a,
            damage_b,
            self.config.battle,
            challenger_selector,
            opponent_selector,
        )?;

        let [mut challenger_team, _] = outcome.teams;
        for species in &outcome.encountered[Side::A.index()] {
            self.challenger.register_species(species.clone());
        }
        for species in &outcome.encountered[Side::B.index()] {
            self.opponents[opponent_index]
                .trainer
                .register_species(species.clone());
        }

        let mut level_changes = Vec::new();
        let (next_state, lives_remaining) = match outcome.winner {
            Some(Winner::TeamA) => {
                let resolver = ExperienceResolver::new(self.species, self.config.experience);
                level_changes =
                    resolver.award(&mut challenger_team, Side::A, &outcome.faints)?;
                if self.config.restore_on_advance {
                    challenger_team.restore_all();
                }
                let next_index = opponent_index + 1;
                if next_index == self.opponents.len() {
                    (TowerState::Completed(TowerOutcome::Cleared), lives)
                } else {
                    (
                        TowerState::InProgress {
                            opponent_index: next_index,
                            lives,
                        },
                        lives,
                    )
                }
            }
            _ => {
                // Losses and draws both cost a life; the opponent stays.
                let lives = lives - 1;
                if lives == 0 {
                    (TowerState::Completed(TowerOutcome::Eliminated), 0)
                } else {
                    if self.config.restore_between_attempts {
                        challenger_team.restore_all();
                    }
                    (
                        TowerState::InProgress {
                            opponent_index,
                            lives,
                        },
                        lives,
                    )
                }
            }
        };

        self.team = Some(challenger_team);
        self.state = next_state;
        self.records.push(TowerRecord {
            opponent_index,
            opponent_name: self.opponents[opponent_index].trainer.name.clone(),
            winner: outcome.winner,
            rounds: outcome.rounds,
            lives_remaining,
            level_changes,
        });
        Ok(self.records.last().expect("record was just pushed"))
    }

    /// Drive the gauntlet to completion.
    pub fn run(
        &mut self,
        challenger_selector: &mut dyn ActionSelector,
        opponent_selector: &mut dyn ActionSelector,
    ) -> EngineResult<TowerOutcome> {
        while self.battles_remaining() {
            self.play_next(challenger_selector, opponent_selector)?;
        }
        match self.state {
            TowerState::Completed(outcome) => Ok(outcome),
            _ => unreachable!("run loop exits only on completion"),
        }
    }
}
