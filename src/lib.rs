//! Pokemon Arena Battle Engine
//!
//! A deterministic, turn-based battle engine for creature teams with
//! type-effectiveness rules, speed-ordered rounds, mode-driven team
//! manipulation, and a Battle Tower gauntlet layered on top. Action
//! selection is always supplied by the caller; given the same inputs a
//! battle resolves the same way.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod catalog;
pub mod combatant;
pub mod errors;
pub mod progression;
pub mod team;
pub mod tower;
pub mod trainer;
pub mod type_chart;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `arena-schema` crate ---
// Re-export the shared data definitions hosts use to build catalogs.
pub use arena_schema::{
    BaseStats,
    BattleModeKind,
    Criterion,
    EvolutionData,
    MoveCategory,
    MoveData,
    MoveId,
    PokemonType,
    SpecialEffect,
    SpeciesData,
    SpeciesId,
    Stats,
};

// --- From this crate's modules (`src/`) ---

// Core battle engine types and entry points.
pub use battle::engine::{run_battle, Action, Battle, BattleConfig, BattleOutcome, EngineContext};
pub use battle::modes::BattleMode;
pub use battle::selectors::{ActionSelector, GreedySelector, ScriptedSelector};
pub use battle::state::{BattleEvent, EventBus, GameState, Side, Winner};
pub use battle::turn::FaintRecord;

// Runtime model types.
pub use combatant::Combatant;
pub use team::Team;
pub use trainer::{DamageContext, PokedexScaling, Trainer};

// Static data access.
pub use catalog::{demo_catalogs, MoveCatalog, SpeciesCatalog};
pub use type_chart::{Effectiveness, TypeChart};

// Post-battle progression and the gauntlet.
pub use progression::{ExperienceConfig, ExperienceGranularity, ExperienceResolver};
pub use tower::{BattleTower, Opponent, TowerConfig, TowerOutcome, TowerRecord, TowerState};

// Crate-specific error and result types.
pub use errors::{
    ConfigResult, ConfigurationError, EngineError, EngineResult, InvalidActionError,
    StateInvariantError,
};
