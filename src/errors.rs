use arena_schema::{BattleModeKind, MoveId, PokemonType, SpeciesId};
use std::fmt;

/// Main error type for the pokemon-arena battle engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed or incomplete static data; fatal at setup time
    Configuration(ConfigurationError),
    /// Caller supplied an illegal action; recoverable by re-prompting
    InvalidAction(InvalidActionError),
    /// Internal invariant violated; indicates an engine bug
    StateInvariant(StateInvariantError),
}

/// Errors raised while loading or querying static battle data
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The effectiveness table does not cover every declared type pair
    IncompleteTypeChart {
        attacker: PokemonType,
        defender: PokemonType,
    },
    /// An effectiveness entry carries a multiplier outside {0, 0.5, 1, 2}
    InvalidMultiplier {
        attacker: PokemonType,
        defender: PokemonType,
        multiplier: f64,
    },
    /// A type pair was queried that the chart never declared
    UndeclaredTypePair {
        attacker: PokemonType,
        defender: PokemonType,
    },
    /// The specified species was not found in the catalog
    SpeciesNotFound(SpeciesId),
    /// The specified move was not found in the catalog
    MoveNotFound(MoveId),
    /// A special move was declared without a mode constraint
    UnconstrainedSpecialMove(MoveId),
    /// A team was built empty or otherwise unusable
    InvalidTeam(String),
    /// Static data is malformed or incomplete
    MalformedData(String),
}

/// Errors raised when a caller submits an illegal action
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidActionError {
    /// The acting combatant has fainted and cannot act
    FaintedActor { combatant: String },
    /// Move index is outside the active combatant's move list
    MoveIndexOutOfRange { index: usize, moves: usize },
    /// The active combatant does not own the referenced move
    MoveNotOwned { move_id: MoveId },
    /// A special move was used in a mode it is not legal in
    SpecialMoveIllegal {
        move_id: MoveId,
        mode: BattleModeKind,
    },
    /// An action was submitted after the battle already ended
    BattleFinished,
}

/// Errors raised when the engine observes a broken internal invariant
#[derive(Debug, Clone, PartialEq)]
pub enum StateInvariantError {
    /// The active pointer names a fainted combatant
    ActivePointerOnFainted { team: String, slot: usize },
    /// A team's ordering references a slot outside its roster
    OrderingOutOfBounds { team: String, slot: usize },
    /// A team that should have a live active combatant has none
    NoActiveCombatant { team: String },
    /// Round resolution was attempted in a terminal state
    RoundAfterCompletion { turn: u32 },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Configuration(err) => write!(f, "configuration error: {}", err),
            EngineError::InvalidAction(err) => write!(f, "invalid action: {}", err),
            EngineError::StateInvariant(err) => write!(f, "state invariant violated: {}", err),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::IncompleteTypeChart { attacker, defender } => {
                write!(f, "type chart has no entry for {} -> {}", attacker, defender)
            }
            ConfigurationError::InvalidMultiplier {
                attacker,
                defender,
                multiplier,
            } => write!(
                f,
                "multiplier {} for {} -> {} is outside {{0, 0.5, 1, 2}}",
                multiplier, attacker, defender
            ),
            ConfigurationError::UndeclaredTypePair { attacker, defender } => {
                write!(f, "type pair {} -> {} was never declared", attacker, defender)
            }
            ConfigurationError::SpeciesNotFound(id) => write!(f, "species not found: {}", id),
            ConfigurationError::MoveNotFound(id) => write!(f, "move not found: {}", id),
            ConfigurationError::UnconstrainedSpecialMove(id) => {
                write!(f, "special move {} declares no mode constraint", id)
            }
            ConfigurationError::InvalidTeam(details) => write!(f, "invalid team: {}", details),
            ConfigurationError::MalformedData(details) => write!(f, "malformed data: {}", details),
        }
    }
}

impl fmt::Display for InvalidActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidActionError::FaintedActor { combatant } => {
                write!(f, "{} has fainted and cannot act", combatant)
            }
            InvalidActionError::MoveIndexOutOfRange { index, moves } => {
                write!(f, "move index {} out of range (knows {} moves)", index, moves)
            }
            InvalidActionError::MoveNotOwned { move_id } => {
                write!(f, "active combatant does not know {}", move_id)
            }
            InvalidActionError::SpecialMoveIllegal { move_id, mode } => {
                write!(f, "special move {} is not legal in {} mode", move_id, mode)
            }
            InvalidActionError::BattleFinished => write!(f, "the battle has already ended"),
        }
    }
}

impl fmt::Display for StateInvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateInvariantError::ActivePointerOnFainted { team, slot } => {
                write!(f, "team {} has its active pointer on fainted slot {}", team, slot)
            }
            StateInvariantError::OrderingOutOfBounds { team, slot } => {
                write!(f, "team {} ordering references slot {} outside roster", team, slot)
            }
            StateInvariantError::NoActiveCombatant { team } => {
                write!(f, "team {} has no active combatant", team)
            }
            StateInvariantError::RoundAfterCompletion { turn } => {
                write!(f, "round resolution attempted after completion (turn {})", turn)
            }
        }
    }
}

impl std::error::Error for EngineError {}
impl std::error::Error for ConfigurationError {}
impl std::error::Error for InvalidActionError {}
impl std::error::Error for StateInvariantError {}

impl From<ConfigurationError> for EngineError {
    fn from(err: ConfigurationError) -> Self {
        EngineError::Configuration(err)
    }
}

impl From<InvalidActionError> for EngineError {
    fn from(err: InvalidActionError) -> Self {
        EngineError::InvalidAction(err)
    }
}

impl From<StateInvariantError> for EngineError {
    fn from(err: StateInvariantError) -> Self {
        EngineError::StateInvariant(err)
    }
}

/// Type alias for Results using EngineError
pub type EngineResult<T> = Result<T, EngineError>;

/// Type alias for Results using ConfigurationError
pub type ConfigResult<T> = Result<T, ConfigurationError>;
