use serde::{Deserialize, Serialize};
use std::fmt;

/// Mode tag used for move legality checks and configuration. Carries no
/// mode state of its own; the engine's `BattleMode` is the behavioral
/// counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleModeKind {
    Set,
    Rotating,
    Optimised,
}

impl fmt::Display for BattleModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BattleModeKind::Set => "Set",
            BattleModeKind::Rotating => "Rotating",
            BattleModeKind::Optimised => "Optimised",
        };
        write!(f, "{}", name)
    }
}

/// Ordering criterion for Optimised mode, chosen once at battle start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criterion {
    Hp,
    Attack,
    Defense,
    Speed,
    Level,
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Criterion::Hp => "HP",
            Criterion::Attack => "Attack",
            Criterion::Defense => "Defense",
            Criterion::Speed => "Speed",
            Criterion::Level => "Level",
        };
        write!(f, "{}", name)
    }
}

/// Computed stats for a combatant at its current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub max_hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub speed: u16,
}
