use crate::{BattleModeKind, PokemonType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Catalog key for a species. Stored lowercase (e.g. "charmander").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub String);

impl SpeciesId {
    pub fn new(id: impl Into<String>) -> Self {
        SpeciesId(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Catalog key for a move. Stored lowercase (e.g. "ember").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub String);

impl MoveId {
    pub fn new(id: impl Into<String>) -> Self {
        MoveId(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: u8,
    pub attack: u8,
    pub defense: u8,
    pub speed: u8,
}

impl BaseStats {
    pub fn total(&self) -> u16 {
        self.hp as u16 + self.attack as u16 + self.defense as u16 + self.speed as u16
    }
}

/// Level-triggered evolution target. Evolution is one-way; a species either
/// names its next form or is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionData {
    pub evolves_into: SpeciesId,
    pub at_level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeciesData {
    pub id: SpeciesId,
    pub name: String,
    /// Primary type, plus an optional secondary type.
    pub types: Vec<PokemonType>,
    pub base_stats: BaseStats,
    /// Experience yield granted to whoever defeats this species, before
    /// level scaling.
    pub base_exp: u16,
    pub moves: Vec<MoveId>,
    pub evolution: Option<EvolutionData>,
}

impl SpeciesData {
    pub fn primary_type(&self) -> PokemonType {
        self.types[0]
    }

    pub fn secondary_type(&self) -> Option<PokemonType> {
        self.types.get(1).copied()
    }
}

/// What a move does when it connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCategory {
    /// Deals damage through the damage calculator.
    Damage,
    /// Manipulates team ordering instead of dealing damage. Only legal in
    /// the battle mode named by `MoveData::mode_constraint`.
    Special(SpecialEffect),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecialEffect {
    /// Flip the Optimised sort direction for the rest of the battle and
    /// re-sort immediately.
    InvertOrder,
    /// Reverse the waiting (non-active) portion of a Rotating team's order.
    ReverseBench,
}

impl fmt::Display for SpecialEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SpecialEffect::InvertOrder => "order inversion",
            SpecialEffect::ReverseBench => "bench reversal",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveData {
    pub id: MoveId,
    pub name: String,
    pub move_type: PokemonType,
    /// Base power; zero for special moves.
    pub power: u16,
    pub category: MoveCategory,
    /// For special moves, the single battle mode they are legal in.
    /// Damage moves leave this unset and are legal everywhere.
    pub mode_constraint: Option<BattleModeKind>,
}

impl MoveData {
    pub fn is_special(&self) -> bool {
        matches!(self.category, MoveCategory::Special(_))
    }
}
