use crate::errors::{ConfigResult, ConfigurationError};
use arena_schema::{
    BaseStats, BattleModeKind, EvolutionData, MoveCategory, MoveData, MoveId, PokemonType,
    SpecialEffect, SpeciesData, SpeciesId,
};
use std::collections::HashMap;

/// Read-only move lookup by identifier.
///
/// Validated once at construction: special moves must declare the battle
/// mode they are legal in, and damage moves must carry a non-zero power.
#[derive(Debug, Clone)]
pub struct MoveCatalog {
    moves: HashMap<MoveId, MoveData>,
}

impl MoveCatalog {
    pub fn from_records(records: Vec<MoveData>) -> ConfigResult<MoveCatalog> {
        let mut moves = HashMap::with_capacity(records.len());
        for record in records {
            match record.category {
                MoveCategory::Special(_) if record.mode_constraint.is_none() => {
                    return Err(ConfigurationError::UnconstrainedSpecialMove(record.id));
                }
                MoveCategory::Damage if record.power == 0 => {
                    return Err(ConfigurationError::MalformedData(format!(
                        "damage move {} has zero power",
                        record.id
                    )));
                }
                _ => {}
            }
            moves.insert(record.id.clone(), record);
        }
        Ok(MoveCatalog { moves })
    }

    /// Parse a RON document holding a list of move records.
    pub fn from_ron(source: &str) -> ConfigResult<MoveCatalog> {
        let records: Vec<MoveData> = ron::from_str(source)
            .map_err(|e| ConfigurationError::MalformedData(format!("move catalog: {}", e)))?;
        MoveCatalog::from_records(records)
    }

    pub fn get(&self, id: &MoveId) -> ConfigResult<&MoveData> {
        self.moves
            .get(id)
            .ok_or_else(|| ConfigurationError::MoveNotFound(id.clone()))
    }

    pub fn contains(&self, id: &MoveId) -> bool {
        self.moves.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Read-only species lookup by identifier.
#[derive(Debug, Clone)]
pub struct SpeciesCatalog {
    species: HashMap<SpeciesId, SpeciesData>,
}

impl SpeciesCatalog {
    /// Build from parsed records, cross-checking against the move catalog:
    /// every species needs one or two types and a non-empty moveset of known
    /// moves, and evolution targets must resolve within the same catalog.
    pub fn from_records(
        records: Vec<SpeciesData>,
        moves: &MoveCatalog,
    ) -> ConfigResult<SpeciesCatalog> {
        let mut species = HashMap::with_capacity(records.len());
        for record in &records {
            if record.types.is_empty() || record.types.len() > 2 {
                return Err(ConfigurationError::MalformedData(format!(
                    "species {} must have one or two types",
                    record.id
                )));
            }
            if record.moves.is_empty() {
                return Err(ConfigurationError::MalformedData(format!(
                    "species {} has an empty moveset",
                    record.id
                )));
            }
            for move_id in &record.moves {
                if !moves.contains(move_id) {
                    return Err(ConfigurationError::MoveNotFound(move_id.clone()));
                }
            }
            species.insert(record.id.clone(), record.clone());
        }

        for record in species.values() {
            if let Some(evolution) = &record.evolution {
                if !species.contains_key(&evolution.evolves_into) {
                    return Err(ConfigurationError::SpeciesNotFound(
                        evolution.evolves_into.clone(),
                    ));
                }
            }
        }

        Ok(SpeciesCatalog { species })
    }

    /// Parse a RON document holding a list of species records.
    pub fn from_ron(source: &str, moves: &MoveCatalog) -> ConfigResult<SpeciesCatalog> {
        let records: Vec<SpeciesData> = ron::from_str(source)
            .map_err(|e| ConfigurationError::MalformedData(format!("species catalog: {}", e)))?;
        SpeciesCatalog::from_records(records, moves)
    }

    pub fn get(&self, id: &SpeciesId) -> ConfigResult<&SpeciesData> {
        self.species
            .get(id)
            .ok_or_else(|| ConfigurationError::SpeciesNotFound(id.clone()))
    }

    /// All species ids in stable (sorted) order, so that randomized team
    /// generation is reproducible for a given RNG seed.
    pub fn ids(&self) -> Vec<SpeciesId> {
        let mut ids: Vec<SpeciesId> = self.species.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}

fn damage_move(id: &str, name: &str, move_type: PokemonType, power: u16) -> MoveData {
    MoveData {
        id: MoveId::new(id),
        name: name.to_string(),
        move_type,
        power,
        category: MoveCategory::Damage,
        mode_constraint: None,
    }
}

fn special_move(
    id: &str,
    name: &str,
    move_type: PokemonType,
    effect: SpecialEffect,
    mode: BattleModeKind,
) -> MoveData {
    MoveData {
        id: MoveId::new(id),
        name: name.to_string(),
        move_type,
        power: 0,
        category: MoveCategory::Special(effect),
        mode_constraint: Some(mode),
    }
}

fn species(
    id: &str,
    name: &str,
    types: &[PokemonType],
    stats: [u8; 4],
    base_exp: u16,
    moves: &[&str],
    evolution: Option<(&str, u8)>,
) -> SpeciesData {
    SpeciesData {
        id: SpeciesId::new(id),
        name: name.to_string(),
        types: types.to_vec(),
        base_stats: BaseStats {
            hp: stats[0],
            attack: stats[1],
            defense: stats[2],
            speed: stats[3],
        },
        base_exp,
        moves: moves.iter().map(|m| MoveId::new(*m)).collect(),
        evolution: evolution.map(|(into, at_level)| EvolutionData {
            evolves_into: SpeciesId::new(into),
            at_level,
        }),
    }
}

/// Built-in demo move set used by the tests and the demo runner.
pub fn demo_moves() -> MoveCatalog {
    use PokemonType::*;
    let records = vec![
        damage_move("tackle", "Tackle", Normal, 40),
        damage_move("scratch", "Scratch", Normal, 40),
        damage_move("quick-attack", "Quick Attack", Normal, 40),
        damage_move("slam", "Slam", Normal, 80),
        damage_move("wing-attack", "Wing Attack", Flying, 60),
        damage_move("ember", "Ember", Fire, 40),
        damage_move("flamethrower", "Flamethrower", Fire, 90),
        damage_move("water-gun", "Water Gun", Water, 40),
        damage_move("bubble-beam", "Bubble Beam", Water, 65),
        damage_move("vine-whip", "Vine Whip", Grass, 45),
        damage_move("razor-leaf", "Razor Leaf", Grass, 55),
        damage_move("thunder-shock", "Thunder Shock", Electric, 40),
        damage_move("thunderbolt", "Thunderbolt", Electric, 90),
        damage_move("rock-throw", "Rock Throw", Rock, 50),
        damage_move("lick", "Lick", Ghost, 30),
        damage_move("confusion", "Confusion", Psychic, 50),
        special_move(
            "upheaval",
            "Upheaval",
            Psychic,
            SpecialEffect::InvertOrder,
            BattleModeKind::Optimised,
        ),
        special_move(
            "about-face",
            "About-Face",
            Normal,
            SpecialEffect::ReverseBench,
            BattleModeKind::Rotating,
        ),
    ];
    MoveCatalog::from_records(records).expect("demo move records are well-formed")
}

/// Built-in demo species roster: the three classic starter lines plus a few
/// type-diverse extras, with level-triggered evolutions.
pub fn demo_species(moves: &MoveCatalog) -> SpeciesCatalog {
    use PokemonType::*;
    let records = vec![
        species(
            "charmander",
            "Charmander",
            &[Fire],
            [39, 52, 43, 65],
            62,
            &["scratch", "ember"],
            Some(("charmeleon", 16)),
        ),
        species(
            "charmeleon",
            "Charmeleon",
            &[Fire],
            [58, 64, 58, 80],
            142,
            &["scratch", "ember", "flamethrower"],
            Some(("charizard", 36)),
        ),
        species(
            "charizard",
            "Charizard",
            &[Fire, Flying],
            [78, 84, 78, 100],
            240,
            &["flamethrower", "wing-attack", "slam"],
            None,
        ),
        species(
            "squirtle",
            "Squirtle",
            &[Water],
            [44, 48, 65, 43],
            63,
            &["tackle", "water-gun"],
            Some(("wartortle", 16)),
        ),
        species(
            "wartortle",
            "Wartortle",
            &[Water],
            [59, 63, 80, 58],
            142,
            &["tackle", "water-gun", "bubble-beam"],
            Some(("blastoise", 36)),
        ),
        species(
            "blastoise",
            "Blastoise",
            &[Water],
            [79, 83, 100, 78],
            239,
            &["water-gun", "bubble-beam", "slam", "about-face"],
            None,
        ),
        species(
            "bulbasaur",
            "Bulbasaur",
            &[Grass, Poison],
            [45, 49, 49, 45],
            64,
            &["tackle", "vine-whip"],
            Some(("ivysaur", 16)),
        ),
        species(
            "ivysaur",
            "Ivysaur",
            &[Grass, Poison],
            [60, 62, 63, 60],
            142,
            &["vine-whip", "razor-leaf"],
            Some(("venusaur", 32)),
        ),
        species(
            "venusaur",
            "Venusaur",
            &[Grass, Poison],
            [80, 82, 83, 80],
            236,
            &["razor-leaf", "vine-whip", "slam", "upheaval"],
            None,
        ),
        species(
            "pikachu",
            "Pikachu",
            &[Electric],
            [35, 55, 40, 90],
            112,
            &["quick-attack", "thunder-shock", "about-face"],
            Some(("raichu", 30)),
        ),
        species(
            "raichu",
            "Raichu",
            &[Electric],
            [60, 90, 55, 110],
            218,
            &["quick-attack", "thunderbolt", "about-face"],
            None,
        ),
        species(
            "gastly",
            "Gastly",
            &[Ghost, Poison],
            [30, 35, 30, 80],
            62,
            &["lick", "confusion"],
            Some(("haunter", 25)),
        ),
        species(
            "haunter",
            "Haunter",
            &[Ghost, Poison],
            [45, 50, 45, 95],
            142,
            &["lick", "confusion", "upheaval"],
            None,
        ),
        species(
            "onix",
            "Onix",
            &[Rock, Ground],
            [35, 45, 160, 70],
            77,
            &["tackle", "rock-throw", "slam"],
            None,
        ),
    ];
    SpeciesCatalog::from_records(records, moves).expect("demo species records are well-formed")
}

/// Both demo catalogs together, in dependency order.
pub fn demo_catalogs() -> (SpeciesCatalog, MoveCatalog) {
    let moves = demo_moves();
    let species = demo_species(&moves);
    (species, moves)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_catalogs_are_consistent() {
        let (species, moves) = demo_catalogs();
        assert!(!species.is_empty());
        assert!(!moves.is_empty());
        // Every evolution chain terminates inside the catalog.
        for id in species.ids() {
            let mut current = species.get(&id).unwrap();
            let mut hops = 0;
            while let Some(evolution) = &current.evolution {
                current = species.get(&evolution.evolves_into).unwrap();
                hops += 1;
                assert!(hops <= 3, "evolution chain for {} does not terminate", id);
            }
        }
    }

    #[test]
    fn unknown_move_reference_is_rejected() {
        let moves = demo_moves();
        let bad = vec![species(
            "glitchmon",
            "Glitchmon",
            &[PokemonType::Normal],
            [10, 10, 10, 10],
            10,
            &["missingno-beam"],
            None,
        )];
        let result = SpeciesCatalog::from_records(bad, &moves);
        assert!(matches!(result, Err(ConfigurationError::MoveNotFound(_))));
    }

    #[test]
    fn dangling_evolution_target_is_rejected() {
        let moves = demo_moves();
        let bad = vec![species(
            "lonely",
            "Lonely",
            &[PokemonType::Normal],
            [10, 10, 10, 10],
            10,
            &["tackle"],
            Some(("nobody", 20)),
        )];
        let result = SpeciesCatalog::from_records(bad, &moves);
        assert!(matches!(result, Err(ConfigurationError::SpeciesNotFound(_))));
    }

    #[test]
    fn special_move_without_constraint_is_rejected() {
        let mut record = special_move(
            "wildcard",
            "Wildcard",
            PokemonType::Normal,
            SpecialEffect::InvertOrder,
            BattleModeKind::Optimised,
        );
        record.mode_constraint = None;
        let result = MoveCatalog::from_records(vec![record]);
        assert!(matches!(
            result,
            Err(ConfigurationError::UnconstrainedSpecialMove(_))
        ));
    }

    #[test]
    fn move_catalog_parses_from_ron() {
        let source = r#"[
            (
                id: "gust",
                name: "Gust",
                move_type: Flying,
                power: 40,
                category: Damage,
                mode_constraint: None,
            ),
        ]"#;
        let catalog = MoveCatalog::from_ron(source).unwrap();
        assert!(catalog.contains(&MoveId::new("gust")));
    }
}
