use crate::errors::{ConfigResult, ConfigurationError};
use arena_schema::PokemonType;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Classification of a combined effectiveness multiplier, used for turn-log
/// messaging and for tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effectiveness {
    Immune,
    NotVeryEffective,
    Normal,
    SuperEffective,
}

impl Effectiveness {
    /// Classify a combined multiplier. Dual-type products land in
    /// {0, 0.25, 0.5, 1, 2, 4}; anything above 1 is super effective,
    /// anything in (0, 1) is not very effective.
    pub fn classify(multiplier: f64) -> Effectiveness {
        if multiplier == 0.0 {
            Effectiveness::Immune
        } else if multiplier < 1.0 {
            Effectiveness::NotVeryEffective
        } else if multiplier > 1.0 {
            Effectiveness::SuperEffective
        } else {
            Effectiveness::Normal
        }
    }
}

/// Immutable (attacking type, defending type) -> multiplier lookup.
///
/// Built once from already-parsed entries and validated eagerly: every
/// declared type must appear as both attacker and defender against every
/// other declared type, and every multiplier must be one of {0, 0.5, 1, 2}.
/// Missing entries are a load-time error, never a battle-time one.
#[derive(Debug, Clone)]
pub struct TypeChart {
    declared: HashSet<PokemonType>,
    table: HashMap<(PokemonType, PokemonType), f64>,
}

/// Single-type multipliers allowed by the data contract.
const LEGAL_MULTIPLIERS: [f64; 4] = [0.0, 0.5, 1.0, 2.0];

/// Matchups of the classic 15-type chart that deviate from 1.0.
/// Every pair not listed here is neutral.
const KANTO_EXCEPTIONS: &[(PokemonType, PokemonType, f64)] = &[
    (PokemonType::Normal, PokemonType::Rock, 0.5),
    (PokemonType::Normal, PokemonType::Ghost, 0.0),
    (PokemonType::Fire, PokemonType::Fire, 0.5),
    (PokemonType::Fire, PokemonType::Water, 0.5),
    (PokemonType::Fire, PokemonType::Rock, 0.5),
    (PokemonType::Fire, PokemonType::Dragon, 0.5),
    (PokemonType::Fire, PokemonType::Grass, 2.0),
    (PokemonType::Fire, PokemonType::Ice, 2.0),
    (PokemonType::Fire, PokemonType::Bug, 2.0),
    (PokemonType::Water, PokemonType::Water, 0.5),
    (PokemonType::Water, PokemonType::Grass, 0.5),
    (PokemonType::Water, PokemonType::Dragon, 0.5),
    (PokemonType::Water, PokemonType::Fire, 2.0),
    (PokemonType::Water, PokemonType::Ground, 2.0),
    (PokemonType::Water, PokemonType::Rock, 2.0),
    (PokemonType::Electric, PokemonType::Electric, 0.5),
    (PokemonType::Electric, PokemonType::Grass, 0.5),
    (PokemonType::Electric, PokemonType::Dragon, 0.5),
    (PokemonType::Electric, PokemonType::Ground, 0.0),
    (PokemonType::Electric, PokemonType::Water, 2.0),
    (PokemonType::Electric, PokemonType::Flying, 2.0),
    (PokemonType::Grass, PokemonType::Fire, 0.5),
    (PokemonType::Grass, PokemonType::Grass, 0.5),
    (PokemonType::Grass, PokemonType::Poison, 0.5),
    (PokemonType::Grass, PokemonType::Flying, 0.5),
    (PokemonType::Grass, PokemonType::Bug, 0.5),
    (PokemonType::Grass, PokemonType::Dragon, 0.5),
    (PokemonType::Grass, PokemonType::Water, 2.0),
    (PokemonType::Grass, PokemonType::Ground, 2.0),
    (PokemonType::Grass, PokemonType::Rock, 2.0),
    (PokemonType::Ice, PokemonType::Fire, 0.5),
    (PokemonType::Ice, PokemonType::Water, 0.5),
    (PokemonType::Ice, PokemonType::Ice, 0.5),
    (PokemonType::Ice, PokemonType::Grass, 2.0),
    (PokemonType::Ice, PokemonType::Ground, 2.0),
    (PokemonType::Ice, PokemonType::Flying, 2.0),
    (PokemonType::Ice, PokemonType::Dragon, 2.0),
    (PokemonType::Fighting, PokemonType::Poison, 0.5),
    (PokemonType::Fighting, PokemonType::Flying, 0.5),
    (PokemonType::Fighting, PokemonType::Psychic, 0.5),
    (PokemonType::Fighting, PokemonType::Bug, 0.5),
    (PokemonType::Fighting, PokemonType::Ghost, 0.0),
    (PokemonType::Fighting, PokemonType::Normal, 2.0),
    (PokemonType::Fighting, PokemonType::Ice, 2.0),
    (PokemonType::Fighting, PokemonType::Rock, 2.0),
    (PokemonType::Poison, PokemonType::Poison, 0.5),
    (PokemonType::Poison, PokemonType::Ground, 0.5),
    (PokemonType::Poison, PokemonType::Rock, 0.5),
    (PokemonType::Poison, PokemonType::Ghost, 0.5),
    (PokemonType::Poison, PokemonType::Grass, 2.0),
    (PokemonType::Ground, PokemonType::Grass, 0.5),
    (PokemonType::Ground, PokemonType::Bug, 0.5),
    (PokemonType::Ground, PokemonType::Flying, 0.0),
    (PokemonType::Ground, PokemonType::Fire, 2.0),
    (PokemonType::Ground, PokemonType::Electric, 2.0),
    (PokemonType::Ground, PokemonType::Poison, 2.0),
    (PokemonType::Ground, PokemonType::Rock, 2.0),
    (PokemonType::Flying, PokemonType::Electric, 0.5),
    (PokemonType::Flying, PokemonType::Rock, 0.5),
    (PokemonType::Flying, PokemonType::Grass, 2.0),
    (PokemonType::Flying, PokemonType::Fighting, 2.0),
    (PokemonType::Flying, PokemonType::Bug, 2.0),
    (PokemonType::Psychic, PokemonType::Psychic, 0.5),
    (PokemonType::Psychic, PokemonType::Fighting, 2.0),
    (PokemonType::Psychic, PokemonType::Poison, 2.0),
    (PokemonType::Bug, PokemonType::Fire, 0.5),
    (PokemonType::Bug, PokemonType::Fighting, 0.5),
    (PokemonType::Bug, PokemonType::Poison, 0.5),
    (PokemonType::Bug, PokemonType::Flying, 0.5),
    (PokemonType::Bug, PokemonType::Ghost, 0.5),
    (PokemonType::Bug, PokemonType::Grass, 2.0),
    (PokemonType::Bug, PokemonType::Psychic, 2.0),
    (PokemonType::Rock, PokemonType::Fighting, 0.5),
    (PokemonType::Rock, PokemonType::Ground, 0.5),
    (PokemonType::Rock, PokemonType::Fire, 2.0),
    (PokemonType::Rock, PokemonType::Ice, 2.0),
    (PokemonType::Rock, PokemonType::Flying, 2.0),
    (PokemonType::Rock, PokemonType::Bug, 2.0),
    (PokemonType::Ghost, PokemonType::Normal, 0.0),
    (PokemonType::Ghost, PokemonType::Psychic, 0.5),
    (PokemonType::Ghost, PokemonType::Ghost, 2.0),
    (PokemonType::Dragon, PokemonType::Dragon, 2.0),
];

impl TypeChart {
    /// Build a chart from parsed `(attacker, defender, multiplier)` entries.
    ///
    /// The declared type universe is the union of every type mentioned. The
    /// chart must be total over that universe and every multiplier must be
    /// one of {0, 0.5, 1, 2}.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (PokemonType, PokemonType, f64)>,
    ) -> ConfigResult<TypeChart> {
        let mut declared = HashSet::new();
        let mut table = HashMap::new();

        for (attacker, defender, multiplier) in entries {
            if !LEGAL_MULTIPLIERS.contains(&multiplier) {
                return Err(ConfigurationError::InvalidMultiplier {
                    attacker,
                    defender,
                    multiplier,
                });
            }
            declared.insert(attacker);
            declared.insert(defender);
            table.insert((attacker, defender), multiplier);
        }

        for &attacker in &declared {
            for &defender in &declared {
                if !table.contains_key(&(attacker, defender)) {
                    return Err(ConfigurationError::IncompleteTypeChart { attacker, defender });
                }
            }
        }

        Ok(TypeChart { declared, table })
    }

    /// The built-in classic chart covering the full 15-type universe.
    pub fn kanto() -> TypeChart {
        let mut entries = Vec::with_capacity(PokemonType::ALL.len() * PokemonType::ALL.len());
        for &attacker in PokemonType::all() {
            for &defender in PokemonType::all() {
                let multiplier = KANTO_EXCEPTIONS
                    .iter()
                    .find(|(a, d, _)| *a == attacker && *d == defender)
                    .map(|(_, _, m)| *m)
                    .unwrap_or(1.0);
                entries.push((attacker, defender, multiplier));
            }
        }
        TypeChart::from_entries(entries).expect("built-in chart is total over the type universe")
    }

    /// Single-type lookup. Querying a pair outside the declared universe is
    /// a data-integrity error, not a battle-logic one.
    pub fn effectiveness(
        &self,
        attacker: PokemonType,
        defender: PokemonType,
    ) -> ConfigResult<f64> {
        self.table
            .get(&(attacker, defender))
            .copied()
            .ok_or(ConfigurationError::UndeclaredTypePair { attacker, defender })
    }

    /// Combined multiplier against a full type combination: the product of
    /// the single-type lookups, with no re-normalization.
    pub fn effectiveness_against(
        &self,
        attacker: PokemonType,
        defenders: &[PokemonType],
    ) -> ConfigResult<f64> {
        let mut combined = 1.0;
        for &defender in defenders {
            combined *= self.effectiveness(attacker, defender)?;
        }
        Ok(combined)
    }

    pub fn declared_types(&self) -> impl Iterator<Item = &PokemonType> {
        self.declared.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PokemonType::Water, PokemonType::Fire, 2.0)]
    #[case(PokemonType::Fire, PokemonType::Water, 0.5)]
    #[case(PokemonType::Electric, PokemonType::Ground, 0.0)]
    #[case(PokemonType::Normal, PokemonType::Normal, 1.0)]
    #[case(PokemonType::Ghost, PokemonType::Normal, 0.0)]
    #[case(PokemonType::Dragon, PokemonType::Dragon, 2.0)]
    fn kanto_single_type_lookups(
        #[case] attacker: PokemonType,
        #[case] defender: PokemonType,
        #[case] expected: f64,
    ) {
        let chart = TypeChart::kanto();
        assert_eq!(chart.effectiveness(attacker, defender).unwrap(), expected);
    }

    #[test]
    fn dual_type_combines_by_product() {
        let chart = TypeChart::kanto();
        // Grass vs Water/Ground: 2.0 * 2.0 = 4.0
        let quad = chart
            .effectiveness_against(PokemonType::Grass, &[PokemonType::Water, PokemonType::Ground])
            .unwrap();
        assert_eq!(quad, 4.0);
        // Electric vs Water/Ground: immunity dominates via the product
        let immune = chart
            .effectiveness_against(
                PokemonType::Electric,
                &[PokemonType::Water, PokemonType::Ground],
            )
            .unwrap();
        assert_eq!(immune, 0.0);
        // Fire vs Grass/Water: 2.0 * 0.5 = 1.0
        let neutral = chart
            .effectiveness_against(PokemonType::Fire, &[PokemonType::Grass, PokemonType::Water])
            .unwrap();
        assert_eq!(neutral, 1.0);
    }

    #[test]
    fn classification_matches_multiplier() {
        assert_eq!(Effectiveness::classify(0.0), Effectiveness::Immune);
        assert_eq!(Effectiveness::classify(0.25), Effectiveness::NotVeryEffective);
        assert_eq!(Effectiveness::classify(0.5), Effectiveness::NotVeryEffective);
        assert_eq!(Effectiveness::classify(1.0), Effectiveness::Normal);
        assert_eq!(Effectiveness::classify(2.0), Effectiveness::SuperEffective);
        assert_eq!(Effectiveness::classify(4.0), Effectiveness::SuperEffective);
    }

    #[test]
    fn missing_entries_fail_at_load_time() {
        // Declares Fire and Water but only covers one direction.
        let result = TypeChart::from_entries(vec![
            (PokemonType::Fire, PokemonType::Water, 0.5),
            (PokemonType::Fire, PokemonType::Fire, 0.5),
            (PokemonType::Water, PokemonType::Water, 0.5),
        ]);
        assert!(matches!(
            result,
            Err(ConfigurationError::IncompleteTypeChart { .. })
        ));
    }

    #[test]
    fn out_of_domain_multiplier_rejected() {
        let result = TypeChart::from_entries(vec![(
            PokemonType::Fire,
            PokemonType::Fire,
            1.5,
        )]);
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidMultiplier { .. })
        ));
    }

    #[test]
    fn undeclared_pair_query_is_configuration_error() {
        let chart = TypeChart::from_entries(vec![
            (PokemonType::Fire, PokemonType::Fire, 0.5),
        ])
        .unwrap();
        let result = chart.effectiveness(PokemonType::Fire, PokemonType::Water);
        assert!(matches!(
            result,
            Err(ConfigurationError::UndeclaredTypePair { .. })
        ));
    }
}
