use crate::battle::engine::{Battle, BattleConfig, EngineContext};
use crate::battle::modes::BattleMode;
use crate::catalog::{demo_catalogs, MoveCatalog, SpeciesCatalog};
use crate::combatant::Combatant;
use crate::team::Team;
use crate::trainer::DamageContext;
use crate::type_chart::TypeChart;
use arena_schema::SpeciesId;

/// Owns the static data a battle borrows: the demo catalogs plus the
/// built-in chart. Tests build one fixture and borrow battles from it.
pub struct Fixture {
    pub species: SpeciesCatalog,
    pub moves: MoveCatalog,
    pub chart: TypeChart,
}

impl Fixture {
    pub fn new() -> Fixture {
        let (species, moves) = demo_catalogs();
        Fixture {
            species,
            moves,
            chart: TypeChart::kanto(),
        }
    }

    pub fn ctx(&self) -> EngineContext<'_> {
        EngineContext {
            chart: &self.chart,
            moves: &self.moves,
        }
    }

    /// A full-HP combatant of the given demo species and level.
    pub fn combatant(&self, id: &str, level: u8) -> Combatant {
        let data = self
            .species
            .get(&SpeciesId::new(id))
            .unwrap_or_else(|e| panic!("demo species {} should exist: {}", id, e));
        Combatant::from_species(data, level)
    }

    /// A team of demo species, all at one level.
    pub fn team(&self, trainer: &str, ids: &[&str], level: u8) -> Team {
        let members = ids.iter().map(|id| self.combatant(id, level)).collect();
        Team::new(trainer, members).expect("test teams are well-formed")
    }

    /// A neutral-multiplier battle over this fixture's data.
    pub fn battle(&self, team_a: Team, team_b: Team, mode: BattleMode) -> Battle<'_> {
        Battle::new(
            self.ctx(),
            team_a,
            team_b,
            mode,
            DamageContext::neutral(),
            DamageContext::neutral(),
            BattleConfig::default(),
        )
        .expect("test battles are well-formed")
    }
}

/// Index of a move in a demo combatant's move list, by catalog id.
pub fn move_index(combatant: &Combatant, id: &str) -> usize {
    combatant
        .moves
        .iter()
        .position(|m| m.as_str() == id)
        .unwrap_or_else(|| panic!("{} does not know {}", combatant.name, id))
}
