use crate::battle::state::Side;
use crate::battle::turn::FaintRecord;
use crate::catalog::SpeciesCatalog;
use crate::combatant::MAX_LEVEL;
use crate::errors::EngineResult;
use crate::team::Team;
use arena_schema::SpeciesId;
use serde::{Deserialize, Serialize};

/// Experience divisor applied to a defeated combatant's yield.
const EXP_DIVISOR: u32 = 7;

/// Total experience required to sit at a level: the medium-fast cubic
/// curve. Monotonic, with `exp_for_level(1) == 1`.
pub fn exp_for_level(level: u8) -> u32 {
    (level as u32).pow(3)
}

/// Experience earned for defeating one combatant: its species yield scaled
/// by its level. Always at least 1.
pub fn exp_gain(base_exp: u16, level: u8) -> u32 {
    (base_exp as u32 * level as u32 / EXP_DIVISOR).max(1)
}

/// How defeat experience is attributed across the winning team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExperienceGranularity {
    /// Each knockout's experience goes to the combatant that landed it
    /// (falling back to an even split if that combatant has since fainted).
    PerKnockout,
    /// All experience pools and splits evenly across survivors, remainder
    /// to the earliest roster slots.
    PostBattle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ExperienceConfig {
    pub granularity: ExperienceGranularity,
}

impl Default for ExperienceConfig {
    fn default() -> Self {
        ExperienceConfig {
            granularity: ExperienceGranularity::PerKnockout,
        }
    }
}

/// A combatant's level or species changing as a result of awarded
/// experience.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelChangeEvent {
    pub slot: usize,
    pub name: String,
    pub old_level: u8,
    pub new_level: u8,
    pub evolved_into: Option<SpeciesId>,
}

/// Applies post-battle experience to a winning team: level-ups recompute
/// stats, and crossing a species' evolution trigger level swaps the species
/// in place (HP kept as a proportion of max, experience overflow retained,
/// chains resolved, never reversed).
pub struct ExperienceResolver<'a> {
    catalog: &'a SpeciesCatalog,
    config: ExperienceConfig,
}

impl<'a> ExperienceResolver<'a> {
    pub fn new(catalog: &'a SpeciesCatalog, config: ExperienceConfig) -> ExperienceResolver<'a> {
        ExperienceResolver { catalog, config }
    }

    /// Award the experience from every opposing faint to `team`, which
    /// fought as `team_side`. Returns the resulting level changes in slot
    /// order of application.
    pub fn award(
        &self,
        team: &mut Team,
        team_side: Side,
        faints: &[FaintRecord],
    ) -> EngineResult<Vec<LevelChangeEvent>> {
        let mut events = Vec::new();
        for record in faints.iter().filter(|r| r.side != team_side) {
            let species = self.catalog.get(&record.species)?;
            let amount = exp_gain(species.base_exp, record.level);

            match self.config.granularity {
                ExperienceGranularity::PerKnockout => {
                    let credited = record
                        .credited_to
                        .filter(|&slot| team.member(slot).is_some_and(|c| !c.is_fainted()));
                    match credited {
                        Some(slot) => self.grant(team, slot, amount, &mut events)?,
                        None => self.split(team, amount, &mut events)?,
                    }
                }
                ExperienceGranularity::PostBattle => {
                    self.split(team, amount, &mut events)?;
                }
            }
        }
        Ok(events)
    }

    /// Split an amount evenly over surviving members, remainder to the
    /// earliest slots.
    fn split(
        &self,
        team: &mut Team,
        amount: u32,
        events: &mut Vec<LevelChangeEvent>,
    ) -> EngineResult<()> {
        let survivors = team.live_slots();
        if survivors.is_empty() {
            return Ok(());
        }
        let share = amount / survivors.len() as u32;
        let remainder = amount as usize % survivors.len();
        for (i, slot) in survivors.into_iter().enumerate() {
            let extra = if i < remainder { 1 } else { 0 };
            if share + extra > 0 {
                self.grant(team, slot, share + extra, events)?;
            }
        }
        Ok(())
    }

    /// Grant experience to one combatant, applying level-ups and any
    /// evolutions they unlock.
    fn grant(
        &self,
        team: &mut Team,
        slot: usize,
        amount: u32,
        events: &mut Vec<LevelChangeEvent>,
    ) -> EngineResult<()> {
        let Some(combatant) = team.member_mut(slot) else {
            return Ok(());
        };
        let old_level = combatant.level;
        combatant.exp = combatant.exp.saturating_add(amount);
        while combatant.level < MAX_LEVEL && combatant.exp >= exp_for_level(combatant.level + 1) {
            combatant.level_up();
        }

        let mut evolved_into = None;
        if combatant.level > old_level {
            // Chained evolutions resolve in one pass; each hop is one-way.
            loop {
                let data = self.catalog.get(&combatant.species)?;
                match &data.evolution {
                    Some(evolution) if combatant.level >= evolution.at_level => {
                        let target = self.catalog.get(&evolution.evolves_into)?.clone();
                        combatant.evolve_into(&target);
                        evolved_into = Some(target.id.clone());
                    }
                    _ => break,
                }
            }
        }

        if combatant.level > old_level {
            log::debug!(
                "{} grew from level {} to {}{}",
                combatant.name,
                old_level,
                combatant.level,
                evolved_into
                    .as_ref()
                    .map(|id| format!(" and evolved into {}", id))
                    .unwrap_or_default()
            );
            events.push(LevelChangeEvent {
                slot,
                name: combatant.name.clone(),
                old_level,
                new_level: combatant.level,
                evolved_into,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::demo_catalogs;
    use crate::combatant::Combatant;

    fn faint(side: Side, species: &str, level: u8, credited_to: Option<usize>) -> FaintRecord {
        FaintRecord {
            side,
            slot: 0,
            species: SpeciesId::new(species),
            level,
            credited_to,
        }
    }

    fn team_of(ids: &[(&str, u8)]) -> Team {
        let (species, _) = demo_catalogs();
        let members = ids
            .iter()
            .map(|(id, level)| {
                Combatant::from_species(species.get(&SpeciesId::new(*id)).unwrap(), *level)
            })
            .collect();
        Team::new("Challenger", members).unwrap()
    }

    #[test]
    fn growth_curve_is_monotonic() {
        for level in 1..MAX_LEVEL {
            assert!(exp_for_level(level) < exp_for_level(level + 1));
        }
    }

    #[test]
    fn knockout_credit_goes_to_the_finisher() {
        let (species, _) = demo_catalogs();
        let resolver = ExperienceResolver::new(&species, ExperienceConfig::default());
        let mut team = team_of(&[("pikachu", 10), ("squirtle", 10)]);
        let before = [team.member(0).unwrap().exp, team.member(1).unwrap().exp];

        let faints = vec![faint(Side::B, "onix", 12, Some(1))];
        resolver.award(&mut team, Side::A, &faints).unwrap();

        assert_eq!(team.member(0).unwrap().exp, before[0]);
        assert!(team.member(1).unwrap().exp > before[1]);
    }

    #[test]
    fn post_battle_split_covers_all_survivors() {
        let (species, _) = demo_catalogs();
        let resolver = ExperienceResolver::new(
            &species,
            ExperienceConfig {
                granularity: ExperienceGranularity::PostBattle,
            },
        );
        let mut team = team_of(&[("pikachu", 10), ("squirtle", 10), ("onix", 10)]);
        // The middle combatant fainted and earns nothing.
        team.member_mut(1).unwrap().apply_damage(u32::MAX);
        let before: Vec<u32> = team.members().iter().map(|c| c.exp).collect();

        let faints = vec![faint(Side::B, "haunter", 14, Some(0))];
        resolver.award(&mut team, Side::A, &faints).unwrap();

        assert!(team.member(0).unwrap().exp > before[0]);
        assert_eq!(team.member(1).unwrap().exp, before[1]);
        assert!(team.member(2).unwrap().exp > before[2]);
    }

    #[test]
    fn crossing_the_trigger_level_evolves_in_place() {
        let (species, _) = demo_catalogs();
        let resolver = ExperienceResolver::new(&species, ExperienceConfig::default());
        // Level 15 charmander, one point of exp short of level 16.
        let mut team = team_of(&[("charmander", 15)]);
        team.member_mut(0).unwrap().exp = exp_for_level(16) - 1;

        let faints = vec![faint(Side::B, "venusaur", 30, Some(0))];
        let events = resolver.award(&mut team, Side::A, &faints).unwrap();

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.old_level, 15);
        assert!(event.new_level >= 16);
        assert_eq!(event.evolved_into, Some(SpeciesId::new("charmeleon")));

        let evolved = team.member(0).unwrap();
        assert_eq!(evolved.species, SpeciesId::new("charmeleon"));
        assert_eq!(evolved.name, "Charmeleon");
        // Experience overflow is retained, not reset.
        assert!(evolved.exp >= exp_for_level(evolved.level));
    }

    #[test]
    fn losses_award_nothing() {
        let (species, _) = demo_catalogs();
        let resolver = ExperienceResolver::new(&species, ExperienceConfig::default());
        let mut team = team_of(&[("pikachu", 10)]);
        let before = team.member(0).unwrap().exp;

        // Only our own faints are on record; no opposing faints to collect.
        let faints = vec![faint(Side::A, "pikachu", 10, Some(0))];
        let events = resolver.award(&mut team, Side::A, &faints).unwrap();
        assert!(events.is_empty());
        assert_eq!(team.member(0).unwrap().exp, before);
    }
}
