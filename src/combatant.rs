use crate::progression::exp_for_level;
use arena_schema::{BaseStats, Criterion, MoveId, PokemonType, SpeciesData, SpeciesId, Stats};
use serde::{Deserialize, Serialize};

pub const MAX_LEVEL: u8 = 100;

/// Compute the stats a species has at a given level.
///
/// Linear-in-level growth: `(2 * base * level) / 100 + 5`, with HP gaining
/// the additional `level + 10` flat term. Monotonically non-decreasing in
/// level for every stat.
pub fn compute_stats(base: &BaseStats, level: u8) -> Stats {
    let scale = |b: u8| (2 * b as u16 * level as u16) / 100 + 5;
    Stats {
        max_hp: (2 * base.hp as u16 * level as u16) / 100 + level as u16 + 10,
        attack: scale(base.attack),
        defense: scale(base.defense),
        speed: scale(base.speed),
    }
}

/// Mutable runtime view of one creature during (and between) battles.
///
/// Owned exclusively by the team that fields it; identity is preserved
/// across level-ups and evolution (the species reference is swapped in
/// place, never the instance).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub species: SpeciesId,
    /// Cached from the species so damage computation needs no catalog.
    pub types: Vec<PokemonType>,
    base_stats: BaseStats,
    pub level: u8,
    pub exp: u32,
    pub stats: Stats,
    current_hp: u16,
    pub moves: Vec<MoveId>,
}

impl Combatant {
    /// Instantiate a species at a level, at full HP, with experience set to
    /// the floor of the current level.
    pub fn from_species(data: &SpeciesData, level: u8) -> Combatant {
        let level = level.clamp(1, MAX_LEVEL);
        let stats = compute_stats(&data.base_stats, level);
        Combatant {
            name: data.name.clone(),
            species: data.id.clone(),
            types: data.types.clone(),
            base_stats: data.base_stats.clone(),
            level,
            exp: exp_for_level(level),
            stats,
            current_hp: stats.max_hp,
            moves: data.moves.clone(),
        }
    }

    pub fn current_hp(&self) -> u16 {
        self.current_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Apply damage, clamping at zero. Returns the HP actually removed.
    /// Damage application never increases HP.
    pub fn apply_damage(&mut self, amount: u32) -> u16 {
        let dealt = (amount.min(self.current_hp as u32)) as u16;
        self.current_hp -= dealt;
        dealt
    }

    /// Restore to full HP (between gauntlet opponents, when configured).
    pub fn restore(&mut self) {
        self.current_hp = self.stats.max_hp;
    }

    /// Set HP directly, clamped to [0, max]. Test and setup use.
    pub fn set_hp(&mut self, hp: u16) {
        self.current_hp = hp.min(self.stats.max_hp);
    }

    /// Fraction of max HP remaining, in [0, 1].
    pub fn hp_fraction(&self) -> f64 {
        self.current_hp as f64 / self.stats.max_hp as f64
    }

    /// The value this combatant contributes under an Optimised-mode
    /// ordering criterion.
    pub fn criterion_value(&self, criterion: Criterion) -> u32 {
        match criterion {
            Criterion::Hp => self.current_hp as u32,
            Criterion::Attack => self.stats.attack as u32,
            Criterion::Defense => self.stats.defense as u32,
            Criterion::Speed => self.stats.speed as u32,
            Criterion::Level => self.level as u32,
        }
    }

    /// Raise the level by one, recomputing stats. The damage already taken
    /// is preserved, so current HP never decreases on a level-up.
    pub(crate) fn level_up(&mut self) {
        if self.level >= MAX_LEVEL {
            return;
        }
        let damage_taken = self.stats.max_hp - self.current_hp;
        self.level += 1;
        self.stats = compute_stats(&self.base_stats, self.level);
        self.current_hp = self.stats.max_hp.saturating_sub(damage_taken);
    }

    /// Swap the species reference in place: same instance, new base stats
    /// and moveset, stats recomputed at the current level. Current HP is
    /// preserved as a proportion of max, and a living combatant never drops
    /// to zero from the rounding.
    pub(crate) fn evolve_into(&mut self, data: &SpeciesData) {
        let fraction = self.hp_fraction();
        let was_alive = !self.is_fainted();
        self.name = data.name.clone();
        self.species = data.id.clone();
        self.types = data.types.clone();
        self.base_stats = data.base_stats.clone();
        self.moves = data.moves.clone();
        self.stats = compute_stats(&self.base_stats, self.level);
        let mut hp = (self.stats.max_hp as f64 * fraction).round() as u16;
        hp = hp.min(self.stats.max_hp);
        if was_alive && hp == 0 {
            hp = 1;
        }
        self.current_hp = hp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::demo_catalogs;

    fn demo_combatant(id: &str, level: u8) -> Combatant {
        let (species, _) = demo_catalogs();
        Combatant::from_species(species.get(&SpeciesId::new(id)).unwrap(), level)
    }

    #[test]
    fn stat_growth_is_monotonic_in_level() {
        let base = BaseStats {
            hp: 45,
            attack: 49,
            defense: 49,
            speed: 45,
        };
        let mut previous = compute_stats(&base, 1);
        for level in 2..=MAX_LEVEL {
            let next = compute_stats(&base, level);
            assert!(next.max_hp > previous.max_hp, "HP must grow every level");
            assert!(next.attack >= previous.attack);
            assert!(next.defense >= previous.defense);
            assert!(next.speed >= previous.speed);
            previous = next;
        }
    }

    #[test]
    fn damage_clamps_at_zero_and_sets_fainted() {
        let mut combatant = demo_combatant("pikachu", 10);
        let max = combatant.stats.max_hp;
        assert!(!combatant.is_fainted());

        let dealt = combatant.apply_damage(7);
        assert_eq!(dealt, 7);
        assert_eq!(combatant.current_hp(), max - 7);

        let overkill = combatant.apply_damage(u32::from(max) * 10);
        assert_eq!(overkill, max - 7);
        assert_eq!(combatant.current_hp(), 0);
        assert!(combatant.is_fainted());
    }

    #[test]
    fn level_up_preserves_damage_taken() {
        let mut combatant = demo_combatant("charmander", 10);
        combatant.apply_damage(5);
        let damage_taken = combatant.stats.max_hp - combatant.current_hp();

        combatant.level_up();
        assert_eq!(combatant.level, 11);
        assert_eq!(
            combatant.stats.max_hp - combatant.current_hp(),
            damage_taken
        );
    }

    #[test]
    fn evolution_preserves_hp_proportion_not_absolute() {
        let (species, _) = demo_catalogs();
        let mut combatant = demo_combatant("charmander", 16);
        let half = combatant.stats.max_hp / 2;
        combatant.set_hp(half);
        let fraction = combatant.hp_fraction();

        let charmeleon = species.get(&SpeciesId::new("charmeleon")).unwrap();
        combatant.evolve_into(charmeleon);

        assert_eq!(combatant.species, SpeciesId::new("charmeleon"));
        let expected = (combatant.stats.max_hp as f64 * fraction).round() as u16;
        assert_eq!(combatant.current_hp(), expected);
        assert!(combatant.current_hp() > half, "evolved form has more HP");
    }

    #[test]
    fn evolution_never_kills_a_living_combatant() {
        let (species, _) = demo_catalogs();
        let mut combatant = demo_combatant("gastly", 25);
        combatant.set_hp(1);
        combatant.evolve_into(species.get(&SpeciesId::new("haunter")).unwrap());
        assert!(!combatant.is_fainted());
    }
}
