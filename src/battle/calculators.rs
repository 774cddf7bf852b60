use crate::combatant::Combatant;
use crate::errors::ConfigResult;
use crate::trainer::DamageContext;
use crate::type_chart::{Effectiveness, TypeChart};
use arena_schema::MoveData;

/// Result of a damage computation: the HP to remove and how the move's type
/// fared against the defender's type combination. Applying the HP change is
/// the turn resolver's job, never this module's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageOutcome {
    pub amount: u32,
    pub effectiveness: Effectiveness,
}

/// Level- and stat-scaled base damage before any multipliers:
/// `(2 * level + 10) * power * attack / (100 * defense) + 2`, in integer
/// arithmetic. Monotonic increasing in power, attack, and level; decreasing
/// in defense.
fn base_damage(level: u8, power: u16, attack: u16, defense: u16) -> u32 {
    let numerator = (2 * level as u32 + 10) * power as u32 * attack as u32;
    numerator / (100 * defense.max(1) as u32) + 2
}

/// Compute the damage one connecting move deals.
///
/// Applies, in order: the base formula, the combined type-effectiveness
/// multiplier, and the attacking trainer's Pokedex multiplier. The result
/// is rounded to an integer and floored at 1 for any non-immune connecting
/// hit; an immune defender takes exactly 0.
pub fn compute_damage(
    attacker: &Combatant,
    defender: &Combatant,
    move_data: &MoveData,
    chart: &TypeChart,
    context: DamageContext,
) -> ConfigResult<DamageOutcome> {
    let multiplier = chart.effectiveness_against(move_data.move_type, &defender.types)?;
    let effectiveness = Effectiveness::classify(multiplier);

    if multiplier == 0.0 {
        return Ok(DamageOutcome {
            amount: 0,
            effectiveness,
        });
    }
    if move_data.power == 0 {
        return Ok(DamageOutcome {
            amount: 0,
            effectiveness: Effectiveness::Normal,
        });
    }

    let base = base_damage(
        attacker.level,
        move_data.power,
        attacker.stats.attack,
        defender.stats.defense,
    );
    let scaled = base as f64 * multiplier * context.multiplier;
    let amount = (scaled.round() as u32).max(1);

    Ok(DamageOutcome {
        amount,
        effectiveness,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::demo_catalogs;
    use crate::combatant::Combatant;
    use arena_schema::{MoveCategory, MoveId, PokemonType, SpeciesId};

    fn fixture() -> (Combatant, Combatant, TypeChart) {
        let (species, _) = demo_catalogs();
        let attacker =
            Combatant::from_species(species.get(&SpeciesId::new("squirtle")).unwrap(), 10);
        let defender =
            Combatant::from_species(species.get(&SpeciesId::new("charmander")).unwrap(), 10);
        (attacker, defender, TypeChart::kanto())
    }

    fn raw_move(id: &str, move_type: PokemonType, power: u16) -> MoveData {
        MoveData {
            id: MoveId::new(id),
            name: id.to_string(),
            move_type,
            power,
            category: MoveCategory::Damage,
            mode_constraint: None,
        }
    }

    #[test]
    fn effectiveness_ratio_is_exact_for_the_reference_inputs() {
        // Level 10, power 40, Attack 30 vs Defense 20: base damage is 20,
        // so x2 and x0.5 must come out to 40 and 10 -- an exact 4:1 ratio.
        let (mut attacker, mut defender, chart) = fixture();
        attacker.level = 10;
        attacker.stats.attack = 30;
        defender.stats.defense = 20;

        let strong = compute_damage(
            &attacker,
            &defender,
            &raw_move("surf", PokemonType::Water, 40),
            &chart,
            DamageContext::neutral(),
        )
        .unwrap();
        assert_eq!(strong.effectiveness, Effectiveness::SuperEffective);
        assert_eq!(strong.amount, 40);

        defender.types = vec![PokemonType::Water];
        let weak = compute_damage(
            &attacker,
            &defender,
            &raw_move("surf", PokemonType::Water, 40),
            &chart,
            DamageContext::neutral(),
        )
        .unwrap();
        assert_eq!(weak.effectiveness, Effectiveness::NotVeryEffective);
        assert_eq!(weak.amount, 10);

        assert_eq!(strong.amount / weak.amount, 4);
        assert_eq!(strong.amount % weak.amount, 0);
    }

    #[test]
    fn connecting_non_immune_hits_deal_at_least_one() {
        let (mut attacker, mut defender, chart) = fixture();
        // Worst realistic case: feeble attacker, towering defense, double
        // resistance.
        attacker.level = 1;
        attacker.stats.attack = 5;
        defender.stats.defense = 400;
        defender.types = vec![PokemonType::Fire, PokemonType::Dragon];

        let outcome = compute_damage(
            &attacker,
            &defender,
            &raw_move("splash-kick", PokemonType::Fire, 10),
            &chart,
            DamageContext::neutral(),
        )
        .unwrap();
        assert_eq!(outcome.effectiveness, Effectiveness::NotVeryEffective);
        assert_eq!(outcome.amount, 1);
    }

    #[test]
    fn immune_defenders_take_exactly_zero() {
        let (species, moves) = demo_catalogs();
        let chart = TypeChart::kanto();
        let attacker = Combatant::from_species(species.get(&SpeciesId::new("onix")).unwrap(), 20);
        let gastly = Combatant::from_species(species.get(&SpeciesId::new("gastly")).unwrap(), 20);

        let tackle = moves.get(&MoveId::new("tackle")).unwrap();
        let outcome =
            compute_damage(&attacker, &gastly, tackle, &chart, DamageContext::neutral()).unwrap();
        assert_eq!(outcome.amount, 0);
        assert_eq!(outcome.effectiveness, Effectiveness::Immune);
    }

    #[test]
    fn pokedex_multiplier_scales_damage() {
        let (attacker, defender, chart) = fixture();
        let move_data = raw_move("water-gun", PokemonType::Water, 40);

        let neutral =
            compute_damage(&attacker, &defender, &move_data, &chart, DamageContext::neutral())
                .unwrap();
        let boosted = compute_damage(
            &attacker,
            &defender,
            &move_data,
            &chart,
            DamageContext { multiplier: 1.5 },
        )
        .unwrap();
        assert!(boosted.amount > neutral.amount);
        assert_eq!(boosted.amount, (neutral.amount as f64 * 1.5).round() as u32);
    }

    #[test]
    fn computation_does_not_mutate_either_combatant() {
        let (attacker, defender, chart) = fixture();
        let hp_before = (attacker.current_hp(), defender.current_hp());
        let _ = compute_damage(
            &attacker,
            &defender,
            &raw_move("water-gun", PokemonType::Water, 40),
            &chart,
            DamageContext::neutral(),
        )
        .unwrap();
        assert_eq!(hp_before, (attacker.current_hp(), defender.current_hp()));
    }
}
