#[cfg(test)]
mod tests {
    use crate::battle::engine::Action;
    use crate::battle::modes::BattleMode;
    use crate::battle::state::{BattleEvent, GameState, Side, Winner};
    use crate::battle::tests::common::{move_index, Fixture};
    use crate::errors::{EngineError, InvalidActionError};
    use arena_schema::Criterion;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_mode_loss_is_immediate_despite_reserves() {
        let fixture = Fixture::new();
        let mut team_a = fixture.team("Ash", &["charmander", "onix"], 10);
        team_a.member_mut(0).unwrap().set_hp(1);
        let team_b = fixture.team("Gary", &["pikachu"], 10);

        let mut battle = fixture.battle(team_a, team_b, BattleMode::Set);
        let state = battle
            .resolve_round(
                Action::UseMove { move_index: 0 },
                Action::UseMove { move_index: 1 },
            )
            .unwrap();

        // Charmander fainted with a healthy Onix in reserve; in Set mode
        // the team is out regardless.
        assert_eq!(state, GameState::Finished(Winner::TeamB));
        assert!(battle
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::TeamDefeated { side: Side::A })));
        let outcome = battle.into_outcome();
        assert_eq!(outcome.teams[0].live_count(), 1);
    }

    #[test]
    fn rotating_mode_cycles_every_member_through_the_front() {
        let fixture = Fixture::new();
        // Three tanky attackers trading weak hits: nobody faints in four
        // rounds, so rotation alone decides who fronts.
        let team_a = fixture.team("Ash", &["onix", "squirtle", "bulbasaur"], 10);
        let team_b = fixture.team("Gary", &["onix"], 10);
        let mut battle = fixture.battle(team_a, team_b, BattleMode::Rotating);

        let mut leads = Vec::new();
        for _ in 0..4 {
            leads.push(battle.team(Side::A).active().unwrap().name.clone());
            battle
                .resolve_round(
                    Action::UseMove { move_index: 0 },
                    Action::UseMove { move_index: 0 },
                )
                .unwrap();
        }

        // Cyclic coverage: with team size three, three consecutive
        // non-fainting turns front every member exactly once.
        assert_eq!(leads, vec!["Onix", "Squirtle", "Bulbasaur", "Onix"]);
    }

    #[test]
    fn optimised_mode_fronts_the_criterion_maximum_with_roster_tie_break() {
        let fixture = Fixture::new();
        // Two Pikachu tie on Speed; the earlier roster slot must front.
        let team_a = fixture.team("Ash", &["pikachu", "pikachu", "onix"], 10);
        let team_b = fixture.team("Gary", &["onix"], 10);
        let battle = fixture.battle(
            team_a,
            team_b,
            BattleMode::Optimised {
                criterion: Criterion::Speed,
            },
        );

        assert_eq!(battle.team(Side::A).order(), &[0, 1, 2]);
    }

    #[test]
    fn upheaval_inverts_the_optimised_ordering() {
        let fixture = Fixture::new();
        // Under criterion Hp: Venusaur (most HP) fronts, Gastly trails.
        let team_a = fixture.team("Ash", &["venusaur", "squirtle", "gastly"], 20);
        let team_b = fixture.team("Gary", &["onix"], 10);

        let upheaval = move_index(team_a.member(0).unwrap(), "upheaval");
        let mut battle = fixture.battle(
            team_a,
            team_b,
            BattleMode::Optimised {
                criterion: Criterion::Hp,
            },
        );
        assert_eq!(battle.team(Side::A).active().unwrap().name, "Venusaur");

        battle
            .resolve_round(
                Action::UseMove { move_index: upheaval },
                Action::UseMove { move_index: 0 },
            )
            .unwrap();

        // The sort direction flipped: the lowest-HP member now fronts, and
        // it stays that way through the end-of-turn re-sort.
        assert!(battle
            .events()
            .iter()
            .any(|e| matches!(e, BattleEvent::SpecialTriggered { side: Side::A, .. })));
        assert_eq!(battle.team(Side::A).active().unwrap().name, "Gastly");
    }

    #[test]
    fn about_face_reverses_the_rotating_bench() {
        let fixture = Fixture::new();
        let team_a = fixture.team("Ash", &["pikachu", "squirtle", "onix", "gastly"], 10);
        let team_b = fixture.team("Gary", &["onix"], 10);

        let about_face = move_index(team_a.member(0).unwrap(), "about-face");
        let mut battle = fixture.battle(team_a, team_b, BattleMode::Rotating);
        battle
            .resolve_round(
                Action::UseMove { move_index: about_face },
                Action::UseMove { move_index: 0 },
            )
            .unwrap();

        // Bench [1, 2, 3] reversed to [3, 2, 1], then the end-of-turn
        // rotation cycled Pikachu to the back: Gastly fronts round two.
        assert_eq!(battle.team(Side::A).order(), &[3, 2, 1, 0]);
        assert_eq!(battle.team(Side::A).active().unwrap().name, "Gastly");
    }

    #[test]
    fn special_moves_are_rejected_outside_their_mode() {
        let fixture = Fixture::new();
        let team_a = fixture.team("Ash", &["pikachu"], 10);
        let team_b = fixture.team("Gary", &["onix"], 10);
        let about_face = move_index(team_a.member(0).unwrap(), "about-face");

        // About-Face is a Rotating-only move; Set mode refuses it.
        let battle = fixture.battle(team_a, team_b, BattleMode::Set);
        let result = battle.validate(Side::A, Action::UseMove { move_index: about_face });
        assert!(matches!(
            result,
            Err(EngineError::InvalidAction(
                InvalidActionError::SpecialMoveIllegal { .. }
            ))
        ));

        // And the mode filter keeps it out of the legal action list.
        assert!(!battle
            .legal_actions(Side::A)
            .contains(&Action::UseMove { move_index: about_face }));
    }
}
