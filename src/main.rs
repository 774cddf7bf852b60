use pokemon_arena::{
    demo_catalogs, BattleTower, Criterion, GreedySelector, Opponent, Team, TowerConfig, Trainer,
    TypeChart,
};

fn main() {
    // Optionally load the gauntlet configuration from a RON file.
    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(source) => match TowerConfig::from_ron(&source) {
                Ok(config) => config,
                Err(e) => {
                    println!("Error parsing tower config {}: {}", path, e);
                    return;
                }
            },
            Err(e) => {
                println!("Error reading tower config {}: {}", path, e);
                return;
            }
        },
        None => TowerConfig::optimised(Criterion::Hp),
    };

    let (species, moves) = demo_catalogs();
    let chart = TypeChart::kanto();
    let ctx = pokemon_arena::EngineContext {
        chart: &chart,
        moves: &moves,
    };
    let mut rng = rand::rng();

    let challenger = Trainer::new("Ash");
    let team = match Team::random(&challenger.name, &species, 4, 18..=24, &mut rng) {
        Ok(team) => team,
        Err(e) => {
            println!("Error assembling the challenger team: {}", e);
            return;
        }
    };

    println!("{} enters the tower with:", challenger.name);
    for member in team.members() {
        println!("  Lv.{:<3} {}", member.level, member.name);
    }
    println!();

    let mut opponents = Vec::new();
    for (i, name) in ["Gary", "Misty", "Brock"].iter().enumerate() {
        let trainer = Trainer::new(*name);
        let opponent_team =
            match Team::random(&trainer.name, &species, 3 + i % 2, 16..=22, &mut rng) {
                Ok(team) => team,
                Err(e) => {
                    println!("Error assembling {}'s team: {}", name, e);
                    return;
                }
            };
        opponents.push(Opponent {
            trainer,
            team: opponent_team,
        });
    }

    let mut tower = match BattleTower::new(ctx, &species, challenger, team, opponents, config) {
        Ok(tower) => tower,
        Err(e) => {
            println!("Error setting up the tower: {}", e);
            return;
        }
    };

    let mut challenger_ai = GreedySelector;
    let mut opponent_ai = GreedySelector;
    let outcome = match tower.run(&mut challenger_ai, &mut opponent_ai) {
        Ok(outcome) => outcome,
        Err(e) => {
            println!("Tower run failed: {}", e);
            return;
        }
    };

    for record in tower.records() {
        let result = match record.winner {
            Some(pokemon_arena::Winner::TeamA) => "won",
            Some(pokemon_arena::Winner::TeamB) => "lost",
            _ => "drew",
        };
        println!(
            "vs {:<8} {} in {} rounds ({} lives left)",
            record.opponent_name, result, record.rounds, record.lives_remaining
        );
        for change in &record.level_changes {
            match &change.evolved_into {
                Some(species) => println!(
                    "  {} reached Lv.{} and evolved into {}!",
                    change.name, change.new_level, species
                ),
                None => println!("  {} reached Lv.{}!", change.name, change.new_level),
            }
        }
    }

    println!();
    match outcome {
        pokemon_arena::TowerOutcome::Cleared => println!("The tower was cleared!"),
        pokemon_arena::TowerOutcome::Eliminated => {
            println!(
                "Eliminated after defeating {} opponent(s).",
                tower.opponents_defeated()
            )
        }
    }

    match serde_json::to_string_pretty(tower.records()) {
        Ok(json) => println!("\nRun log:\n{}", json),
        Err(e) => println!("Error serializing the run log: {}", e),
    }
}
