use crate::battle::calculators::compute_damage;
use crate::battle::engine::{Action, Battle};
use crate::battle::state::Side;
use std::collections::VecDeque;

/// Supplies one action per side per round. Implemented by AIs, test
/// scripts, or any host-side input source; the engine treats the call as a
/// synchronous boundary.
pub trait ActionSelector {
    fn choose(&mut self, battle: &Battle<'_>, side: Side, legal: &[Action]) -> Action;
}

/// Picks the legal damage move with the highest computed damage against the
/// current opposing active, ties going to the lower move index. Falls back
/// to the first legal action when nothing deals damage.
#[derive(Debug, Default)]
pub struct GreedySelector;

impl ActionSelector for GreedySelector {
    fn choose(&mut self, battle: &Battle<'_>, side: Side, legal: &[Action]) -> Action {
        let ctx = battle.context();
        let team = battle.team(side);
        let defender = battle.team(side.opponent()).active();

        let mut best: Option<(u32, Action)> = None;
        if let (Some(attacker), Some(defender)) = (team.active(), defender) {
            for action in legal {
                let Action::UseMove { move_index } = action else {
                    continue;
                };
                let Some(move_id) = attacker.moves.get(*move_index) else {
                    continue;
                };
                let Ok(data) = ctx.moves.get(move_id) else {
                    continue;
                };
                let Ok(outcome) = compute_damage(
                    attacker,
                    defender,
                    data,
                    ctx.chart,
                    battle.damage_context(side),
                ) else {
                    continue;
                };
                let better = match best {
                    Some((amount, _)) => outcome.amount > amount,
                    None => true,
                };
                if better {
                    best = Some((outcome.amount, *action));
                }
            }
        }

        best.map(|(_, action)| action)
            .or_else(|| legal.first().copied())
            .unwrap_or(Action::Forfeit)
    }
}

/// Plays back a fixed script of actions; once exhausted it falls back to
/// the first legal action. Test harness use.
#[derive(Debug, Default)]
pub struct ScriptedSelector {
    script: VecDeque<Action>,
}

impl ScriptedSelector {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> ScriptedSelector {
        ScriptedSelector {
            script: actions.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl ActionSelector for ScriptedSelector {
    fn choose(&mut self, _battle: &Battle<'_>, _side: Side, legal: &[Action]) -> Action {
        self.script
            .pop_front()
            .or_else(|| legal.first().copied())
            .unwrap_or(Action::Forfeit)
    }
}
