use crate::type_chart::Effectiveness;
use arena_schema::SpecialEffect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two sides of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => write!(f, "team A"),
            Side::B => write!(f, "team B"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    TeamA,
    TeamB,
    /// Both final combatants fell to a simultaneous round, or the round
    /// limit was reached.
    Draw,
}

impl Winner {
    pub fn winning_side(self) -> Option<Side> {
        match self {
            Winner::TeamA => Some(Side::A),
            Winner::TeamB => Some(Side::B),
            Winner::Draw => None,
        }
    }

    pub fn for_side(side: Side) -> Winner {
        match side {
            Side::A => Winner::TeamA,
            Side::B => Winner::TeamB,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    WaitingForActions,
    RoundInProgress,
    Finished(Winner),
}

/// Everything that happened in a battle, in order. The ordered event log is
/// the engine's structured output for display and for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BattleEvent {
    RoundStarted {
        round: u32,
    },
    MoveUsed {
        side: Side,
        combatant: String,
        move_name: String,
    },
    SpecialTriggered {
        side: Side,
        effect: SpecialEffect,
    },
    DamageDealt {
        side: Side,
        combatant: String,
        amount: u32,
        effectiveness: Effectiveness,
        remaining_hp: u16,
    },
    /// The chosen actor had already fainted when its action came up.
    ActionSkipped {
        side: Side,
        combatant: String,
    },
    Fainted {
        side: Side,
        combatant: String,
    },
    ActiveChanged {
        side: Side,
        combatant: String,
    },
    TeamReordered {
        side: Side,
        order: Vec<usize>,
    },
    Forfeited {
        side: Side,
    },
    TeamDefeated {
        side: Side,
    },
    RoundLimitReached {
        limit: u32,
    },
    BattleEnded {
        winner: Winner,
    },
}

impl BattleEvent {
    /// Human-readable rendering of the event, or None for events that are
    /// obvious from their neighbors.
    pub fn format(&self) -> Option<String> {
        match self {
            BattleEvent::RoundStarted { round } => Some(format!("=== Round {} ===", round)),
            BattleEvent::MoveUsed {
                combatant,
                move_name,
                ..
            } => Some(format!("{} used {}!", combatant, move_name)),
            BattleEvent::SpecialTriggered { side, effect } => {
                Some(format!("{} is swept up in the {}!", side, effect))
            }
            BattleEvent::DamageDealt {
                combatant,
                amount,
                effectiveness,
                ..
            } => {
                let mut line = format!("{} took {} damage!", combatant, amount);
                match effectiveness {
                    Effectiveness::SuperEffective => line.push_str(" It's super effective!"),
                    Effectiveness::NotVeryEffective => {
                        line.push_str(" It's not very effective...")
                    }
                    Effectiveness::Immune => line = format!("It doesn't affect {}...", combatant),
                    Effectiveness::Normal => {}
                }
                Some(line)
            }
            BattleEvent::ActionSkipped { combatant, .. } => {
                Some(format!("{} can no longer act!", combatant))
            }
            BattleEvent::Fainted { combatant, .. } => Some(format!("{} fainted!", combatant)),
            BattleEvent::ActiveChanged { combatant, .. } => {
                Some(format!("{} steps forward!", combatant))
            }
            BattleEvent::TeamReordered { .. } => None,
            BattleEvent::Forfeited { side } => Some(format!("{} forfeited the battle!", side)),
            BattleEvent::TeamDefeated { side } => {
                Some(format!("{} is out of usable combatants!", side))
            }
            BattleEvent::RoundLimitReached { limit } => {
                Some(format!("The battle was called after {} rounds!", limit))
            }
            BattleEvent::BattleEnded { winner } => match winner {
                Winner::TeamA => Some("Team A wins the battle!".to_string()),
                Winner::TeamB => Some("Team B wins the battle!".to_string()),
                Winner::Draw => Some("The battle ended in a draw!".to_string()),
            },
        }
    }
}

/// Ordered collector for battle events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventBus {
    events: Vec<BattleEvent>,
}

impl EventBus {
    pub fn new() -> EventBus {
        EventBus { events: Vec::new() }
    }

    pub fn push(&mut self, event: BattleEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[BattleEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<BattleEvent> {
        self.events
    }

    /// All displayable lines, in order.
    pub fn formatted(&self) -> Vec<String> {
        self.events.iter().filter_map(|e| e.format()).collect()
    }
}
