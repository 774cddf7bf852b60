use crate::team::Team;
use arena_schema::{BattleModeKind, Criterion, MoveData};
use serde::{Deserialize, Serialize};

/// What happens to a team after its active combatant faints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaintDisposition {
    /// The team fights on with a new active combatant.
    Continue,
    /// The faint decides the battle against this team.
    TeamDefeated,
}

/// Battle mode policy, selected once per battle.
///
/// A closed tagged variant rather than a trait object: each arm is an
/// independently testable policy over the same capability set
/// (`select_initial_active`, `on_faint`, `on_turn_end`, `on_state_change`,
/// `is_special_move_legal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleMode {
    /// No automatic swapping; an active faint ends the battle for that team
    /// immediately, reserves notwithstanding.
    Set,
    /// The active combatant cycles to the back after every completed turn;
    /// a fainted active leaves the rotation, order otherwise preserved.
    Rotating,
    /// The order is kept sorted descending by the criterion; the active
    /// pointer is recomputed after any HP or ordering change.
    Optimised { criterion: Criterion },
}

impl BattleMode {
    pub fn kind(&self) -> BattleModeKind {
        match self {
            BattleMode::Set => BattleModeKind::Set,
            BattleMode::Rotating => BattleModeKind::Rotating,
            BattleMode::Optimised { .. } => BattleModeKind::Optimised,
        }
    }

    /// Establish the initial battle order and active combatant.
    pub(crate) fn select_initial_active(&self, team: &mut Team) {
        match self {
            BattleMode::Set | BattleMode::Rotating => {
                let order = team.live_slots();
                team.set_order(order);
            }
            BattleMode::Optimised { criterion } => team.sort_order_by(*criterion),
        }
    }

    /// React to the team's active combatant fainting. Runs before the round
    /// is marked complete.
    pub(crate) fn on_faint(&self, team: &mut Team) -> FaintDisposition {
        match self {
            BattleMode::Set => FaintDisposition::TeamDefeated,
            BattleMode::Rotating => {
                team.remove_fainted_from_order();
                if team.order().is_empty() {
                    FaintDisposition::TeamDefeated
                } else {
                    FaintDisposition::Continue
                }
            }
            BattleMode::Optimised { criterion } => {
                team.remove_fainted_from_order();
                team.sort_order_by(*criterion);
                if team.order().is_empty() {
                    FaintDisposition::TeamDefeated
                } else {
                    FaintDisposition::Continue
                }
            }
        }
    }

    /// End-of-turn ordering hook. `active_fainted` reports whether this
    /// team's active fainted during the turn; for Rotating, the faint
    /// removal already advanced the rotation, so a second cycle would skip
    /// a combatant.
    pub(crate) fn on_turn_end(&self, team: &mut Team, active_fainted: bool) {
        match self {
            BattleMode::Set => {}
            BattleMode::Rotating => {
                if !active_fainted {
                    team.rotate_order();
                }
            }
            BattleMode::Optimised { criterion } => team.sort_order_by(*criterion),
        }
    }

    /// Re-establish the ordering after any HP or state change mid-round.
    /// Only Optimised re-sorts eagerly.
    pub(crate) fn on_state_change(&self, team: &mut Team) {
        if let BattleMode::Optimised { criterion } = self {
            team.remove_fainted_from_order();
            team.sort_order_by(*criterion);
        }
    }

    /// A damage move is legal everywhere; a special move only in the mode
    /// its catalog record names.
    pub fn is_special_move_legal(&self, data: &MoveData) -> bool {
        match data.mode_constraint {
            None => !data.is_special(),
            Some(kind) => kind == self.kind(),
        }
    }
}
