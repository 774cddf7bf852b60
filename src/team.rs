use crate::catalog::SpeciesCatalog;
use crate::combatant::Combatant;
use crate::errors::{ConfigResult, ConfigurationError};
use arena_schema::Criterion;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const TEAM_LIMIT: usize = 6;

/// An ordered team of combatants under one trainer for one battle.
///
/// Roster slots are stable identities; the battle-order vector holds live
/// slots only, and the active combatant is always the front of that order.
/// The invariant that the active combatant is non-fainted holds except in
/// the terminal states (whole team fainted, or a Set-mode loss where the
/// battle ends on the faint itself).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    /// Read-only back-reference to the owning trainer; not ownership.
    pub trainer_name: String,
    members: Vec<Combatant>,
    order: Vec<usize>,
    /// Optimised-mode sort direction; flipped by the order-inversion
    /// special move.
    pub(crate) inverted: bool,
}

impl Team {
    pub fn new(trainer_name: impl Into<String>, members: Vec<Combatant>) -> ConfigResult<Team> {
        if members.is_empty() {
            return Err(ConfigurationError::InvalidTeam(
                "a team needs at least one combatant".to_string(),
            ));
        }
        if members.len() > TEAM_LIMIT {
            return Err(ConfigurationError::InvalidTeam(format!(
                "a team may field at most {} combatants, got {}",
                TEAM_LIMIT,
                members.len()
            )));
        }
        let order = (0..members.len()).collect();
        Ok(Team {
            trainer_name: trainer_name.into(),
            members,
            order,
            inverted: false,
        })
    }

    /// Assemble a team of random catalog species at random levels.
    pub fn random(
        trainer_name: impl Into<String>,
        catalog: &SpeciesCatalog,
        size: usize,
        levels: RangeInclusive<u8>,
        rng: &mut impl Rng,
    ) -> ConfigResult<Team> {
        let ids = catalog.ids();
        if ids.is_empty() {
            return Err(ConfigurationError::InvalidTeam(
                "cannot draw a team from an empty catalog".to_string(),
            ));
        }
        let mut members = Vec::with_capacity(size);
        for _ in 0..size.min(TEAM_LIMIT) {
            let id = &ids[rng.random_range(0..ids.len())];
            let level = rng.random_range(levels.clone());
            members.push(Combatant::from_species(catalog.get(id)?, level));
        }
        Team::new(trainer_name, members)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[Combatant] {
        &self.members
    }

    pub fn member(&self, slot: usize) -> Option<&Combatant> {
        self.members.get(slot)
    }

    pub fn member_mut(&mut self, slot: usize) -> Option<&mut Combatant> {
        self.members.get_mut(slot)
    }

    /// Roster slots of all non-fainted combatants, in roster order.
    pub fn live_slots(&self) -> Vec<usize> {
        self.members
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_fainted())
            .map(|(slot, _)| slot)
            .collect()
    }

    pub fn live_count(&self) -> usize {
        self.members.iter().filter(|c| !c.is_fainted()).count()
    }

    pub fn is_defeated(&self) -> bool {
        self.live_count() == 0
    }

    /// The battle-order vector; the front entry is the active combatant.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub(crate) fn set_order(&mut self, order: Vec<usize>) {
        self.order = order;
    }

    pub fn active_slot(&self) -> Option<usize> {
        self.order.first().copied()
    }

    pub fn active(&self) -> Option<&Combatant> {
        self.active_slot().and_then(|slot| self.members.get(slot))
    }

    pub fn active_mut(&mut self) -> Option<&mut Combatant> {
        match self.active_slot() {
            Some(slot) => self.members.get_mut(slot),
            None => None,
        }
    }

    /// Cycle the active combatant to the back of the order.
    pub(crate) fn rotate_order(&mut self) {
        if self.order.len() > 1 {
            self.order.rotate_left(1);
        }
    }

    /// Drop fainted combatants from the order, preserving relative order.
    pub(crate) fn remove_fainted_from_order(&mut self) {
        let members = &self.members;
        self.order.retain(|&slot| !members[slot].is_fainted());
    }

    /// Reverse the waiting (non-active) portion of the order.
    pub(crate) fn reverse_bench(&mut self) {
        if self.order.len() > 2 {
            self.order[1..].reverse();
        }
    }

    /// Sort the live order by an Optimised criterion: descending (or
    /// ascending when inverted), stable tie-break on roster slot.
    pub(crate) fn sort_order_by(&mut self, criterion: Criterion) {
        let mut order = self.live_slots();
        let members = &self.members;
        let inverted = self.inverted;
        order.sort_by_key(|&slot| {
            let value = members[slot].criterion_value(criterion) as i64;
            let primary = if inverted { value } else { -value };
            (primary, slot)
        });
        self.order = order;
    }

    /// Restore every combatant to full HP (gauntlet configuration hook).
    pub fn restore_all(&mut self) {
        for member in &mut self.members {
            member.restore();
        }
    }
}
