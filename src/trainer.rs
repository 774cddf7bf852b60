use arena_schema::SpeciesId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A trainer as the engine sees one: a name and a Pokedex. The engine never
/// owns trainer lifecycle; battles receive only the derived damage context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trainer {
    pub name: String,
    pokedex: BTreeSet<SpeciesId>,
}

impl Trainer {
    pub fn new(name: impl Into<String>) -> Trainer {
        Trainer {
            name: name.into(),
            pokedex: BTreeSet::new(),
        }
    }

    /// Record a species as seen. Returns true if it was new.
    pub fn register_species(&mut self, species: SpeciesId) -> bool {
        self.pokedex.insert(species)
    }

    pub fn registered_count(&self) -> usize {
        self.pokedex.len()
    }

    /// Pokedex completion as a fraction of the catalog, in [0, 1].
    pub fn completion(&self, catalog_size: usize) -> f64 {
        if catalog_size == 0 {
            return 0.0;
        }
        (self.pokedex.len() as f64 / catalog_size as f64).min(1.0)
    }
}

/// Maps Pokedex completion to a damage multiplier: strictly increasing in
/// completion, starting at 1.0 for an empty Pokedex and capped at `cap`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PokedexScaling {
    pub cap: f64,
}

impl Default for PokedexScaling {
    fn default() -> Self {
        PokedexScaling { cap: 1.5 }
    }
}

impl PokedexScaling {
    pub fn new(cap: f64) -> PokedexScaling {
        PokedexScaling { cap: cap.max(1.0) }
    }

    /// `1 + completion * (cap - 1)` for completion in [0, 1].
    pub fn multiplier(&self, completion: f64) -> f64 {
        let completion = completion.clamp(0.0, 1.0);
        1.0 + completion * (self.cap.max(1.0) - 1.0)
    }
}

/// Opaque per-side damage scaling threaded into the calculator. Derived
/// from trainer state before the battle; read-only during it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DamageContext {
    pub multiplier: f64,
}

impl DamageContext {
    pub fn neutral() -> DamageContext {
        DamageContext { multiplier: 1.0 }
    }

    pub fn for_trainer(
        trainer: &Trainer,
        catalog_size: usize,
        scaling: PokedexScaling,
    ) -> DamageContext {
        DamageContext {
            multiplier: scaling.multiplier(trainer.completion(catalog_size)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_deduplicates() {
        let mut trainer = Trainer::new("Ash");
        assert!(trainer.register_species(SpeciesId::new("pikachu")));
        assert!(!trainer.register_species(SpeciesId::new("pikachu")));
        assert_eq!(trainer.registered_count(), 1);
    }

    #[test]
    fn multiplier_is_strictly_increasing_and_capped() {
        let scaling = PokedexScaling::new(1.5);
        assert_eq!(scaling.multiplier(0.0), 1.0);
        assert!(scaling.multiplier(0.25) < scaling.multiplier(0.5));
        assert!(scaling.multiplier(0.5) < scaling.multiplier(1.0));
        assert_eq!(scaling.multiplier(1.0), 1.5);
        // Out-of-range completion clamps rather than overshooting the cap.
        assert_eq!(scaling.multiplier(2.0), 1.5);
    }

    #[test]
    fn cap_below_one_is_clamped_to_neutral() {
        let scaling = PokedexScaling::new(0.5);
        assert_eq!(scaling.multiplier(1.0), 1.0);
    }
}
