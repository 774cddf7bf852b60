// Arena Schema - Shared type definitions
// This crate contains the core enums and data records shared between the
// pokemon-arena engine and any host that prepares catalogs or configuration
// for it. It holds no behavior beyond simple accessors.

// Re-export the main types
pub use battle_data::*;
pub use pokemon_types::*;
pub use species_data::*;

pub mod battle_data;
pub mod pokemon_types;
pub mod species_data;
