//! Territory derivation and multiplayer conflict detection

pub mod capture;
pub mod computer;
pub mod conflict;

pub use capture::{CaptureTracker, CapturedLoop};
pub use computer::{hull_territory, Territory, TerritoryComputer};
pub use conflict::{detect_conflicts, ColorAssigner, PlayerTerritory, PALETTE};
