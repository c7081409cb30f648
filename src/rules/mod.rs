//! Pure game-rule decision functions

pub mod checks;

pub use checks::{can_create_chain_today, can_start_chain, is_valid_path, RuleCheck};
