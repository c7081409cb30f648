//! Pathclaim - territory-conquest walking game engine
//!
//! Players walk real-world paths; the engine turns those paths into
//! persistent game objects (nodes, chains, territory) that can be
//! displayed, revisited, and contested by other players.

pub mod attempt;
pub mod core;
pub mod geo;
pub mod position;
pub mod rules;
pub mod session;
pub mod spatial;
pub mod storage;
pub mod store;
pub mod sync;
pub mod territory;
