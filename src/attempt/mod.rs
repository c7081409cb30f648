//! Resumable in-progress walk state machine

pub mod controller;

pub use controller::{AttemptInfo, ChainAttempt, ChainAttemptController};
