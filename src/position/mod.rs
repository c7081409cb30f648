//! Position sampling: geolocation boundary, throttling, cheat detection

pub mod provider;
pub mod sampler;

pub use provider::{GeolocationProvider, PositionSample};
pub use sampler::{PositionSampler, SampleDecision};
