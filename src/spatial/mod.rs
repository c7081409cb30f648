//! Spatial index over node influence boxes

pub mod index;

pub use index::SpatialIndex;
