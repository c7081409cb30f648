//! Geodesic primitives

pub mod math;

pub use math::{
    bounds_overlap, convex_hull, distance_m, influence_envelope, point_in_polygon,
    polygon_area_m2, ring_bounds, ring_polygon, simplify_ring,
};
