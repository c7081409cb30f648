//! Stateless geodesic primitives: distance, area, hulls, containment, bounds
//!
//! All functions are pure and deterministic for identical input ordering.
//! Coordinates are degrees with `x` = longitude, `y` = latitude.

use geo::{
    BoundingRect, ChamberlainDuquetteArea, Contains, ConvexHull, HaversineDistance, Intersects,
    Simplify,
};
use geo_types::{coord, LineString, MultiPoint, Point, Polygon, Rect};

use crate::core::types::GeoPoint;

/// Kilometers per degree of latitude (constant over the globe)
const KM_PER_DEG_LAT: f64 = 110.574;

/// Kilometers per degree of longitude at the equator; shrinks with cos(lat)
const KM_PER_DEG_LON_EQUATOR: f64 = 111.320;

/// Great-circle (haversine) distance between two coordinates, in meters
pub fn distance_m(a: GeoPoint, b: GeoPoint) -> f64 {
    Point::from(a).haversine_distance(&Point::from(b))
}

/// Build a geo polygon from an open ring, closing it if needed
pub fn ring_polygon(ring: &[GeoPoint]) -> Polygon<f64> {
    let mut coords: Vec<GeoPoint> = ring.to_vec();
    if let Some(first) = coords.first().copied() {
        if coords.last() != Some(&first) {
            coords.push(first);
        }
    }
    Polygon::new(LineString::new(coords), vec![])
}

/// Spherical-excess area of a polygon ring, in square meters
///
/// Returns 0.0 for degenerate rings (<3 vertices).
pub fn polygon_area_m2(ring: &[GeoPoint]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    ring_polygon(ring).chamberlain_duquette_unsigned_area()
}

/// Whether a point lies strictly inside a possibly non-convex ring
pub fn point_in_polygon(point: GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < 3 {
        return false;
    }
    ring_polygon(ring).contains(&Point::from(point))
}

/// Convex hull of a point set, returned as an open ring
///
/// Degenerate input (<3 distinct, non-collinear points) yields an empty ring.
pub fn convex_hull(points: &[GeoPoint]) -> Vec<GeoPoint> {
    if points.len() < 3 {
        return Vec::new();
    }
    let multipoint: MultiPoint<f64> = points.iter().copied().map(Point::from).collect();
    let hull = multipoint.convex_hull();
    let mut ring: Vec<GeoPoint> = hull.exterior().coords().copied().collect();
    // The exterior ring repeats its first vertex; keep the open form
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return Vec::new();
    }
    ring
}

/// Douglas-Peucker simplification of an open ring, preserving validity
///
/// If simplification would collapse the ring below a triangle, the input
/// is returned unchanged.
pub fn simplify_ring(ring: &[GeoPoint], epsilon_deg: f64) -> Vec<GeoPoint> {
    if ring.len() < 4 || epsilon_deg <= 0.0 {
        return ring.to_vec();
    }
    let simplified = ring_polygon(ring).simplify(&epsilon_deg);
    let mut result: Vec<GeoPoint> = simplified.exterior().coords().copied().collect();
    if result.len() > 1 && result.first() == result.last() {
        result.pop();
    }
    if result.len() < 3 {
        return ring.to_vec();
    }
    result
}

/// Axis-aligned overlap test between two bounding boxes
pub fn bounds_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.intersects(b)
}

/// Bounding rectangle of an open ring
pub fn ring_bounds(ring: &[GeoPoint]) -> Option<Rect<f64>> {
    if ring.is_empty() {
        return None;
    }
    LineString::new(ring.to_vec()).bounding_rect()
}

/// Axis-aligned box fully containing the influence circle around a point
///
/// Longitude degrees shrink with cos(latitude), so the box widens toward
/// the poles to keep covering the same ground distance.
pub fn influence_envelope(center: GeoPoint, radius_km: f64) -> Rect<f64> {
    let lat_delta = radius_km / KM_PER_DEG_LAT;
    let cos_lat = center.y.to_radians().cos().abs().max(1e-6);
    let lon_delta = radius_km / (KM_PER_DEG_LON_EQUATOR * cos_lat);
    Rect::new(
        coord! { x: center.x - lon_delta, y: center.y - lat_delta },
        coord! { x: center.x + lon_delta, y: center.y + lat_delta },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pt(x: f64, y: f64) -> GeoPoint {
        coord! { x: x, y: y }
    }

    #[test]
    fn test_distance_one_hundredth_degree_latitude() {
        // 0.01 deg of latitude is ~1.11 km regardless of longitude
        let d = distance_m(pt(0.0, 0.0), pt(0.0, 0.01));
        assert!((d - 1112.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn test_distance_zero_for_identical_points() {
        assert_eq!(distance_m(pt(13.4, 52.5), pt(13.4, 52.5)), 0.0);
    }

    #[test]
    fn test_polygon_area_degenerate() {
        assert_eq!(polygon_area_m2(&[]), 0.0);
        assert_eq!(polygon_area_m2(&[pt(0.0, 0.0), pt(0.0, 0.01)]), 0.0);
    }

    #[test]
    fn test_polygon_area_square_200m() {
        // ~200m x 200m square at the equator
        let side = 0.0017986;
        let ring = vec![pt(0.0, 0.0), pt(side, 0.0), pt(side, side), pt(0.0, side)];
        let area = polygon_area_m2(&ring);
        assert!(
            (area - 40_000.0).abs() < 1_000.0,
            "expected ~40000 m^2, got {}",
            area
        );
    }

    #[test]
    fn test_point_in_polygon_square() {
        let ring = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(1.0, 1.0), pt(0.0, 1.0)];
        assert!(point_in_polygon(pt(0.5, 0.5), &ring));
        assert!(!point_in_polygon(pt(1.5, 0.5), &ring));
    }

    #[test]
    fn test_point_in_polygon_concave() {
        // A "U" shape: the notch interior is outside the ring
        let ring = vec![
            pt(0.0, 0.0),
            pt(3.0, 0.0),
            pt(3.0, 3.0),
            pt(2.0, 3.0),
            pt(2.0, 1.0),
            pt(1.0, 1.0),
            pt(1.0, 3.0),
            pt(0.0, 3.0),
        ];
        assert!(point_in_polygon(pt(0.5, 2.0), &ring));
        assert!(!point_in_polygon(pt(1.5, 2.0), &ring));
    }

    #[test]
    fn test_convex_hull_degenerate() {
        assert!(convex_hull(&[]).is_empty());
        assert!(convex_hull(&[pt(0.0, 0.0), pt(1.0, 1.0)]).is_empty());
    }

    #[test]
    fn test_convex_hull_drops_interior_points() {
        let points = vec![
            pt(0.0, 0.0),
            pt(2.0, 0.0),
            pt(2.0, 2.0),
            pt(0.0, 2.0),
            pt(1.0, 1.0), // interior
        ];
        let hull = convex_hull(&points);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&pt(1.0, 1.0)));
    }

    #[test]
    fn test_simplify_preserves_triangle() {
        let ring = vec![pt(0.0, 0.0), pt(1.0, 0.0), pt(0.5, 1.0)];
        assert_eq!(simplify_ring(&ring, 0.1), ring);
    }

    #[test]
    fn test_simplify_removes_near_collinear_vertex() {
        let ring = vec![
            pt(0.0, 0.0),
            pt(0.5, 1e-9), // effectively on the bottom edge
            pt(1.0, 0.0),
            pt(1.0, 1.0),
            pt(0.0, 1.0),
        ];
        let simplified = simplify_ring(&ring, 1e-6);
        assert_eq!(simplified.len(), 4);
    }

    #[test]
    fn test_bounds_overlap() {
        let a = Rect::new(pt(0.0, 0.0), pt(2.0, 2.0));
        let b = Rect::new(pt(1.0, 1.0), pt(3.0, 3.0));
        let c = Rect::new(pt(5.0, 5.0), pt(6.0, 6.0));
        assert!(bounds_overlap(&a, &b));
        assert!(!bounds_overlap(&a, &c));
    }

    #[test]
    fn test_influence_envelope_widens_with_latitude() {
        let equator = influence_envelope(pt(0.0, 0.0), 1.0);
        let north = influence_envelope(pt(0.0, 60.0), 1.0);
        let equator_width = equator.max().x - equator.min().x;
        let north_width = north.max().x - north.min().x;
        // cos(60) = 0.5, so the box should be about twice as wide
        assert!((north_width / equator_width - 2.0).abs() < 0.01);
        // Latitude extent is unaffected
        let eq_height = equator.max().y - equator.min().y;
        let n_height = north.max().y - north.min().y;
        assert!((eq_height - n_height).abs() < 1e-12);
    }

    #[test]
    fn test_influence_envelope_contains_circle() {
        let center = pt(13.4, 52.5);
        let envelope = influence_envelope(center, 0.5);
        // Points 500m due north/south/east/west must fall inside the box
        let north = pt(center.x, center.y + 0.5 / KM_PER_DEG_LAT);
        assert!(envelope.contains(&Point::from(north)));
        assert!(distance_m(center, north) <= 501.0);
    }

    fn sorted_bits(ring: &[GeoPoint]) -> Vec<(u64, u64)> {
        let mut v: Vec<(u64, u64)> = ring
            .iter()
            .map(|c| (c.x.to_bits(), c.y.to_bits()))
            .collect();
        v.sort_unstable();
        v
    }

    proptest! {
        #[test]
        fn prop_hull_is_idempotent(
            points in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 3..24)
        ) {
            let points: Vec<GeoPoint> = points.into_iter().map(|(x, y)| pt(x, y)).collect();
            let hull = convex_hull(&points);
            if !hull.is_empty() {
                let rehull = convex_hull(&hull);
                // Hulling a hull's own vertices returns the same vertex set
                prop_assert_eq!(sorted_bits(&rehull), sorted_bits(&hull));
            }
        }

        #[test]
        fn prop_hull_covers_input(
            points in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 3..24)
        ) {
            let points: Vec<GeoPoint> = points.into_iter().map(|(x, y)| pt(x, y)).collect();
            let hull = convex_hull(&points);
            if !hull.is_empty() {
                let polygon = ring_polygon(&hull);
                for p in &points {
                    // intersects (not contains) so hull vertices count as covered
                    prop_assert!(polygon.intersects(&Point::from(*p)));
                }
            }
        }
    }
}
