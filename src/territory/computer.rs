//! Derived territory polygons
//!
//! Two competing derivations exist and are selectable by configuration:
//! the convex-hull aggregate (single envelope over all established nodes,
//! the current design) and the loop-capture strategy (union of closed
//! walked loops). Their shape semantics differ; which one ships is a
//! product decision, so neither is hard-coded.

use geo_types::{Polygon, Rect};

use crate::core::config::{GameConfig, TerritoryStrategy};
use crate::core::types::{Node, PlayerId};
use crate::geo;
use crate::territory::capture::CaptureTracker;

/// A player's derived territory. Never stored; recomputed reactively.
///
/// `owner` is a display hint for downstream coloring, not a security
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Territory {
    pub owner: PlayerId,
    pub polygons: Vec<Polygon<f64>>,
    pub area_m2: f64,
}

impl Territory {
    /// Bounding rectangle over all polygons; used for approximate
    /// conflict detection
    pub fn bounding_rect(&self) -> Option<Rect<f64>> {
        use geo_types::coord;

        let mut merged: Option<Rect<f64>> = None;
        for polygon in &self.polygons {
            let ring: Vec<_> = polygon.exterior().coords().copied().collect();
            if let Some(rect) = geo::ring_bounds(&ring) {
                merged = Some(match merged {
                    None => rect,
                    Some(acc) => Rect::new(
                        coord! {
                            x: acc.min().x.min(rect.min().x),
                            y: acc.min().y.min(rect.min().y),
                        },
                        coord! {
                            x: acc.max().x.max(rect.max().x),
                            y: acc.max().y.max(rect.max().y),
                        },
                    ),
                });
            }
        }
        merged
    }
}

/// Convex-hull territory over established nodes of one pool.
///
/// Fewer than 3 established nodes yield no territory. The hull is
/// simplified for downstream consumers; the peer-sync path reuses this
/// exact procedure so all players' territories share semantics.
pub fn hull_territory(
    owner: PlayerId,
    established_nodes: &[Node],
    simplify_epsilon_deg: f64,
) -> Option<Territory> {
    let points: Vec<_> = established_nodes
        .iter()
        .filter(|n| n.is_established())
        .map(|n| n.coordinates)
        .collect();
    if points.len() < 3 {
        return None;
    }

    let hull = geo::convex_hull(&points);
    if hull.is_empty() {
        return None;
    }
    let ring = geo::simplify_ring(&hull, simplify_epsilon_deg);
    let area_m2 = geo::polygon_area_m2(&ring);
    Some(Territory {
        owner,
        polygons: vec![geo::ring_polygon(&ring)],
        area_m2,
    })
}

/// Recomputes the local player's territory whenever the established-node
/// set changes
pub struct TerritoryComputer {
    strategy: TerritoryStrategy,
    simplify_epsilon_deg: f64,
    capture: CaptureTracker,
}

impl TerritoryComputer {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            strategy: config.territory_strategy,
            simplify_epsilon_deg: config.simplify_epsilon_deg,
            capture: CaptureTracker::new(config),
        }
    }

    pub fn strategy(&self) -> TerritoryStrategy {
        self.strategy
    }

    /// Loop-capture tracker; only fed while that strategy is selected
    pub fn capture_mut(&mut self) -> &mut CaptureTracker {
        &mut self.capture
    }

    /// Derive the territory for the given established-node snapshot
    pub fn recompute(&self, owner: PlayerId, established_nodes: &[Node]) -> Option<Territory> {
        match self.strategy {
            TerritoryStrategy::ConvexHull => {
                hull_territory(owner, established_nodes, self.simplify_epsilon_deg)
            }
            TerritoryStrategy::LoopCapture => self.capture.territory(owner),
        }
    }
}
