//! R-tree index over node bounding boxes
//!
//! Each node is stored as an axis-aligned box sized to fully contain a
//! circle of the configured influence radius around it, so a point query
//! returns every node whose influence could reach that point. Results are
//! approximate (box, not circle); callers needing exact distances must
//! post-filter with `geo::distance_m`.
//!
//! The index is an explicitly-constructed value owned by the session
//! context; there is deliberately no process-wide instance.

use rstar::{RTree, RTreeObject, AABB};

use crate::core::types::{GeoPoint, Node, NodeId};
use crate::geo;

#[derive(Debug, Clone)]
struct IndexedNode {
    id: NodeId,
    center: [f64; 2],
    envelope: AABB<[f64; 2]>,
}

// Removal matches by node id, not by envelope identity
impl PartialEq for IndexedNode {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl RTreeObject for IndexedNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree of node influence boxes
pub struct SpatialIndex {
    radius_km: f64,
    tree: RTree<IndexedNode>,
}

impl SpatialIndex {
    pub fn new(radius_km: f64) -> Self {
        Self {
            radius_km,
            tree: RTree::new(),
        }
    }

    fn entry(&self, node: &Node) -> IndexedNode {
        let envelope = geo::influence_envelope(node.coordinates, self.radius_km);
        IndexedNode {
            id: node.id,
            center: [node.coordinates.x, node.coordinates.y],
            envelope: AABB::from_corners(
                [envelope.min().x, envelope.min().y],
                [envelope.max().x, envelope.max().y],
            ),
        }
    }

    /// Replace the index contents with the given nodes
    pub fn build(&mut self, nodes: &[Node]) {
        let entries: Vec<IndexedNode> = nodes.iter().map(|n| self.entry(n)).collect();
        self.tree = RTree::bulk_load(entries);
    }

    pub fn insert(&mut self, node: &Node) {
        self.tree.insert(self.entry(node));
    }

    /// Remove a node from the index; returns false if it was not indexed.
    ///
    /// The lookup envelope is derived from the node's coordinates, so the
    /// caller must pass the node as it was when inserted (see `update`).
    pub fn remove(&mut self, node: &Node) -> bool {
        let probe = self.entry(node);
        self.tree.remove(&probe).is_some()
    }

    /// Re-index a node whose coordinates changed
    pub fn update(&mut self, old: &Node, new: &Node) {
        self.remove(old);
        self.insert(new);
    }

    /// Nodes whose influence box covers the given point
    ///
    /// Empty index yields an empty result, never an error.
    pub fn search_radius(&self, point: GeoPoint) -> Vec<NodeId> {
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .map(|entry| entry.id)
            .collect()
    }

    /// Up to `k` candidates from `search_radius`, ranked by exact
    /// great-circle distance
    pub fn find_nearest(&self, point: GeoPoint, k: usize) -> Vec<NodeId> {
        let mut candidates: Vec<(f64, NodeId)> = self
            .tree
            .locate_in_envelope_intersecting(&AABB::from_point([point.x, point.y]))
            .map(|entry| {
                let center = geo_types::coord! { x: entry.center[0], y: entry.center[1] };
                (geo::distance_m(point, center), entry.id)
            })
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));
        candidates.truncate(k);
        candidates.into_iter().map(|(_, id)| id).collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}
