//! Wire schema for persisted records
//!
//! Domain types stay free of storage concerns; these records mirror the
//! on-disk/backend layout exactly (coordinates as `[lon, lat]` pairs).
//! Temporary entities must never be written, so the record builders for
//! collections filter them out.

use chrono::{DateTime, Utc};
use geo_types::coord;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::types::{Chain, ChainId, GeoPoint, Node, NodeId, NodeStatus};

fn to_pair(c: GeoPoint) -> [f64; 2] {
    [c.x, c.y]
}

fn from_pair(p: [f64; 2]) -> GeoPoint {
    coord! { x: p[0], y: p[1] }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: Uuid,
    pub coordinates: [f64; 2],
    pub created_at: DateTime<Utc>,
    pub status: NodeStatus,
    pub temporary: bool,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.0,
            coordinates: to_pair(node.coordinates),
            created_at: node.created_at,
            status: node.status,
            temporary: node.temporary,
        }
    }
}

impl NodeRecord {
    pub fn into_node(self) -> Node {
        Node {
            id: NodeId(self.id),
            coordinates: from_pair(self.coordinates),
            created_at: self.created_at,
            status: self.status,
            temporary: self.temporary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainRecord {
    pub id: Uuid,
    pub node_a_id: Uuid,
    pub node_b_id: Uuid,
    pub path: Vec<[f64; 2]>,
    pub created_at: DateTime<Utc>,
    pub temporary: bool,
}

impl From<&Chain> for ChainRecord {
    fn from(chain: &Chain) -> Self {
        Self {
            id: chain.id.0,
            node_a_id: chain.node_a.0,
            node_b_id: chain.node_b.0,
            path: chain.path.iter().copied().map(to_pair).collect(),
            created_at: chain.created_at,
            temporary: chain.temporary,
        }
    }
}

impl ChainRecord {
    pub fn into_chain(self) -> Chain {
        Chain {
            id: ChainId(self.id),
            node_a: NodeId(self.node_a_id),
            node_b: NodeId(self.node_b_id),
            path: self.path.into_iter().map(from_pair).collect(),
            created_at: self.created_at,
            temporary: self.temporary,
        }
    }

    /// Reduce the path to exactly its two endpoints (player-location
    /// privacy before any upload)
    pub fn with_endpoint_path(mut self) -> Self {
        if self.path.len() > 2 {
            let first = self.path[0];
            let last = self.path[self.path.len() - 1];
            self.path = vec![first, last];
        }
        self
    }
}

/// The single persisted in-progress walk attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub anchor: NodeRecord,
    pub path: Vec<[f64; 2]>,
}

impl AttemptRecord {
    pub fn new(anchor: &Node, path: &[GeoPoint]) -> Self {
        Self {
            anchor: NodeRecord::from(anchor),
            path: path.iter().copied().map(to_pair).collect(),
        }
    }

    pub fn path_points(&self) -> Vec<GeoPoint> {
        self.path.iter().copied().map(from_pair).collect()
    }
}

/// Records for every persistable node; temporary nodes are filtered out
pub fn node_records(nodes: &[Node]) -> Vec<NodeRecord> {
    nodes
        .iter()
        .filter(|n| !n.temporary)
        .map(NodeRecord::from)
        .collect()
}

/// Records for every persistable chain; temporary chains are filtered out
pub fn chain_records(chains: &[Chain]) -> Vec<ChainRecord> {
    chains
        .iter()
        .filter(|c| !c.temporary)
        .map(ChainRecord::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> GeoPoint {
        coord! { x: x, y: y }
    }

    #[test]
    fn test_node_record_round_trip() {
        let node = Node::established(pt(13.4, 52.5), false);
        let restored = NodeRecord::from(&node).into_node();
        assert_eq!(restored, node);
    }

    #[test]
    fn test_chain_record_round_trip_via_json() {
        let chain = Chain::new(
            NodeId::new(),
            NodeId::new(),
            vec![pt(0.0, 0.0), pt(0.001, 0.001)],
            false,
        );
        let record = ChainRecord::from(&chain);
        let json = serde_json::to_string(&record).unwrap();
        let parsed: ChainRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.into_chain(), chain);
    }

    #[test]
    fn test_collection_records_filter_temporary() {
        let nodes = vec![
            Node::established(pt(0.0, 0.0), false),
            Node::established(pt(1.0, 1.0), true),
        ];
        assert_eq!(node_records(&nodes).len(), 1);

        let chains = vec![
            Chain::new(NodeId::new(), NodeId::new(), vec![], true),
            Chain::new(NodeId::new(), NodeId::new(), vec![], false),
        ];
        assert_eq!(chain_records(&chains).len(), 1);
    }

    #[test]
    fn test_with_endpoint_path_reduces_long_routes() {
        let chain = Chain::new(
            NodeId::new(),
            NodeId::new(),
            vec![pt(0.0, 0.0), pt(0.1, 0.1), pt(0.2, 0.0), pt(0.3, 0.3)],
            false,
        );
        let record = ChainRecord::from(&chain).with_endpoint_path();
        assert_eq!(record.path, vec![[0.0, 0.0], [0.3, 0.3]]);

        // Already-reduced paths pass through untouched
        let short = ChainRecord::from(&chain).with_endpoint_path().with_endpoint_path();
        assert_eq!(short.path.len(), 2);
    }
}
