//! Core type definitions used throughout the engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A ground coordinate in degrees: `x` = longitude, `y` = latitude.
pub type GeoPoint = geo_types::Coord<f64>;

/// Unique identifier for nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChainId(pub Uuid);

impl ChainId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ChainId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for players
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Node lifecycle status
///
/// A `Pending` node exists only as the anchor of the single in-flight
/// walk attempt; it becomes `Established` when the attempt is finalized
/// and never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Pending,
    Established,
}

/// Session variant, resolved once at session creation.
///
/// Simulation sessions are disposable: their nodes and chains are marked
/// temporary, never reach durable storage, and gate only against other
/// temporary entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Permanent,
    Simulation,
}

impl SessionKind {
    /// Whether entities created under this session are temporary
    pub fn temporary(&self) -> bool {
        matches!(self, SessionKind::Simulation)
    }
}

/// A point the player has established on the ground
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub coordinates: GeoPoint,
    pub created_at: DateTime<Utc>,
    pub status: NodeStatus,
    pub temporary: bool,
}

impl Node {
    /// Create a pending node (walk-attempt anchor)
    pub fn pending(coordinates: GeoPoint, temporary: bool) -> Self {
        Self {
            id: NodeId::new(),
            coordinates,
            created_at: Utc::now(),
            status: NodeStatus::Pending,
            temporary,
        }
    }

    /// Create an already-established node
    pub fn established(coordinates: GeoPoint, temporary: bool) -> Self {
        Self {
            status: NodeStatus::Established,
            ..Self::pending(coordinates, temporary)
        }
    }

    pub fn is_established(&self) -> bool {
        self.status == NodeStatus::Established
    }
}

/// An edge connecting exactly two nodes, the artifact of one completed walk
///
/// For permanent chains `path` holds exactly the two endpoint coordinates;
/// the full walked route is discarded at promotion for player-location
/// privacy. Simulation chains may keep the full path since they never leave
/// the process.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub id: ChainId,
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub path: Vec<GeoPoint>,
    pub created_at: DateTime<Utc>,
    pub temporary: bool,
}

impl Chain {
    pub fn new(node_a: NodeId, node_b: NodeId, path: Vec<GeoPoint>, temporary: bool) -> Self {
        Self {
            id: ChainId::new(),
            node_a,
            node_b,
            path,
            created_at: Utc::now(),
            temporary,
        }
    }

    /// Whether this chain touches the given node
    pub fn touches(&self, node: NodeId) -> bool {
        self.node_a == node || self.node_b == node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::coord;

    #[test]
    fn test_node_id_equality_and_hash() {
        use std::collections::HashMap;
        let a = NodeId::new();
        let b = a;
        assert_eq!(a, b);
        let mut map: HashMap<NodeId, &str> = HashMap::new();
        map.insert(a, "anchor");
        assert_eq!(map.get(&b), Some(&"anchor"));
    }

    #[test]
    fn test_session_kind_temporary() {
        assert!(!SessionKind::Permanent.temporary());
        assert!(SessionKind::Simulation.temporary());
    }

    #[test]
    fn test_node_constructors() {
        let p = Node::pending(coord! { x: 1.0, y: 2.0 }, false);
        assert_eq!(p.status, NodeStatus::Pending);
        assert!(!p.is_established());

        let e = Node::established(coord! { x: 1.0, y: 2.0 }, true);
        assert!(e.is_established());
        assert!(e.temporary);
    }

    #[test]
    fn test_chain_touches() {
        let a = NodeId::new();
        let b = NodeId::new();
        let chain = Chain::new(a, b, vec![], false);
        assert!(chain.touches(a));
        assert!(chain.touches(b));
        assert!(!chain.touches(NodeId::new()));
    }
}
