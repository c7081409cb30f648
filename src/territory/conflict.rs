//! Multiplayer projections and territory conflict detection
//!
//! Conflicts are approximate by design: two territories conflict when
//! their bounding boxes overlap. No polygon booleans are computed.

use ahash::AHashMap;

use crate::core::types::{Chain, Node, PlayerId};
use crate::geo;
use crate::territory::computer::Territory;

/// Fixed display palette; players are assigned colors round-robin
pub const PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#46f0f0", "#f032e6", "#ffe119",
];

/// Stable per-player color assignment, memoized for the process lifetime
#[derive(Debug, Default)]
pub struct ColorAssigner {
    assigned: AHashMap<PlayerId, &'static str>,
    next: usize,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn color_for(&mut self, player: PlayerId) -> &'static str {
        if let Some(color) = self.assigned.get(&player) {
            return color;
        }
        let color = PALETTE[self.next % PALETTE.len()];
        self.next += 1;
        self.assigned.insert(player, color);
        color
    }
}

/// Read-only projection of another player's holdings
///
/// Chains arrive privacy-reduced (2-point paths); the territory is derived
/// client-side with the same hull procedure as the local player's.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerTerritory {
    pub player: PlayerId,
    pub color: &'static str,
    pub nodes: Vec<Node>,
    pub chains: Vec<Chain>,
    pub territory: Option<Territory>,
}

/// Peers whose territory bounding box overlaps the local player's.
///
/// Returned as a plain id list, not a geometric diff; an absent local
/// territory conflicts with nobody.
pub fn detect_conflicts(local: Option<&Territory>, peers: &[PlayerTerritory]) -> Vec<PlayerId> {
    let Some(local_rect) = local.and_then(Territory::bounding_rect) else {
        return Vec::new();
    };

    peers
        .iter()
        .filter(|peer| {
            peer.territory
                .as_ref()
                .and_then(Territory::bounding_rect)
                .is_some_and(|rect| geo::bounds_overlap(&local_rect, &rect))
        })
        .map(|peer| peer.player)
        .collect()
}
