//! Gating rules for starting and finishing walks
//!
//! Rule rejections are ordinary values, not errors: callers surface the
//! reason string to the player and move on.

use crate::core::types::{Chain, GeoPoint, Node, SessionKind};
use crate::geo;

/// Outcome of a rule check; `reason` is human-readable and present iff
/// the check rejected.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleCheck {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl RuleCheck {
    pub fn ok() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Daily chain quota. Simulation sessions are exempt: the quota only
/// governs permanent progress.
pub fn can_create_chain_today(count_today: usize, kind: SessionKind, quota: u32) -> RuleCheck {
    if kind == SessionKind::Simulation {
        return RuleCheck::ok();
    }
    if count_today < quota as usize {
        RuleCheck::ok()
    } else {
        RuleCheck::rejected(format!(
            "Daily limit reached: {} of {} chains created today. Come back tomorrow!",
            count_today, quota
        ))
    }
}

/// Sphere-of-influence gate for starting a new chain.
///
/// The first chain a player ever creates is allowed anywhere (bootstrap).
/// After that, a walk must start within the influence radius of at least
/// one existing node of the matching pool: permanent nodes gate permanent
/// attempts, temporary nodes gate simulation attempts, and the two pools
/// never cross-gate each other. An empty matching node pool also passes
/// (e.g. the first simulation run).
pub fn can_start_chain(
    point: GeoPoint,
    nodes: &[Node],
    chains: &[Chain],
    kind: SessionKind,
    influence_radius_km: f64,
) -> RuleCheck {
    let temporary = kind.temporary();

    let has_chains = chains.iter().any(|c| c.temporary == temporary);
    if !has_chains {
        return RuleCheck::ok();
    }

    let pool: Vec<&Node> = nodes.iter().filter(|n| n.temporary == temporary).collect();
    if pool.is_empty() {
        return RuleCheck::ok();
    }

    let radius_m = influence_radius_km * 1000.0;
    let nearest_m = pool
        .iter()
        .map(|n| geo::distance_m(point, n.coordinates))
        .fold(f64::INFINITY, f64::min);

    if nearest_m <= radius_m {
        RuleCheck::ok()
    } else {
        RuleCheck::rejected(format!(
            "Too far from your territory: nearest node is {:.0} m away, \
             but new chains must start within {:.0} m of an existing node.",
            nearest_m, radius_m
        ))
    }
}

/// Reject paths too short to represent a real walk
pub fn is_valid_path(path: &[GeoPoint], min_points: usize) -> RuleCheck {
    if path.len() >= min_points {
        RuleCheck::ok()
    } else {
        RuleCheck::rejected(format!(
            "Path too short: {} points recorded, at least {} needed.",
            path.len(),
            min_points
        ))
    }
}
