//! Game configuration with documented tunables
//!
//! All rule parameters are collected here so rule changes don't require
//! engine code changes. Values can be overridden from a TOML file.

use serde::{Deserialize, Serialize};

/// Which territory derivation the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerritoryStrategy {
    /// Single convex envelope over all established nodes (current design)
    ConvexHull,
    /// Union of closed walked loops with per-capture cooldown (alternative)
    LoopCapture,
}

/// Configuration for the game-rules engine
///
/// These values gate player progress. Changing them changes game balance,
/// not engine behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === SPHERE OF INFLUENCE ===
    /// Radius around an existing node within which a new walk must start
    /// (after the first). Also sizes the spatial-index bounding boxes.
    pub influence_radius_km: f64,

    // === QUOTAS & PATH VALIDATION ===
    /// Maximum permanent chains a player may create per UTC calendar day.
    /// Simulation sessions are exempt.
    pub daily_chain_quota: u32,

    /// Minimum recorded points for a path to count as a real walk
    pub min_path_points: usize,

    // === POSITION SAMPLING ===
    /// Speed ceiling above which a sample is treated as cheating (m/s).
    /// 5 m/s is a fast run; anything above is vehicle-assisted.
    pub max_walking_speed_mps: f64,

    /// Speed floor below which a sample is discarded as stationary
    /// jitter (m/s)
    pub min_walking_speed_mps: f64,

    /// Throttle interval: at most one accepted sample per this many ms
    pub sample_interval_ms: u64,

    // === ATTEMPT PERSISTENCE ===
    /// Persist the in-progress attempt every Nth accepted point.
    ///
    /// 1 would write on every point; larger values bound write
    /// amplification at the cost of losing up to N-1 points on a crash.
    pub persist_every_points: usize,

    /// Hours after which a persisted attempt is no longer resumable (72 = 3 days)
    pub attempt_expiry_hours: i64,

    // === TERRITORY ===
    pub territory_strategy: TerritoryStrategy,

    /// Douglas-Peucker epsilon (degrees) applied to hulls before handing
    /// them to renderers
    pub simplify_epsilon_deg: f64,

    /// Loop capture: distance (m) within which the path end counts as
    /// closing onto the start or an existing boundary
    pub loop_close_distance_m: f64,

    /// Loop capture: minimum points before closure is considered
    pub min_loop_points: usize,

    /// Loop capture: seconds between captures
    pub capture_cooldown_secs: i64,

    // === MULTIPLAYER SYNC ===
    /// Debounce window for peer re-fetches after a change notification (ms)
    pub sync_debounce_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            influence_radius_km: 0.5,
            daily_chain_quota: 3,
            min_path_points: 10,
            max_walking_speed_mps: 5.0,
            min_walking_speed_mps: 0.3,
            sample_interval_ms: 1000,
            persist_every_points: 5,
            attempt_expiry_hours: 72,
            territory_strategy: TerritoryStrategy::ConvexHull,
            simplify_epsilon_deg: 5e-5,
            loop_close_distance_m: 25.0,
            min_loop_points: 10,
            capture_cooldown_secs: 60,
            sync_debounce_ms: 2000,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.influence_radius_km <= 0.0 {
            return Err(format!(
                "influence_radius_km ({}) must be positive",
                self.influence_radius_km
            ));
        }

        if self.daily_chain_quota == 0 {
            return Err("daily_chain_quota must be at least 1".into());
        }

        if self.min_path_points < 2 {
            return Err(format!(
                "min_path_points ({}) must be at least 2 (a chain needs two endpoints)",
                self.min_path_points
            ));
        }

        if self.min_walking_speed_mps >= self.max_walking_speed_mps {
            return Err(format!(
                "min_walking_speed_mps ({}) must be below max_walking_speed_mps ({})",
                self.min_walking_speed_mps, self.max_walking_speed_mps
            ));
        }

        if self.persist_every_points == 0 {
            return Err("persist_every_points must be at least 1".into());
        }

        if self.attempt_expiry_hours <= 0 {
            return Err("attempt_expiry_hours must be positive".into());
        }

        Ok(())
    }

    /// Parse a config from TOML text; unspecified fields keep defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| format!("Failed to parse config: {}", e))?;
        config.validate()?;
        Ok(config)
    }
}

/// Load a config from a TOML file on disk
pub fn load_game_config(path: &std::path::Path) -> Result<GameConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    GameConfig::from_toml_str(&content)
}
