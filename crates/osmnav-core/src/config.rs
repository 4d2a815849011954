//! Planner and localization configuration.
//!
//! Typically loaded from a TOML/JSON file by the application crate (with the
//! `serde` feature) and passed down at construction time. Every field has a
//! usable default so tests and demos can start from `NavConfig::default()`.

use std::time::Duration;

use crate::error::{CoreError, CoreResult};

// ── OriginMode ────────────────────────────────────────────────────────────────

/// How the initial position is selected when no explicit initialization
/// request has arrived yet.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OriginMode {
    /// Stay uninitialized until an external initialization request arrives.
    FromRequest,
    /// Snap to the first node retained from the map source.
    FirstParsedNode,
    /// Snap to a node chosen by a seeded RNG (reproducible given the seed).
    RandomNode,
    /// Snap to the node nearest a statically configured coordinate.
    FromStaticConfig { lat: f64, lon: f64 },
}

// ── GpsConfig ─────────────────────────────────────────────────────────────────

/// Satellite-fix acceptance and rate-gating knobs.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpsConfig {
    /// Mean horizontal position variance above which a fix is ignored, m^2.
    /// The default corresponds to a 3 m standard deviation.
    pub max_covariance_m2: f64,

    /// Re-seat the broadcast transform translation from every N-th accepted
    /// fix. `0` disables GPS-driven transform updates entirely.
    pub tf_update_every: u32,
}

impl Default for GpsConfig {
    fn default() -> Self {
        Self {
            max_covariance_m2: 9.0,
            tf_update_every: 5,
        }
    }
}

// ── NavConfig ─────────────────────────────────────────────────────────────────

/// Top-level configuration shared by the localization and planning crates.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavConfig {
    /// Minimum footway clearance in metres. Start/goal pairs closer than
    /// this (plus the anchor offset) are connected directly instead of
    /// routed through the graph.
    pub footway_width_m: f64,

    /// Anchor distances beyond this are logged as a warning: the agent has
    /// strayed far from any mapped footway.
    pub interpolation_max_distance_m: f64,

    /// Initial-position selection policy.
    pub origin_mode: OriginMode,

    /// Seed for the `RandomNode` origin mode. The same seed always selects
    /// the same node for a given map.
    pub seed: u64,

    /// Satellite-fix gating.
    pub gps: GpsConfig,

    /// Period of the background transform broadcast loop, milliseconds.
    pub broadcast_period_ms: u64,

    /// Minimum planar travel between two observed waypoints for a heading
    /// correction to be trusted. Pairs closer than this are noise.
    pub heading_min_travel_m: f64,
}

impl NavConfig {
    /// Broadcast period as a `Duration`.
    #[inline]
    pub fn broadcast_period(&self) -> Duration {
        Duration::from_millis(self.broadcast_period_ms)
    }

    /// Reject nonsensical values, typically right after deserializing from
    /// an external file. NaNs fail the comparisons and are rejected too.
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.footway_width_m > 0.0) {
            return Err(CoreError::Config(format!(
                "footway_width_m must be positive, got {}",
                self.footway_width_m
            )));
        }
        if !(self.interpolation_max_distance_m > 0.0) {
            return Err(CoreError::Config(format!(
                "interpolation_max_distance_m must be positive, got {}",
                self.interpolation_max_distance_m
            )));
        }
        if !(self.gps.max_covariance_m2 > 0.0) {
            return Err(CoreError::Config(format!(
                "gps.max_covariance_m2 must be positive, got {}",
                self.gps.max_covariance_m2
            )));
        }
        if !(self.heading_min_travel_m >= 0.0) {
            return Err(CoreError::Config(format!(
                "heading_min_travel_m must not be negative, got {}",
                self.heading_min_travel_m
            )));
        }
        if self.broadcast_period_ms == 0 {
            return Err(CoreError::Config(
                "broadcast_period_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            footway_width_m: 2.5,
            interpolation_max_distance_m: 30.0,
            origin_mode: OriginMode::FirstParsedNode,
            seed: 0,
            gps: GpsConfig::default(),
            broadcast_period_ms: 100,
            heading_min_travel_m: 1.0,
        }
    }
}
