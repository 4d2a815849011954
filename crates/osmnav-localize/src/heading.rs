//! Two-waypoint heading correction.
//!
//! Consecutive anchored positions trace the direction the agent actually
//! moved; comparing that bearing against the broadcast rotation yields a
//! correction delta. Pairs closer together than the configured minimum
//! travel are not informative (sensor noise dominates) and are rejected.

use osmnav_core::PlanarPoint;
use osmnav_core::planar::normalize_angle;

use crate::broadcast::TfHandle;

/// Accumulates at most two recently observed waypoints.
#[derive(Debug)]
pub struct HeadingCorrector {
    first: Option<PlanarPoint>,
    second: Option<PlanarPoint>,
    min_travel_m: f64,
}

impl HeadingCorrector {
    pub fn new(min_travel_m: f64) -> Self {
        Self { first: None, second: None, min_travel_m }
    }

    /// Record an observed waypoint: the first call holds it, the second
    /// completes the pair.
    pub fn add_point(&mut self, point: PlanarPoint) {
        if self.first.is_none() {
            self.first = Some(point);
        } else if self.second.is_none() {
            self.second = Some(point);
        } else {
            // Already a full pair awaiting evaluation; keep the newest.
            self.second = Some(point);
        }
    }

    /// Apply the pair's bearing delta to the broadcast rotation.
    ///
    /// Returns `true` when a correction was applied. A pair closer than the
    /// minimum travel distance applies nothing; the newer point is kept so
    /// the window keeps moving with the agent.
    pub fn try_correct(&mut self, tf: &TfHandle) -> bool {
        let (Some(first), Some(second)) = (self.first, self.second) else {
            return false;
        };

        if first.distance(second) < self.min_travel_m {
            // Not informative. Slide: the newest observation becomes the
            // start of the next pair.
            self.first = Some(second);
            self.second = None;
            return false;
        }

        let bearing = first.bearing(second);
        let delta = normalize_angle(bearing - tf.yaw());
        tf.improve_rotation(delta);
        log::debug!(
            "heading corrected by {:.4} rad over {:.2} m of travel",
            delta,
            first.distance(second)
        );

        self.first = None;
        self.second = None;
        true
    }

    /// Discard any accumulated waypoints (re-initialization).
    pub fn reset(&mut self) {
        self.first = None;
        self.second = None;
    }
}
