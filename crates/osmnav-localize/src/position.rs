//! The position estimator: multi-source fusion anchored to the road graph.
//!
//! # Sources and trust
//!
//! | Source    | Trust                                                       |
//! |-----------|-------------------------------------------------------------|
//! | Satellite | Gated by a pluggable quality policy, rate-limited           |
//! | Odometry  | Always accepted (locally integrated, drift is the caller's) |
//! | Transform | Best effort; lookup failure leaves the estimate untouched   |
//!
//! Whatever the source, the estimate ends anchored to the nearest node of
//! the immutable node table, so planning always starts from a valid id.

use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use osmnav_core::{GeoPoint, NavConfig, NodeId, OriginMode, PlanarPoint, Pose};
use osmnav_spatial::NodeTable;

use crate::broadcast::TfHandle;
use crate::heading::HeadingCorrector;
use crate::{LocalizeError, LocalizeResult};

// ── GpsFix & acceptance policy ────────────────────────────────────────────────

/// A satellite fix as delivered by the external position sensor.
#[derive(Copy, Clone, Debug)]
pub struct GpsFix {
    pub point: GeoPoint,
    /// 2x2 horizontal position covariance, row-major, m^2.
    pub covariance: [f64; 4],
}

impl GpsFix {
    /// Mean of the two horizontal variance terms.
    #[inline]
    pub fn horizontal_variance(&self) -> f64 {
        (self.covariance[0] + self.covariance[3]) * 0.5
    }
}

/// Decides whether a fix is accurate enough to move the anchor.
///
/// The scoring formula is deliberately a policy object rather than a
/// hard-coded rule: sensors report quality in different ways, and the
/// right threshold is a deployment decision.
pub trait GpsGate: Send {
    fn accepts(&self, fix: &GpsFix) -> bool;
}

/// Default gate: accept while the mean horizontal variance stays at or
/// under a configured ceiling.
#[derive(Copy, Clone, Debug)]
pub struct CovarianceGate {
    pub max_covariance_m2: f64,
}

impl GpsGate for CovarianceGate {
    fn accepts(&self, fix: &GpsFix) -> bool {
        fix.horizontal_variance() <= self.max_covariance_m2
    }
}

// ── TransformSource ───────────────────────────────────────────────────────────

/// External frame-transform tree collaborator.
///
/// Lookups either succeed immediately or fail fast; retry policy, if any,
/// belongs to the calling orchestration loop.
pub trait TransformSource {
    fn lookup(&self) -> Option<Pose>;
}

// ── CurrentPosition ───────────────────────────────────────────────────────────

/// The agent's current best estimate, always resolvable to a valid node id
/// once initialized. Overwritten in place; never destroyed.
#[derive(Copy, Clone, Debug)]
pub struct CurrentPosition {
    pub id: NodeId,
    pub geo: GeoPoint,
    pub pose: Pose,
}

// ── PositionEstimator ─────────────────────────────────────────────────────────

/// Fuses GPS, odometry, and transform lookups into a single current-node
/// anchored position. Owns the initialization state: planning must refuse
/// to run until [`is_initialized`](Self::is_initialized) turns true.
pub struct PositionEstimator {
    nodes: Arc<NodeTable>,
    config: NavConfig,
    gate: Box<dyn GpsGate>,
    tf: TfHandle,
    heading: HeadingCorrector,
    current: CurrentPosition,
    initialized: bool,
    accepted_fixes: u32,
}

impl PositionEstimator {
    /// Create an uninitialized estimator with the default covariance gate.
    pub fn new(nodes: Arc<NodeTable>, config: NavConfig, tf: TfHandle) -> Self {
        let gate = Box::new(CovarianceGate {
            max_covariance_m2: config.gps.max_covariance_m2,
        });
        Self::with_gate(nodes, config, tf, gate)
    }

    /// Like [`new`](Self::new) with a custom fix-acceptance policy.
    pub fn with_gate(
        nodes: Arc<NodeTable>,
        config: NavConfig,
        tf: TfHandle,
        gate: Box<dyn GpsGate>,
    ) -> Self {
        let heading = HeadingCorrector::new(config.heading_min_travel_m);
        Self {
            nodes,
            config,
            gate,
            tf,
            heading,
            current: CurrentPosition {
                id: NodeId::INVALID,
                geo: GeoPoint::default(),
                pose: Pose::default(),
            },
            initialized: false,
            accepted_fixes: 0,
        }
    }

    // ── State access ──────────────────────────────────────────────────────

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The current estimate, or `NotInitialized` before the first
    /// successful `initialize*` call.
    pub fn current(&self) -> LocalizeResult<&CurrentPosition> {
        if self.initialized {
            Ok(&self.current)
        } else {
            Err(LocalizeError::NotInitialized)
        }
    }

    /// Handle to the shared broadcast transform cell.
    pub fn tf(&self) -> &TfHandle {
        &self.tf
    }

    pub fn nodes(&self) -> &Arc<NodeTable> {
        &self.nodes
    }

    // ── Initialization ────────────────────────────────────────────────────

    /// Initialize at an explicit coordinate and heading. Snaps the anchor
    /// to the nearest node and seats the broadcast transform.
    pub fn initialize_with_bearing(
        &mut self,
        lat: f64,
        lon: f64,
        bearing: f64,
    ) -> LocalizeResult<NodeId> {
        let geo = GeoPoint::new(lat, lon);
        let planar = self.nodes.projection().to_planar(geo);
        let id = self
            .nodes
            .nearest_node(planar)
            .ok_or(LocalizeError::EmptyNetwork)?;

        self.current = CurrentPosition {
            id,
            geo,
            pose: Pose::new(planar, bearing),
        };
        self.tf.set_translation(planar);
        self.tf.set_rotation(bearing);
        self.heading.reset();
        self.accepted_fixes = 0;
        self.initialized = true;

        log::info!("position initialized at {geo}, anchored to {id}");
        Ok(id)
    }

    /// Initialize at an explicit coordinate; the heading is derived from
    /// the direction of the nearest node's first edge.
    pub fn initialize_at(&mut self, lat: f64, lon: f64) -> LocalizeResult<NodeId> {
        let geo = GeoPoint::new(lat, lon);
        let id = self
            .nodes
            .nearest_node_geo(geo)
            .ok_or(LocalizeError::EmptyNetwork)?;
        let bearing = self.nodes.initial_bearing(id).unwrap_or(0.0);
        self.initialize_with_bearing(lat, lon, bearing)
    }

    /// Initialize according to the configured [`OriginMode`].
    ///
    /// Returns `Ok(None)` in `FromRequest` mode: the estimator stays
    /// uninitialized until an external request arrives.
    pub fn initialize_default(&mut self) -> LocalizeResult<Option<NodeId>> {
        match self.config.origin_mode {
            OriginMode::FromRequest => {
                log::warn!("waiting for an external initialization request");
                Ok(None)
            }
            OriginMode::FirstParsedNode => self.initialize_at_node(NodeId(0)).map(Some),
            OriginMode::RandomNode => {
                if self.nodes.is_empty() {
                    return Err(LocalizeError::EmptyNetwork);
                }
                let mut rng = SmallRng::seed_from_u64(self.config.seed);
                let id = NodeId(rng.gen_range(0..self.nodes.len() as u32));
                self.initialize_at_node(id).map(Some)
            }
            OriginMode::FromStaticConfig { lat, lon } => self.initialize_at(lat, lon).map(Some),
        }
    }

    fn initialize_at_node(&mut self, id: NodeId) -> LocalizeResult<NodeId> {
        let geo = self.nodes.geo(id).ok_or(LocalizeError::NodeNotFound(id))?;
        let bearing = self.nodes.initial_bearing(id).unwrap_or(0.0);
        self.initialize_with_bearing(geo.lat, geo.lon, bearing)
    }

    // ── Sensor updates ────────────────────────────────────────────────────

    /// Fold in a satellite fix. Returns `false` (estimate untouched) when
    /// the gate rejects the fix or no position exists yet; `true` after the
    /// anchor moved.
    ///
    /// Every `tf_update_every`-th accepted fix also re-seats the broadcast
    /// transform translation, so noisy fixes cannot thrash the frame.
    pub fn set_position_from_gps(&mut self, fix: &GpsFix) -> bool {
        if !self.initialized {
            log::debug!("GPS fix ignored: position not initialized");
            return false;
        }
        if !self.gate.accepts(fix) {
            log::debug!(
                "GPS fix ignored: horizontal variance {:.2} m^2 exceeds the acceptance ceiling",
                fix.horizontal_variance()
            );
            return false;
        }

        let planar = self.nodes.projection().to_planar(fix.point);
        self.current.geo = fix.point;
        self.current.pose.position = planar;
        self.anchor(planar);

        self.accepted_fixes += 1;
        let every = self.config.gps.tf_update_every;
        if every > 0 && self.accepted_fixes.is_multiple_of(every) {
            self.tf.set_translation(planar);
        }

        self.heading.add_point(planar);
        self.heading.try_correct(&self.tf);
        true
    }

    /// Overwrite the planar estimate from locally integrated motion.
    /// Always accepted; the geographic point is left as-is.
    pub fn set_position_from_odom(&mut self, point: PlanarPoint) {
        self.current.pose.position = point;
        self.anchor(point);
    }

    /// Refresh the pose from the external frame-transform tree.
    ///
    /// Returns `false` (estimate untouched) when the lookup fails; callers
    /// define their own fallback, typically re-anchoring to the last known
    /// good node.
    pub fn update_pose_from_tf(&mut self, source: &dyn TransformSource) -> bool {
        if !self.initialized {
            return false;
        }
        let Some(pose) = source.lookup() else {
            log::debug!("transform lookup failed; keeping the last anchored position");
            return false;
        };

        self.current.pose = pose;
        self.anchor(pose.position);
        self.heading.add_point(pose.position);
        self.heading.try_correct(&self.tf);
        true
    }

    /// Snap the whole estimate back onto a known node (fallback after a
    /// failed transform lookup during cancellation).
    pub fn reanchor_to(&mut self, id: NodeId) -> LocalizeResult<()> {
        let geo = self.nodes.geo(id).ok_or(LocalizeError::NodeNotFound(id))?;
        let planar = self.nodes.planar(id).ok_or(LocalizeError::NodeNotFound(id))?;
        self.current.id = id;
        self.current.geo = geo;
        self.current.pose.position = planar;
        Ok(())
    }

    fn anchor(&mut self, planar: PlanarPoint) {
        if let Some(id) = self.nodes.nearest_node(planar) {
            self.current.id = id;
        }
    }

    // ── Distance checks ───────────────────────────────────────────────────

    /// Planar distance in metres from a named node to a geographic point.
    ///
    /// Used to validate target proximity and to decide whether graph
    /// planning can be skipped. Distances beyond the configured maximum are
    /// logged: the point is far off the mapped network.
    pub fn check_distance(&self, id: NodeId, lat: f64, lon: f64) -> LocalizeResult<f64> {
        let point = self.nodes.projection().to_planar(GeoPoint::new(lat, lon));
        self.check_distance_planar(id, point)
    }

    /// [`check_distance`](Self::check_distance) for a planar query point.
    pub fn check_distance_planar(&self, id: NodeId, point: PlanarPoint) -> LocalizeResult<f64> {
        let node = self.nodes.planar(id).ok_or(LocalizeError::NodeNotFound(id))?;
        let distance = node.distance(point);
        if distance > self.config.interpolation_max_distance_m {
            log::warn!(
                "{id} is {distance:.1} m from the query point; far off the mapped network"
            );
        }
        Ok(distance)
    }
}
