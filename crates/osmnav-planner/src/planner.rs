//! The route orchestrator.
//!
//! Ties the pieces together: decides whether a request needs graph search
//! at all, runs the path finder, expands node paths into pose routes,
//! publishes them, and handles edge-cancellation replanning.
//!
//! # Lock order
//!
//! `state` (graph + finder + stored target/route) before `estimator`,
//! never the reverse. Sensor callbacks that only touch the estimator take
//! a single lock and cannot deadlock against a running plan.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use osmnav_core::{GeoPoint, NavConfig, NodeId, Pose};
use osmnav_localize::{PositionEstimator, TransformSource};
use osmnav_spatial::{NodeTable, PathFinder, RoadGraph, RouteError, SpatialError};

use crate::route::Route;
use crate::sink::RouteSink;
use crate::{PlanError, PlanOutcome, PlanResult};

// ── Target ────────────────────────────────────────────────────────────────────

/// The destination chosen for the current goal. Replaced wholesale on the
/// next planning request, never mutated incrementally.
#[derive(Copy, Clone, Debug)]
pub struct Target {
    /// Nearest graph node to the requested goal.
    pub id: NodeId,
    pub geo: GeoPoint,
    /// The literal goal pose (appended to every route; the goal need not
    /// coincide with a graph node).
    pub pose: Pose,
}

// ── PlanState ─────────────────────────────────────────────────────────────────

/// Everything one planning-or-cancellation operation touches, guarded as a
/// unit: a search and an edge removal must never interleave on the same
/// graph.
struct PlanState {
    graph: RoadGraph,
    finder: PathFinder,
    target: Option<Target>,
    route: Option<Route>,
}

// ── RouteOrchestrator ─────────────────────────────────────────────────────────

/// Owns the mutable planning state and drives it from transport-level
/// requests. One instance per planning session; no process-wide state.
pub struct RouteOrchestrator<S: RouteSink> {
    nodes: Arc<NodeTable>,
    state: Mutex<PlanState>,
    estimator: Arc<Mutex<PositionEstimator>>,
    tf_source: Box<dyn TransformSource + Send + Sync>,
    sink: Mutex<S>,
    config: NavConfig,
}

impl<S: RouteSink> RouteOrchestrator<S> {
    pub fn new(
        graph: RoadGraph,
        estimator: Arc<Mutex<PositionEstimator>>,
        tf_source: Box<dyn TransformSource + Send + Sync>,
        sink: S,
        config: NavConfig,
    ) -> Self {
        if let Err(e) = config.validate() {
            log::warn!("navigation config failed validation: {e}");
        }
        let nodes = Arc::clone(graph.nodes());
        Self {
            nodes,
            state: Mutex::new(PlanState {
                graph,
                finder: PathFinder::new(),
                target: None,
                route: None,
            }),
            estimator,
            tf_source,
            sink: Mutex::new(sink),
            config,
        }
    }

    // ── Planning ──────────────────────────────────────────────────────────

    /// Plan between two planar poses.
    ///
    /// The start pose is trusted as the agent's position (odometry-style
    /// overwrite). When start and goal are closer than the footway width
    /// plus the anchor offset, the graph is skipped entirely and a direct
    /// two-point route is emitted.
    pub fn plan_between(&self, start: Pose, goal: Pose) -> PlanResult<Route> {
        let (current_id, anchor_offset) = {
            let mut est = self.lock_estimator();
            if !est.is_initialized() {
                return Err(PlanError::NotInitialized);
            }
            est.set_position_from_odom(start.position);
            let id = est.current()?.id;
            let offset = est.check_distance_planar(id, start.position)?;
            (id, offset)
        };

        let direct = start.position.distance(goal.position);
        if direct < self.config.footway_width_m + anchor_offset {
            log::info!(
                "start and goal {direct:.2} m apart, within footway clearance; skipping graph search"
            );
            let route = Route::direct(start, goal);
            self.lock_state().route = Some(route.clone());
            self.publish(&route);
            return Ok(route);
        }

        let target_id = self
            .nodes
            .nearest_node(goal.position)
            .ok_or(SpatialError::EmptyMap)?;
        {
            let est = self.lock_estimator();
            est.check_distance_planar(target_id, goal.position)?;
        }
        let target = Target {
            id: target_id,
            geo: self.nodes.projection().to_geo(goal.position),
            pose: goal,
        };

        self.search_and_publish(current_id, target)
    }

    /// Plan to a geographic goal from the best currently available
    /// position (refreshed from the transform tree when possible).
    pub fn plan_to_geo(&self, lat: f64, lon: f64) -> PlanResult<Route> {
        let goal_geo = GeoPoint::new(lat, lon);
        let goal_planar = self.nodes.projection().to_planar(goal_geo);
        let target_id = self
            .nodes
            .nearest_node(goal_planar)
            .ok_or(SpatialError::EmptyMap)?;

        let (current_id, current_planar) = {
            let mut est = self.lock_estimator();
            if !est.is_initialized() {
                return Err(PlanError::NotInitialized);
            }
            if !est.update_pose_from_tf(self.tf_source.as_ref()) {
                log::debug!("transform refresh failed; planning from the last anchored position");
            }
            est.check_distance(target_id, lat, lon)?;
            let current = est.current()?;
            (current.id, current.pose.position)
        };

        let target = Target {
            id: target_id,
            geo: goal_geo,
            pose: Pose::new(goal_planar, current_planar.bearing(goal_planar)),
        };

        self.search_and_publish(current_id, target)
    }

    /// Run the finder and publish the expanded route. Shared tail of both
    /// planning entry points.
    fn search_and_publish(&self, source: NodeId, target: Target) -> PlanResult<Route> {
        let started = Instant::now();

        let route = {
            let mut state = self.lock_state();
            // Explicit field borrows so the borrow checker sees disjoint
            // access.
            let PlanState { graph, finder, target: stored_target, route: stored_route } =
                &mut *state;

            let ids = finder.find_shortest_path(graph, source, target.id)?;
            let route = Route::from_node_ids(&self.nodes, ids, target.pose);

            *stored_target = Some(target);
            *stored_route = Some(route.clone());
            route
        };

        log::info!(
            "planned {} -> {} ({} pose(s)) in {:?}",
            source,
            target.id,
            route.len(),
            started.elapsed()
        );
        self.publish(&route);
        Ok(route)
    }

    // ── Cancellation ──────────────────────────────────────────────────────

    /// Cancel the route edge at `index` and replan to the stored target.
    ///
    /// `index` addresses the previously computed node path: the edge
    /// between positions `index` and `index + 1` is removed. An index with
    /// no successor node is rejected as `BadIndex` without mutating the
    /// graph. When the transform tree cannot provide a fresh position, the
    /// estimate falls back to the node at the cancelled index rather than
    /// going stale.
    pub fn cancel(&self, index: usize) -> PlanResult<Route> {
        let started = Instant::now();
        let mut state = self.lock_state();

        {
            let est = self.lock_estimator();
            if !est.is_initialized() {
                return Err(PlanError::NotInitialized);
            }
        }

        let (from, to) = {
            let path = state.finder.solution()?;
            if index + 1 >= path.len() {
                return Err(PlanError::BadIndex { index, len: path.len() });
            }
            (path[index], path[index + 1])
        };

        if let (Some(pa), Some(pb)) = (self.nodes.planar(from), self.nodes.planar(to)) {
            let yaw = pa.bearing(pb);
            self.lock_sink()
                .segment_refused(Pose::new(pa, yaw), Pose::new(pb, yaw));
        }

        state.graph.remove_edge(from, to);

        let current_id = {
            let mut est = self.lock_estimator();
            if !est.update_pose_from_tf(self.tf_source.as_ref()) {
                // Last known good position: the node whose outgoing edge
                // was just cancelled.
                est.reanchor_to(from)?;
                log::info!("transform unavailable; re-anchored to {from}");
            }
            est.current()?.id
        };

        let target = state.target.ok_or(RouteError::NoSolution)?;

        let new_route = {
            let PlanState { graph, finder, route: stored_route, .. } = &mut *state;
            let ids = finder.find_shortest_path(graph, current_id, target.id)?;
            let route = Route::from_node_ids(&self.nodes, ids, target.pose);
            *stored_route = Some(route.clone());
            route
        };
        drop(state);

        log::info!(
            "replanned around cancelled segment {index} in {:?}",
            started.elapsed()
        );
        self.publish(&new_route);
        Ok(new_route)
    }

    // ── Request interface ─────────────────────────────────────────────────

    /// Transport-level goal request in geographic coordinates.
    pub fn handle_goal_request(&self, lat: f64, lon: f64) -> PlanOutcome {
        match self.plan_to_geo(lat, lon) {
            Ok(_) => PlanOutcome::Ok,
            Err(e) => {
                log::error!("planning request failed: {e}");
                PlanOutcome::from(&e)
            }
        }
    }

    /// Transport-level planning request in planar coordinates.
    pub fn handle_plan_request(&self, start: Pose, goal: Pose) -> PlanOutcome {
        match self.plan_between(start, goal) {
            Ok(_) => PlanOutcome::Ok,
            Err(e) => {
                log::error!("planning request failed: {e}");
                PlanOutcome::from(&e)
            }
        }
    }

    /// Transport-level cancellation request: zero-based index into the
    /// last-published route's node path.
    pub fn handle_cancel_request(&self, index: usize) -> PlanOutcome {
        match self.cancel(index) {
            Ok(_) => PlanOutcome::Ok,
            Err(e) => {
                log::error!("cancellation request failed: {e}");
                PlanOutcome::from(&e)
            }
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    /// The last successfully published route, if any.
    pub fn last_route(&self) -> Option<Route> {
        self.lock_state().route.clone()
    }

    /// Re-emit the stored route to the sink (drawing/refresh requests).
    pub fn republish(&self) {
        let route = self.lock_state().route.clone();
        if let Some(route) = route {
            self.publish(&route);
        }
    }

    /// Current directed edge count; shrinks as segments are cancelled.
    pub fn edge_count(&self) -> usize {
        self.lock_state().graph.edge_count()
    }

    /// Shared handle to the position estimator for sensor-callback wiring.
    pub fn estimator(&self) -> Arc<Mutex<PositionEstimator>> {
        Arc::clone(&self.estimator)
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn publish(&self, route: &Route) {
        self.lock_sink().route_published(route);
    }

    // A poisoned lock means a panicking writer; the state is plain data,
    // keep serving it.
    fn lock_state(&self) -> MutexGuard<'_, PlanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_estimator(&self) -> MutexGuard<'_, PositionEstimator> {
        self.estimator.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_sink(&self) -> MutexGuard<'_, S> {
        self.sink.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
