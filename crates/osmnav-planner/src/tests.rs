//! Unit tests for osmnav-planner.
//!
//! All tests run against hand-crafted map data with a recording sink and a
//! switchable fake transform source; no transport, no map files.

#[cfg(test)]
mod helpers {
    use std::sync::{Arc, Mutex};

    use osmnav_core::{GeoPoint, NavConfig, Pose};
    use osmnav_localize::{PositionEstimator, TfHandle, TransformSource};
    use osmnav_spatial::{MapData, MapNode, MapWay, RoadGraph, WayTypeFilter};

    use crate::{Route, RouteOrchestrator, RouteSink};

    /// Three colinear nodes 0.001 deg (~111 m) apart; interned 0, 1, 2.
    /// One corridor: a single cancellation disconnects the far end.
    pub fn line_map() -> MapData {
        MapData {
            nodes: vec![
                MapNode { id: 101, point: GeoPoint::new(0.000, 0.0) },
                MapNode { id: 102, point: GeoPoint::new(0.001, 0.0) },
                MapNode { id: 103, point: GeoPoint::new(0.002, 0.0) },
            ],
            ways: vec![MapWay {
                nodes: vec![101, 102, 103],
                way_type: "footway".to_string(),
                oneway: false,
            }],
        }
    }

    /// A square: two routes between opposite corners, so one cancellation
    /// still leaves a detour.
    ///
    /// ```text
    /// 101 ── 102          interned: 0 ── 1
    ///  │      │                     │    │
    /// 103 ── 104                    3 ── 2
    /// ```
    pub fn square_map() -> MapData {
        MapData {
            nodes: vec![
                MapNode { id: 101, point: GeoPoint::new(0.000, 0.000) },
                MapNode { id: 102, point: GeoPoint::new(0.000, 0.001) },
                MapNode { id: 103, point: GeoPoint::new(0.001, 0.000) },
                MapNode { id: 104, point: GeoPoint::new(0.001, 0.001) },
            ],
            ways: vec![
                MapWay {
                    nodes: vec![101, 102, 104],
                    way_type: "footway".to_string(),
                    oneway: false,
                },
                MapWay {
                    nodes: vec![101, 103, 104],
                    way_type: "footway".to_string(),
                    oneway: false,
                },
            ],
        }
    }

    /// Sink recording every published route and refused segment.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub routes: Arc<Mutex<Vec<Route>>>,
        pub refused: Arc<Mutex<Vec<(Pose, Pose)>>>,
    }

    impl RouteSink for RecordingSink {
        fn route_published(&mut self, route: &Route) {
            self.routes.lock().unwrap().push(route.clone());
        }
        fn segment_refused(&mut self, from: Pose, to: Pose) {
            self.refused.lock().unwrap().push((from, to));
        }
    }

    /// Transform source whose answer tests can swap at runtime.
    #[derive(Clone, Default)]
    pub struct SwitchableTf(pub Arc<Mutex<Option<Pose>>>);

    impl TransformSource for SwitchableTf {
        fn lookup(&self) -> Option<Pose> {
            *self.0.lock().unwrap()
        }
    }

    pub struct Fixture {
        pub orchestrator: RouteOrchestrator<RecordingSink>,
        pub sink: RecordingSink,
        pub tf_answer: Arc<Mutex<Option<Pose>>>,
    }

    pub fn fixture(map: MapData) -> Fixture {
        let config = NavConfig::default();
        let graph = RoadGraph::build(&map, &WayTypeFilter::any()).unwrap();
        let estimator = Arc::new(Mutex::new(PositionEstimator::new(
            Arc::clone(graph.nodes()),
            config.clone(),
            TfHandle::new(),
        )));

        let sink = RecordingSink::default();
        let tf = SwitchableTf::default();
        let tf_answer = Arc::clone(&tf.0);

        let orchestrator =
            RouteOrchestrator::new(graph, estimator, Box::new(tf), sink.clone(), config);
        Fixture { orchestrator, sink, tf_answer }
    }

    /// Fixture with the estimator already initialized at the origin node.
    pub fn initialized_fixture(map: MapData) -> Fixture {
        let f = fixture(map);
        f.orchestrator
            .estimator()
            .lock()
            .unwrap()
            .initialize_at(0.0, 0.0)
            .unwrap();
        f
    }
}

// ── Initialization gating ─────────────────────────────────────────────────────

#[cfg(test)]
mod gating {
    use osmnav_core::{PlanarPoint, Pose};

    use super::helpers::{fixture, line_map};
    use crate::PlanOutcome;

    #[test]
    fn requests_before_initialization_return_not_init() {
        let f = fixture(line_map());
        let edges_before = f.orchestrator.edge_count();

        assert_eq!(f.orchestrator.handle_goal_request(0.002, 0.0), PlanOutcome::NotInit);
        assert_eq!(
            f.orchestrator.handle_plan_request(
                Pose::new(PlanarPoint::new(0.0, 0.0), 0.0),
                Pose::new(PlanarPoint::new(0.0, 200.0), 0.0),
            ),
            PlanOutcome::NotInit
        );
        assert_eq!(f.orchestrator.handle_cancel_request(0), PlanOutcome::NotInit);

        // The graph was never touched.
        assert_eq!(f.orchestrator.edge_count(), edges_before);
        assert!(f.sink.routes.lock().unwrap().is_empty());
    }
}

// ── Planning ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod planning {
    use osmnav_core::{PlanarPoint, Pose};

    use super::helpers::{initialized_fixture, line_map};
    use crate::PlanOutcome;

    #[test]
    fn geographic_goal_plans_through_the_graph() {
        let f = initialized_fixture(line_map());
        let route = f.orchestrator.plan_to_geo(0.002, 0.0).unwrap();

        // Three node poses plus the literal goal pose.
        assert_eq!(route.len(), 4);
        assert_eq!(f.orchestrator.last_route(), Some(route.clone()));
        assert_eq!(*f.sink.routes.lock().unwrap(), vec![route]);
    }

    #[test]
    fn goal_pose_is_appended_even_off_graph() {
        let f = initialized_fixture(line_map());
        // Goal offset ~50 m east of node 2: still resolves to node 2, and
        // the literal goal must be the final waypoint.
        let route = f.orchestrator.plan_to_geo(0.002, 0.00045).unwrap();
        let last = *route.poses().last().unwrap();
        let node2_y = 0.002_f64.to_radians() * 6_371_000.0; // ~222 m north
        assert!((last.position.y - node2_y).abs() < 5.0);
        assert!(last.position.x > 40.0);
    }

    #[test]
    fn nearby_goal_skips_the_graph() {
        let f = initialized_fixture(line_map());
        let start = Pose::new(PlanarPoint::new(0.0, 0.0), 0.0);
        let goal = Pose::new(PlanarPoint::new(1.0, 0.5), 0.0);

        let route = f.orchestrator.plan_between(start, goal).unwrap();
        assert_eq!(route.poses(), &[start, goal]);

        // A direct route is published like any other.
        assert_eq!(f.sink.routes.lock().unwrap().len(), 1);
    }

    #[test]
    fn distant_goal_uses_the_graph() {
        let f = initialized_fixture(line_map());
        let start = Pose::new(PlanarPoint::new(0.0, 0.0), 0.0);
        // Node 2's planar position, ~222 m north of the origin.
        let goal = Pose::new(PlanarPoint::new(0.0, 0.002_f64.to_radians() * 6_371_000.0), 0.0);

        let route = f.orchestrator.plan_between(start, goal).unwrap();
        // Nodes 0, 1, 2 plus the goal pose.
        assert_eq!(route.len(), 4);
    }

    #[test]
    fn failed_plan_keeps_previous_route_published() {
        let f = initialized_fixture(line_map());
        let first = f.orchestrator.plan_to_geo(0.002, 0.0).unwrap();

        // Disconnect the far end, then ask again: the plan fails but the
        // stored route stays.
        assert_eq!(f.orchestrator.handle_cancel_request(1), PlanOutcome::PlanFailed);
        assert_eq!(f.orchestrator.last_route(), Some(first));
    }

    #[test]
    fn republish_re_emits_the_stored_route() {
        let f = initialized_fixture(line_map());
        f.orchestrator.plan_to_geo(0.002, 0.0).unwrap();
        f.orchestrator.republish();
        assert_eq!(f.sink.routes.lock().unwrap().len(), 2);
    }
}

// ── Cancellation ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod cancellation {
    use osmnav_core::NodeId;

    use super::helpers::{initialized_fixture, line_map, square_map};
    use crate::{PlanError, PlanOutcome};

    #[test]
    fn bad_index_mutates_nothing() {
        let f = initialized_fixture(line_map());
        f.orchestrator.plan_to_geo(0.002, 0.0).unwrap();
        let edges_before = f.orchestrator.edge_count();

        // Route node path has 3 nodes: index 5 is out of range, and index
        // 2 (the last node) has no outgoing segment either.
        for bad in [5usize, 2] {
            let err = f.orchestrator.cancel(bad).unwrap_err();
            assert!(matches!(err, PlanError::BadIndex { .. }), "got {err:?}");
        }

        assert_eq!(f.orchestrator.edge_count(), edges_before);
        assert!(f.sink.refused.lock().unwrap().is_empty());
    }

    #[test]
    fn cancel_before_any_plan_is_a_plan_failure() {
        let f = initialized_fixture(line_map());
        assert_eq!(f.orchestrator.handle_cancel_request(0), PlanOutcome::PlanFailed);
    }

    #[test]
    fn cancelled_edge_is_removed_and_replanned_around() {
        let f = initialized_fixture(square_map());
        let first = f.orchestrator.plan_to_geo(0.001, 0.001).unwrap();
        assert_eq!(first.len(), 4); // 0 -> 1 -> 2 plus goal
        let edges_before = f.orchestrator.edge_count();

        // Cancel the segment leaving path position 1 (edge 1 <-> 2).
        let replanned = f.orchestrator.cancel(1).unwrap();

        assert_eq!(f.orchestrator.edge_count(), edges_before - 2);
        // Transform is unavailable: the estimator snapped back to the node
        // at the cancelled index.
        let estimator = f.orchestrator.estimator();
        assert_eq!(estimator.lock().unwrap().current().unwrap().id, NodeId(1));
        // Detour: 1 -> 0 -> 3 -> 2 plus the goal pose.
        assert_eq!(replanned.len(), 5);

        // The refused segment went to the sink before removal.
        assert_eq!(f.sink.refused.lock().unwrap().len(), 1);
        // Both the original plan and the replan were published.
        assert_eq!(f.sink.routes.lock().unwrap().len(), 2);
    }

    #[test]
    fn cancel_uses_transform_position_when_available() {
        let f = initialized_fixture(square_map());
        f.orchestrator.plan_to_geo(0.001, 0.001).unwrap();

        // The transform tree reports the agent still near node 0.
        let node0 = {
            let estimator = f.orchestrator.estimator();
            let guard = estimator.lock().unwrap();
            let nodes = std::sync::Arc::clone(guard.nodes());
            nodes.planar(NodeId(0)).unwrap()
        };
        *f.tf_answer.lock().unwrap() = Some(osmnav_core::Pose::new(node0, 0.0));

        let replanned = f.orchestrator.cancel(1).unwrap();
        // Replanned from node 0: 0 -> 3 -> 2 plus goal.
        assert_eq!(replanned.len(), 4);
        let estimator = f.orchestrator.estimator();
        assert_eq!(estimator.lock().unwrap().current().unwrap().id, NodeId(0));
    }

    #[test]
    fn repeated_cancellation_of_same_segment_is_idempotent_on_the_graph() {
        let f = initialized_fixture(square_map());
        f.orchestrator.plan_to_geo(0.001, 0.001).unwrap();
        f.orchestrator.cancel(1).unwrap();
        let edges_after_first = f.orchestrator.edge_count();

        // The replanned path is 1 -> 0 -> 3 -> 2; cancelling index 0 now
        // removes edge 1 <-> 0, not the already-deleted one.
        f.orchestrator.cancel(0).unwrap_err(); // node 1 is now isolated
        assert_eq!(f.orchestrator.edge_count(), edges_after_first - 2);
    }
}
