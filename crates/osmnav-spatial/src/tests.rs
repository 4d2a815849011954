//! Unit tests for osmnav-spatial.
//!
//! All tests use hand-crafted map data so they run without any map file.

#[cfg(test)]
mod helpers {
    use osmnav_core::GeoPoint;

    use crate::{MapData, MapNode, MapWay, RoadGraph, WayTypeFilter};

    pub fn node(id: i64, lat: f64, lon: f64) -> MapNode {
        MapNode { id, point: GeoPoint::new(lat, lon) }
    }

    pub fn way(nodes: &[i64], way_type: &str) -> MapWay {
        MapWay {
            nodes: nodes.to_vec(),
            way_type: way_type.to_string(),
            oneway: false,
        }
    }

    /// Three colinear nodes chained by one footway:
    ///
    /// ```text
    /// 101 ── 102 ── 103     (source ids; interned as 0, 1, 2)
    /// ```
    ///
    /// Each segment is 0.001 deg of latitude, roughly 111 m.
    pub fn line_map() -> MapData {
        MapData {
            nodes: vec![
                node(101, 0.000, 0.0),
                node(102, 0.001, 0.0),
                node(103, 0.002, 0.0),
            ],
            ways: vec![way(&[101, 102, 103], "footway")],
        }
    }

    pub fn line_graph() -> RoadGraph {
        RoadGraph::build(&line_map(), &WayTypeFilter::any()).unwrap()
    }

    /// A square with two equal-cost routes between opposite corners:
    ///
    /// ```text
    /// 101 ── 102          interned: 0 ── 1
    ///  │      │                     │    │
    /// 103 ── 104                    3 ── 2
    /// ```
    pub fn square_map() -> MapData {
        MapData {
            nodes: vec![
                node(101, 0.000, 0.000),
                node(102, 0.000, 0.001),
                node(103, 0.001, 0.000),
                node(104, 0.001, 0.001),
            ],
            ways: vec![way(&[101, 102, 104], "footway"), way(&[101, 103, 104], "footway")],
        }
    }
}

// ── Map source & CSV loading ──────────────────────────────────────────────────

#[cfg(test)]
mod map {
    use std::io::Cursor;

    use crate::{SpatialError, WayTypeFilter, load_map_readers};

    const NODES_CSV: &str = "id,lat,lon\n101,48.1486,17.1077\n102,48.1490,17.1081\n";
    const WAYS_CSV: &str = "nodes,way_type,oneway\n101 102,footway,false\n";

    #[test]
    fn loads_well_formed_tables() {
        let map = load_map_readers(Cursor::new(NODES_CSV), Cursor::new(WAYS_CSV)).unwrap();
        assert_eq!(map.nodes.len(), 2);
        assert_eq!(map.ways.len(), 1);
        assert_eq!(map.ways[0].nodes, vec![101, 102]);
        assert_eq!(map.ways[0].way_type, "footway");
        assert!(!map.ways[0].oneway);
    }

    #[test]
    fn malformed_latitude_fails_fast() {
        let bad = "id,lat,lon\n101,not-a-number,17.1\n";
        let err = load_map_readers(Cursor::new(bad), Cursor::new(WAYS_CSV)).unwrap_err();
        assert!(matches!(err, SpatialError::MapLoad(_)), "got {err:?}");
    }

    #[test]
    fn malformed_way_node_id_fails_fast() {
        let bad = "nodes,way_type,oneway\n101 banana,footway,false\n";
        let err = load_map_readers(Cursor::new(NODES_CSV), Cursor::new(bad)).unwrap_err();
        assert!(matches!(err, SpatialError::MapLoad(_)), "got {err:?}");
    }

    #[test]
    fn filter_accepts_and_rejects() {
        let only = WayTypeFilter::only(["footway", "path"]);
        assert!(only.accepts("footway"));
        assert!(!only.accepts("motorway"));
        assert!(WayTypeFilter::any().accepts("motorway"));
    }
}

// ── Graph construction & mutation ─────────────────────────────────────────────

#[cfg(test)]
mod graph {
    use osmnav_core::NodeId;

    use super::helpers::{line_map, node, way};
    use crate::{MapData, RoadGraph, SpatialError, WayTypeFilter};

    #[test]
    fn empty_source_is_rejected() {
        let err = RoadGraph::build(&MapData::default(), &WayTypeFilter::any()).unwrap_err();
        assert!(matches!(err, SpatialError::EmptyMap));
    }

    #[test]
    fn all_ways_filtered_out_is_rejected() {
        let err = RoadGraph::build(&line_map(), &WayTypeFilter::only(["motorway"])).unwrap_err();
        assert!(matches!(err, SpatialError::EmptyMap));
    }

    #[test]
    fn line_topology() {
        let g = super::helpers::line_graph();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 4); // two segments, both directions

        // ~111 m per segment, stored in millimetres.
        let (_, w) = g.neighbors(NodeId(0))[0];
        assert!((110_000..113_000).contains(&(w / 1_000)), "weight {w} mm");
    }

    #[test]
    fn oneway_way_adds_single_direction() {
        let mut map = line_map();
        map.ways[0].oneway = true;
        let g = RoadGraph::build(&map, &WayTypeFilter::any()).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert!(g.contains_edge(NodeId(0), NodeId(1)));
        assert!(!g.contains_edge(NodeId(1), NodeId(0)));
    }

    #[test]
    fn self_loops_are_dropped() {
        let map = MapData {
            nodes: vec![node(101, 0.0, 0.0), node(102, 0.001, 0.0)],
            ways: vec![way(&[101, 101, 102], "footway")],
        };
        let g = RoadGraph::build(&map, &WayTypeFilter::any()).unwrap();
        assert_eq!(g.edge_count(), 2);
        assert!(!g.contains_edge(NodeId(0), NodeId(0)));
    }

    #[test]
    fn unknown_way_refs_break_the_chain() {
        let map = MapData {
            nodes: vec![node(101, 0.0, 0.0), node(103, 0.002, 0.0)],
            // 999 is not in the node table: 101 and 103 must NOT be bridged.
            ways: vec![way(&[101, 999, 103], "footway")],
        };
        let err = RoadGraph::build(&map, &WayTypeFilter::any()).unwrap_err();
        assert!(matches!(err, SpatialError::EmptyMap));
    }

    #[test]
    fn remove_edge_removes_both_directions() {
        let mut g = super::helpers::line_graph();
        g.remove_edge(NodeId(1), NodeId(2));
        assert!(!g.contains_edge(NodeId(1), NodeId(2)));
        assert!(!g.contains_edge(NodeId(2), NodeId(1)));
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn remove_missing_edge_is_a_noop() {
        let mut g = super::helpers::line_graph();
        let before = g.edge_count();
        g.remove_edge(NodeId(0), NodeId(2)); // not adjacent
        g.remove_edge(NodeId(0), NodeId(2)); // repeat: still fine
        assert_eq!(g.edge_count(), before);
    }

    #[test]
    fn removal_never_creates_reachability() {
        let mut g = super::helpers::line_graph();
        let reachable_before = g.contains_edge(NodeId(0), NodeId(2));
        g.remove_edge(NodeId(0), NodeId(1));
        assert_eq!(g.contains_edge(NodeId(0), NodeId(2)), reachable_before);
        assert!(g.neighbors(NodeId(0)).is_empty());
    }
}

// ── Node table & nearest queries ──────────────────────────────────────────────

#[cfg(test)]
mod nodes {
    use osmnav_core::{NodeId, PlanarPoint};

    use crate::{RoadGraph, WayTypeFilter};

    #[test]
    fn nearest_node_is_deterministic() {
        let g = super::helpers::line_graph();
        let nodes = g.nodes();
        let query = PlanarPoint::new(3.0, 40.0);
        let first = nodes.nearest_node(query).unwrap();
        for _ in 0..10 {
            assert_eq!(nodes.nearest_node(query), Some(first));
        }
    }

    #[test]
    fn nearest_tie_breaks_to_lowest_id() {
        let g = super::helpers::line_graph();
        let nodes = g.nodes();
        // Node 0 is at y=0, node 1 at y~111.19 m; the exact midpoint is
        // equidistant from both.
        let n0 = nodes.planar(NodeId(0)).unwrap();
        let n1 = nodes.planar(NodeId(1)).unwrap();
        let mid = PlanarPoint::new((n0.x + n1.x) / 2.0, (n0.y + n1.y) / 2.0);
        assert_eq!(nodes.nearest_node(mid), Some(NodeId(0)));
    }

    #[test]
    fn nearest_node_geo_matches_planar_query() {
        let g = super::helpers::line_graph();
        let nodes = g.nodes();
        let geo = nodes.geo(NodeId(2)).unwrap();
        assert_eq!(nodes.nearest_node_geo(geo), Some(NodeId(2)));
    }

    #[test]
    fn initial_bearing_points_along_first_edge() {
        let g = super::helpers::line_graph();
        let nodes = g.nodes();
        // Node 0's first neighbor is node 1, due +y of it: yaw pi/2.
        let bearing = nodes.initial_bearing(NodeId(0)).unwrap();
        assert!(
            (bearing - std::f64::consts::FRAC_PI_2).abs() < 1e-6,
            "bearing {bearing}"
        );
    }

    #[test]
    fn source_ids_are_preserved() {
        let g = RoadGraph::build(&super::helpers::line_map(), &WayTypeFilter::any()).unwrap();
        assert_eq!(g.nodes().source_id(NodeId(0)), Some(101));
        assert_eq!(g.nodes().source_id(NodeId(2)), Some(103));
    }
}

// ── Shortest-path search ──────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use osmnav_core::NodeId;

    use crate::{PathFinder, RoadGraph, RouteError, WayTypeFilter};

    #[test]
    fn line_path_and_cancellation() {
        let mut g = super::helpers::line_graph();
        let mut finder = PathFinder::new();

        let path = finder
            .find_shortest_path(&g, NodeId(0), NodeId(2))
            .unwrap()
            .to_vec();
        assert_eq!(path, vec![NodeId(0), NodeId(1), NodeId(2)]);

        g.remove_edge(NodeId(1), NodeId(2));
        let err = finder
            .find_shortest_path(&g, NodeId(0), NodeId(2))
            .unwrap_err();
        assert!(
            matches!(err, RouteError::NoPathFound { from, to }
                if from == NodeId(0) && to == NodeId(2)),
            "got {err:?}"
        );
    }

    #[test]
    fn failed_search_keeps_previous_solution() {
        let mut g = super::helpers::line_graph();
        let mut finder = PathFinder::new();
        finder.find_shortest_path(&g, NodeId(0), NodeId(2)).unwrap();

        g.remove_edge(NodeId(1), NodeId(2));
        let _ = finder.find_shortest_path(&g, NodeId(0), NodeId(2));

        // The last successful path is still readable.
        assert_eq!(
            finder.solution().unwrap(),
            &[NodeId(0), NodeId(1), NodeId(2)]
        );
    }

    #[test]
    fn equal_cost_paths_resolve_identically() {
        let map = super::helpers::square_map();
        let g = RoadGraph::build(&map, &WayTypeFilter::any()).unwrap();
        let mut finder = PathFinder::new();

        let first = finder
            .find_shortest_path(&g, NodeId(0), NodeId(2))
            .unwrap()
            .to_vec();
        for _ in 0..5 {
            let again = finder
                .find_shortest_path(&g, NodeId(0), NodeId(2))
                .unwrap()
                .to_vec();
            assert_eq!(first, again);
        }
        // Both corners cost the same; the lower-id route must win.
        assert_eq!(first, vec![NodeId(0), NodeId(1), NodeId(2)]);
    }

    #[test]
    fn path_to_adjacent_corner_takes_single_edge() {
        // Going around three sides of the square is never cheaper than the
        // one shared side, and the search must agree.
        let g = RoadGraph::build(&super::helpers::square_map(), &WayTypeFilter::any()).unwrap();
        let mut finder = PathFinder::new();
        let path = finder
            .find_shortest_path(&g, NodeId(0), NodeId(3))
            .unwrap();
        assert_eq!(path, &[NodeId(0), NodeId(3)]);
    }

    #[test]
    fn source_equals_target() {
        let g = super::helpers::line_graph();
        let mut finder = PathFinder::new();
        let path = finder
            .find_shortest_path(&g, NodeId(1), NodeId(1))
            .unwrap();
        assert_eq!(path, &[NodeId(1)]);
    }

    #[test]
    fn unknown_node_is_not_a_no_path() {
        let g = super::helpers::line_graph();
        let mut finder = PathFinder::new();
        let err = finder
            .find_shortest_path(&g, NodeId(0), NodeId(99))
            .unwrap_err();
        assert!(matches!(err, RouteError::UnknownNode(n) if n == NodeId(99)));
    }

    #[test]
    fn solution_before_any_search_is_an_error() {
        let finder = PathFinder::new();
        assert!(matches!(finder.solution(), Err(RouteError::NoSolution)));
    }

    #[test]
    fn solution_through_truncates_at_node() {
        let g = super::helpers::line_graph();
        let mut finder = PathFinder::new();
        finder.find_shortest_path(&g, NodeId(0), NodeId(2)).unwrap();

        assert_eq!(
            finder.solution_through(NodeId(1)).unwrap(),
            &[NodeId(0), NodeId(1)]
        );
        assert_eq!(finder.solution_through(NodeId(2)).unwrap().len(), 3);
        assert!(matches!(
            finder.solution_through(NodeId(7)),
            Err(RouteError::UnknownNode(_))
        ));
    }
}
