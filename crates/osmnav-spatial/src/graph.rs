//! The mutable half of the network: adjacency lists with live edge removal.
//!
//! # Mutation contract
//!
//! After [`RoadGraph::build`] the node set is fixed and the edge set may
//! only shrink, via [`remove_edge`](RoadGraph::remove_edge). There is no way
//! to add an edge back; a blocked segment stays blocked for the lifetime of
//! the planning session.
//!
//! # Edge weights
//!
//! Weights are geodesic distances in integer **millimetres** (`u64`).
//! Integer costs give the search a total order with no float ties, so path
//! selection is exactly reproducible.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use osmnav_core::{GeoPoint, LocalProjection, NodeId};

use crate::map::{MapData, WayTypeFilter};
use crate::nodes::NodeTable;
use crate::{SpatialError, SpatialResult};

/// Directed road graph over an immutable [`NodeTable`].
pub struct RoadGraph {
    nodes: Arc<NodeTable>,
    /// Outgoing `(neighbor, weight_mm)` lists indexed by `NodeId`.
    adjacency: Vec<Vec<(NodeId, u64)>>,
    edge_count: usize,
}

impl std::fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoadGraph")
            .field("node_count", &self.adjacency.len())
            .field("edge_count", &self.edge_count)
            .finish()
    }
}

impl RoadGraph {
    // ── Construction ──────────────────────────────────────────────────────

    /// Build a graph from parsed map data, keeping only ways accepted by
    /// `filter`. Nodes referenced solely by rejected ways are not interned,
    /// so every node in the table lies on at least one usable way.
    ///
    /// The projection origin is the first node retained; every planar
    /// coordinate in the session derives from it.
    ///
    /// # Errors
    ///
    /// [`SpatialError::EmptyMap`] when the source is empty or the filter
    /// rejects every way.
    pub fn build(map: &MapData, filter: &WayTypeFilter) -> SpatialResult<RoadGraph> {
        if map.is_empty() {
            return Err(SpatialError::EmptyMap);
        }

        let source_points: FxHashMap<i64, GeoPoint> =
            map.nodes.iter().map(|n| (n.id, n.point)).collect();

        // Intern nodes in first-seen order over accepted ways.
        let mut intern: FxHashMap<i64, NodeId> = FxHashMap::default();
        let mut geo: Vec<GeoPoint> = Vec::new();
        let mut source_ids: Vec<i64> = Vec::new();
        let mut segments: Vec<(NodeId, NodeId, u64, bool)> = Vec::new();
        let mut dropped_refs = 0usize;

        for way in &map.ways {
            if !filter.accepts(&way.way_type) {
                continue;
            }

            let mut prev: Option<NodeId> = None;
            for &source_id in &way.nodes {
                let Some(&point) = source_points.get(&source_id) else {
                    dropped_refs += 1;
                    prev = None; // broken chain: don't bridge across the gap
                    continue;
                };

                let id = *intern.entry(source_id).or_insert_with(|| {
                    let id = NodeId(geo.len() as u32);
                    geo.push(point);
                    source_ids.push(source_id);
                    id
                });

                if let Some(from) = prev {
                    // No self-loop edges; duplicate consecutive refs happen
                    // in sloppy sources.
                    if from != id {
                        let weight_mm =
                            (geo[from.index()].distance_m(geo[id.index()]) * 1_000.0).round()
                                as u64;
                        segments.push((from, id, weight_mm, way.oneway));
                    }
                }
                prev = Some(id);
            }
        }

        if geo.is_empty() || segments.is_empty() {
            return Err(SpatialError::EmptyMap);
        }
        if dropped_refs > 0 {
            log::warn!("map source references {dropped_refs} unknown node id(s); segments skipped");
        }

        let mut adjacency: Vec<Vec<(NodeId, u64)>> = vec![Vec::new(); geo.len()];
        let mut edge_count = 0usize;
        for (from, to, weight_mm, oneway) in segments {
            adjacency[from.index()].push((to, weight_mm));
            edge_count += 1;
            if !oneway {
                adjacency[to.index()].push((from, weight_mm));
                edge_count += 1;
            }
        }

        let first_neighbor: Vec<NodeId> = adjacency
            .iter()
            .map(|out| out.first().map_or(NodeId::INVALID, |&(n, _)| n))
            .collect();

        let projection = LocalProjection::new(geo[0]);
        let nodes = NodeTable::new(geo, source_ids, first_neighbor, projection);

        log::info!(
            "road graph built: {} nodes, {} directed edges",
            nodes.len(),
            edge_count
        );

        Ok(RoadGraph { nodes, adjacency, edge_count })
    }

    // ── Dimensions & lookups ──────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Shared handle to the immutable node store.
    pub fn nodes(&self) -> &Arc<NodeTable> {
        &self.nodes
    }

    /// Current outgoing `(neighbor, weight_mm)` entries of `id`; empty for
    /// unknown ids.
    pub fn neighbors(&self, id: NodeId) -> &[(NodeId, u64)] {
        self.adjacency.get(id.index()).map_or(&[], Vec::as_slice)
    }

    pub fn contains_edge(&self, from: NodeId, to: NodeId) -> bool {
        self.neighbors(from).iter().any(|&(n, _)| n == to)
    }

    // ── Cancellation ──────────────────────────────────────────────────────

    /// Remove every directed edge between `a` and `b`, in both directions.
    ///
    /// Silent no-op when no such edge exists, so repeated cancellation of
    /// the same segment is idempotent.
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) {
        let mut removed = 0usize;
        for (from, to) in [(a, b), (b, a)] {
            if let Some(out) = self.adjacency.get_mut(from.index()) {
                let before = out.len();
                out.retain(|&(n, _)| n != to);
                removed += before - out.len();
            }
        }
        self.edge_count -= removed;
        if removed > 0 {
            log::info!("removed {removed} directed edge(s) between {a} and {b}");
        } else {
            log::debug!("remove_edge {a} <-> {b}: no such edge, nothing to do");
        }
    }
}
