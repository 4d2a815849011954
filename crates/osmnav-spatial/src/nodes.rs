//! The immutable per-node half of the network.
//!
//! `NodeTable` holds, indexed by `NodeId`: the geographic point, the planar
//! point (every node projected through the ONE `LocalProjection` fixed at
//! build time, so all planar coordinates share a frame), the originating
//! source id, and the node's first build-time neighbor (used to derive an
//! initial bearing when none is supplied).
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) over the planar coordinates answers
//! nearest-node queries. Exact ties are broken toward the lowest id so the
//! query is deterministic.

use std::sync::Arc;

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use osmnav_core::{GeoPoint, LocalProjection, NodeId, PlanarPoint};

// ── R-tree entry ──────────────────────────────────────────────────────────────

/// Entry stored in the R-tree: a planar `[x, y]` point with its `NodeId`.
#[derive(Clone)]
struct NodeEntry {
    point: [f64; 2],
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NodeTable ─────────────────────────────────────────────────────────────────

/// Immutable node store plus spatial index.
///
/// Built once per map load by [`RoadGraph::build`] and shared via `Arc`;
/// the node set never changes afterwards, so readers need no lock.
///
/// [`RoadGraph::build`]: crate::RoadGraph::build
pub struct NodeTable {
    geo: Vec<GeoPoint>,
    planar: Vec<PlanarPoint>,
    /// Source (e.g. OSM) id of each node, kept for logging and diagnostics.
    source_ids: Vec<i64>,
    /// First adjacency entry of each node at build time; `INVALID` for
    /// isolated nodes. Frozen here so bearing derivation survives later
    /// edge cancellations.
    first_neighbor: Vec<NodeId>,
    projection: LocalProjection,
    rtree: RTree<NodeEntry>,
}

impl NodeTable {
    pub(crate) fn new(
        geo: Vec<GeoPoint>,
        source_ids: Vec<i64>,
        first_neighbor: Vec<NodeId>,
        projection: LocalProjection,
    ) -> Arc<Self> {
        let planar: Vec<PlanarPoint> = geo.iter().map(|&g| projection.to_planar(g)).collect();

        // Bulk load is O(N log N), faster than N inserts.
        let entries: Vec<NodeEntry> = planar
            .iter()
            .enumerate()
            .map(|(i, p)| NodeEntry {
                point: [p.x, p.y],
                id: NodeId(i as u32),
            })
            .collect();
        let rtree = RTree::bulk_load(entries);

        Arc::new(Self {
            geo,
            planar,
            source_ids,
            first_neighbor,
            projection,
            rtree,
        })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn len(&self) -> usize {
        self.geo.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geo.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.geo.len()
    }

    // ── Per-node accessors ────────────────────────────────────────────────

    pub fn geo(&self, id: NodeId) -> Option<GeoPoint> {
        self.geo.get(id.index()).copied()
    }

    pub fn planar(&self, id: NodeId) -> Option<PlanarPoint> {
        self.planar.get(id.index()).copied()
    }

    pub fn source_id(&self, id: NodeId) -> Option<i64> {
        self.source_ids.get(id.index()).copied()
    }

    /// Direction from `id` toward its first build-time neighbor, in the
    /// planar yaw frame, or `None` for isolated/unknown nodes. This is the
    /// "direction of the nearest edge" used when initializing without an
    /// explicit heading.
    pub fn initial_bearing(&self, id: NodeId) -> Option<f64> {
        let neighbor = *self.first_neighbor.get(id.index())?;
        if neighbor == NodeId::INVALID {
            return None;
        }
        Some(self.planar[id.index()].bearing(self.planar[neighbor.index()]))
    }

    /// The shared geodesic/planar converter for this network.
    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Id of the node with minimum planar distance to `point`.
    ///
    /// Exact distance ties are broken toward the lowest id, so repeated
    /// calls with the same table and point always agree. `None` only for an
    /// empty table.
    pub fn nearest_node(&self, point: PlanarPoint) -> Option<NodeId> {
        let query = [point.x, point.y];
        let mut iter = self.rtree.nearest_neighbor_iter_with_distance_2(&query);
        let (first, best_d2) = iter.next()?;

        let mut best = first.id;
        for (entry, d2) in iter {
            if d2 > best_d2 {
                break;
            }
            if entry.id < best {
                best = entry.id;
            }
        }
        Some(best)
    }

    /// [`nearest_node`](Self::nearest_node) for a geographic query point.
    pub fn nearest_node_geo(&self, point: GeoPoint) -> Option<NodeId> {
        self.nearest_node(self.projection.to_planar(point))
    }
}
