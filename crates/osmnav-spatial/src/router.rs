//! Shortest-path search and the cached last solution.
//!
//! # Determinism
//!
//! Identical graph state and (source, target) pair always yield an
//! identical path: costs are integer millimetres (no float ties) and the
//! heap orders equal costs by ascending `NodeId`, so the relaxation order
//! is fully defined. Cancellation logic depends on this — it indexes into
//! "the current path" by position.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use thiserror::Error;

use osmnav_core::NodeId;

use crate::graph::RoadGraph;

// ── RouteError ────────────────────────────────────────────────────────────────

/// Search failures, separable so callers can react differently: an
/// unreachable target is an expected condition to report, anything else is
/// a caller bug to surface.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The target is unreachable in the current (possibly edge-pruned)
    /// graph. The previous solution is left untouched.
    #[error("no path from {from} to {to} in the current graph")]
    NoPathFound { from: NodeId, to: NodeId },

    /// A node id outside the graph was supplied; covers every search
    /// failure that is not plain unreachability.
    #[error("unknown node {0} in search request")]
    UnknownNode(NodeId),

    /// `solution()` was called before any successful search.
    #[error("no path has been computed yet")]
    NoSolution,
}

// ── PathFinder ────────────────────────────────────────────────────────────────

/// Dijkstra search over a [`RoadGraph`], retaining the last successful
/// solution for incremental consumption (cancellation lookups, truncated
/// re-reads) without recomputation.
#[derive(Default)]
pub struct PathFinder {
    last: Option<Vec<NodeId>>,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the minimum-weight path from `source` to `target`.
    ///
    /// Returns the node sequence (source first, target last) and stores it
    /// as the current solution. A failed search leaves the previous
    /// solution untouched.
    pub fn find_shortest_path(
        &mut self,
        graph: &RoadGraph,
        source: NodeId,
        target: NodeId,
    ) -> Result<&[NodeId], RouteError> {
        let n = graph.node_count();
        if source.index() >= n {
            return Err(RouteError::UnknownNode(source));
        }
        if target.index() >= n {
            return Err(RouteError::UnknownNode(target));
        }

        // dist[v]: best known cost (mm) to reach v; u64::MAX = unreached.
        let mut dist = vec![u64::MAX; n];
        let mut prev = vec![NodeId::INVALID; n];
        dist[source.index()] = 0;

        // Min-heap via Reverse; the NodeId component breaks cost ties
        // toward the lowest id.
        let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
        heap.push(Reverse((0, source)));

        while let Some(Reverse((cost, node))) = heap.pop() {
            if node == target {
                break;
            }
            // Stale entry: a cheaper route to this node was already settled.
            if cost > dist[node.index()] {
                continue;
            }

            // Strict improvement only: with the deterministic pop order,
            // the first route to reach a cost wins ties, and predecessor
            // pointers stay acyclic even across zero-weight edges.
            for &(neighbor, weight_mm) in graph.neighbors(node) {
                let next_cost = cost.saturating_add(weight_mm);
                if next_cost < dist[neighbor.index()] {
                    dist[neighbor.index()] = next_cost;
                    prev[neighbor.index()] = node;
                    heap.push(Reverse((next_cost, neighbor)));
                }
            }
        }

        if dist[target.index()] == u64::MAX {
            return Err(RouteError::NoPathFound { from: source, to: target });
        }

        // Walk predecessor pointers back from the target.
        let mut path = vec![target];
        let mut cursor = target;
        while cursor != source {
            cursor = prev[cursor.index()];
            path.push(cursor);
        }
        path.reverse();

        log::debug!(
            "shortest path {source} -> {target}: {} node(s), {:.1} m",
            path.len(),
            dist[target.index()] as f64 / 1_000.0
        );

        self.last = Some(path);
        Ok(self.last.as_deref().unwrap_or(&[]))
    }

    /// Idempotent re-read of the last successful search result.
    pub fn solution(&self) -> Result<&[NodeId], RouteError> {
        self.last.as_deref().ok_or(RouteError::NoSolution)
    }

    /// Prefix of the last solution ending at the first occurrence of
    /// `node`; the whole path when `node` is the target.
    pub fn solution_through(&self, node: NodeId) -> Result<&[NodeId], RouteError> {
        let path = self.solution()?;
        match path.iter().position(|&p| p == node) {
            Some(end) => Ok(&path[..=end]),
            None => Err(RouteError::UnknownNode(node)),
        }
    }
}
