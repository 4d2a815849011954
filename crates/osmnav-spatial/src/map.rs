//! Map source model and CSV loading.
//!
//! The graph is built from [`MapData`], a loader-agnostic description of the
//! road/path network: a node list keyed by the source's own (64-bit) ids and
//! a way list referencing those ids. An external loader produces it; this
//! module ships a CSV loader, and the `osm` feature adds a PBF extractor.
//!
//! # CSV format
//!
//! Two tables. Nodes, one row per node:
//!
//! ```csv
//! id,lat,lon
//! 101,48.1486,17.1077
//! 102,48.1490,17.1081
//! ```
//!
//! Ways, one row per way, node ids space-separated in traversal order:
//!
//! ```csv
//! nodes,way_type,oneway
//! 101 102 103,footway,false
//! 103 107,steps,false
//! ```

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use osmnav_core::GeoPoint;

use crate::{SpatialError, SpatialResult};

// ── Source model ──────────────────────────────────────────────────────────────

/// A node as supplied by the map source, keyed by the source's own id.
#[derive(Debug, Clone)]
pub struct MapNode {
    pub id: i64,
    pub point: GeoPoint,
}

/// An ordered run of source node ids sharing one way type.
#[derive(Debug, Clone)]
pub struct MapWay {
    /// Source node ids in traversal order.
    pub nodes: Vec<i64>,
    /// Classification tag, matched against [`WayTypeFilter`].
    pub way_type: String,
    /// When `true`, segments are traversable in list order only.
    pub oneway: bool,
}

/// Parsed map source: everything [`RoadGraph::build`] needs.
///
/// [`RoadGraph::build`]: crate::RoadGraph::build
#[derive(Debug, Clone, Default)]
pub struct MapData {
    pub nodes: Vec<MapNode>,
    pub ways: Vec<MapWay>,
}

impl MapData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() || self.ways.is_empty()
    }
}

// ── WayTypeFilter ─────────────────────────────────────────────────────────────

/// Decides which ways contribute edges to the graph.
///
/// `any()` admits every way; `only([...])` restricts to the named types
/// (e.g. footways for a pedestrian robot).
#[derive(Debug, Clone, Default)]
pub struct WayTypeFilter {
    accepted: Option<Vec<String>>,
}

impl WayTypeFilter {
    /// Accept every way regardless of type.
    pub fn any() -> Self {
        Self { accepted: None }
    }

    /// Accept only ways whose type is in `types`.
    pub fn only<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            accepted: Some(types.into_iter().map(Into::into).collect()),
        }
    }

    pub fn accepts(&self, way_type: &str) -> bool {
        match &self.accepted {
            None => true,
            Some(types) => types.iter().any(|t| t == way_type),
        }
    }
}

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    id: i64,
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct WayRecord {
    /// Space-separated source node ids.
    nodes: String,
    way_type: String,
    oneway: bool,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load [`MapData`] from a pair of CSV files.
///
/// # Errors
///
/// [`SpatialError::MapLoad`] on malformed rows, [`SpatialError::Io`] on
/// file errors. An empty but well-formed source loads successfully; graph
/// construction rejects it.
pub fn load_map_csv(nodes_path: &Path, ways_path: &Path) -> SpatialResult<MapData> {
    let nodes = std::fs::File::open(nodes_path)?;
    let ways = std::fs::File::open(ways_path)?;
    load_map_readers(nodes, ways)
}

/// Like [`load_map_csv`] but accepts any `Read` sources.
///
/// Useful for testing (pass `std::io::Cursor`s) or loading from network
/// streams.
pub fn load_map_readers<N: Read, W: Read>(nodes: N, ways: W) -> SpatialResult<MapData> {
    let mut map = MapData::default();

    let mut node_reader = csv::Reader::from_reader(nodes);
    for record in node_reader.deserialize() {
        let NodeRecord { id, lat, lon } = record?;
        map.nodes.push(MapNode {
            id,
            point: GeoPoint::new(lat, lon),
        });
    }

    let mut way_reader = csv::Reader::from_reader(ways);
    for record in way_reader.deserialize() {
        let WayRecord { nodes, way_type, oneway } = record?;
        let ids = nodes
            .split_whitespace()
            .map(|s| {
                s.parse::<i64>()
                    .map_err(|e| SpatialError::MapLoad(format!("bad node id {s:?}: {e}")))
            })
            .collect::<SpatialResult<Vec<i64>>>()?;
        map.ways.push(MapWay { nodes: ids, way_type, oneway });
    }

    log::debug!(
        "loaded map source: {} nodes, {} ways",
        map.nodes.len(),
        map.ways.len()
    );
    Ok(map)
}
