//! OSM PBF extraction, enabled with the `osm` Cargo feature.
//!
//! # Usage
//!
//! ```ignore
//! use std::path::Path;
//! use osmnav_spatial::{RoadGraph, WayTypeFilter, osm::extract_map};
//!
//! let map = extract_map(Path::new("bratislava.osm.pbf"))?;
//! let graph = RoadGraph::build(&map, &WayTypeFilter::only(["footway", "path"]))?;
//! ```
//!
//! # What is extracted
//!
//! Every way carrying a `highway` tag becomes a [`MapWay`] whose `way_type`
//! is the tag value; way-type filtering happens later at graph build, so
//! one extraction can serve differently filtered graphs. Only nodes
//! referenced by at least one kept way are emitted.

use std::path::Path;

use osmpbf::{Element, ElementReader};
use rustc_hash::{FxHashMap, FxHashSet};

use osmnav_core::GeoPoint;

use crate::map::{MapData, MapNode, MapWay};
use crate::{SpatialError, SpatialResult};

/// Scan an OSM PBF file into [`MapData`].
///
/// # Errors
///
/// [`SpatialError::MapLoad`] on parse errors, [`SpatialError::Io`] on file
/// errors, [`SpatialError::EmptyMap`] when no `highway` way exists at all.
pub fn extract_map(path: &Path) -> SpatialResult<MapData> {
    let reader =
        ElementReader::from_path(path).map_err(|e| SpatialError::MapLoad(e.to_string()))?;

    let mut all_nodes: FxHashMap<i64, GeoPoint> = FxHashMap::default();
    let mut ways: Vec<MapWay> = Vec::new();

    reader
        .for_each(|elem| match elem {
            Element::Node(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::DenseNode(n) => {
                all_nodes.insert(n.id(), GeoPoint::new(n.lat(), n.lon()));
            }
            Element::Way(w) => {
                // Collect tags eagerly so &str lifetimes don't escape the
                // closure.
                let tags: Vec<(&str, &str)> = w.tags().collect();
                let highway = tags.iter().find(|(k, _)| *k == "highway").map(|(_, v)| *v);

                if let Some(way_type) = highway {
                    ways.push(MapWay {
                        nodes: w.refs().collect(),
                        way_type: way_type.to_string(),
                        oneway: is_oneway(&tags),
                    });
                }
            }
            _ => {}
        })
        .map_err(|e| SpatialError::MapLoad(e.to_string()))?;

    if ways.is_empty() {
        return Err(SpatialError::EmptyMap);
    }

    // Emit only way-referenced nodes; the rest of the planet file is noise.
    let referenced: FxHashSet<i64> = ways.iter().flat_map(|w| w.nodes.iter().copied()).collect();
    let nodes: Vec<MapNode> = referenced
        .into_iter()
        .filter_map(|id| all_nodes.get(&id).map(|&point| MapNode { id, point }))
        .collect();

    log::info!(
        "extracted {} highway way(s) over {} node(s) from {}",
        ways.len(),
        nodes.len(),
        path.display()
    );

    Ok(MapData { nodes, ways })
}

/// `oneway=yes/1/true` marks a way as traversable in list order only.
fn is_oneway(tags: &[(&str, &str)]) -> bool {
    tags.iter()
        .any(|(k, v)| *k == "oneway" && matches!(*v, "yes" | "1" | "true"))
}
