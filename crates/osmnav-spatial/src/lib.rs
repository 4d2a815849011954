//! `osmnav-spatial`: road network, spatial indexing, and shortest-path search.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`map`]     | `MapData` source model, `WayTypeFilter`, CSV loading      |
//! | [`nodes`]   | `NodeTable`: per-node geo/planar data + R-tree snapping   |
//! | [`graph`]   | `RoadGraph`: adjacency lists, build, live edge removal    |
//! | [`router`]  | `PathFinder` (Dijkstra), `RouteError`                     |
//! | [`osm`]     | `extract_map` from OSM PBF (feature = `"osm"` only)       |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Mutation contract
//!
//! The network is split in two so each half can carry its own sharing story:
//!
//! - [`NodeTable`] is immutable after build and shared via `Arc`; anchoring
//!   a position estimate to a node never needs a lock.
//! - [`RoadGraph`] holds the adjacency lists, which may only shrink (edge
//!   cancellation) and therefore live behind whatever lock serializes
//!   planning operations.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                  |
//! |---------|---------------------------------------------------------|
//! | `osm`   | Enables OSM PBF extraction via the `osmpbf` crate.      |
//! | `serde` | Derives `Serialize`/`Deserialize` on public core types. |

pub mod error;
pub mod graph;
pub mod map;
pub mod nodes;
pub mod router;

#[cfg(feature = "osm")]
pub mod osm;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use graph::RoadGraph;
pub use map::{MapData, MapNode, MapWay, WayTypeFilter, load_map_csv, load_map_readers};
pub use nodes::NodeTable;
pub use router::{PathFinder, RouteError};
