//! Spatial-subsystem error type.

use thiserror::Error;

use osmnav_core::NodeId;

/// Errors produced by `osmnav-spatial` map loading and graph construction.
///
/// Search failures have their own type ([`RouteError`](crate::RouteError))
/// so callers can branch on `NoPathFound` without pattern-matching through
/// loader variants.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("map source is empty or yields no usable ways")]
    EmptyMap,

    #[error("failed to load map data: {0}")]
    MapLoad(String),

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for SpatialError {
    fn from(e: csv::Error) -> Self {
        SpatialError::MapLoad(e.to_string())
    }
}

pub type SpatialResult<T> = Result<T, SpatialError>;
