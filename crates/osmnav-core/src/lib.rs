//! `osmnav-core`: foundational types for the `osmnav` planning stack.
//!
//! This crate is a dependency of every other `osmnav-*` crate. It
//! intentionally has no `osmnav-*` dependencies and minimal external ones
//! (only `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module         | Contents                                          |
//! |----------------|---------------------------------------------------|
//! | [`ids`]        | `NodeId`                                          |
//! | [`geo`]        | `GeoPoint`, haversine distance, initial bearing   |
//! | [`planar`]     | `PlanarPoint`, `Pose`                             |
//! | [`projection`] | `LocalProjection` (geodesic to planar and back)   |
//! | [`config`]     | `NavConfig`, `GpsConfig`, `OriginMode`            |
//! | [`error`]      | `CoreError`, `CoreResult`                         |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.      |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod planar;
pub mod projection;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{GpsConfig, NavConfig, OriginMode};
pub use error::{CoreError, CoreResult};
pub use geo::GeoPoint;
pub use ids::NodeId;
pub use planar::{PlanarPoint, Pose};
pub use projection::LocalProjection;
