//! `osmnav-localize`: graph-anchored localization.
//!
//! Fuses satellite fixes, odometry, and frame-transform lookups into one
//! current-node-anchored position estimate, and keeps the broadcast
//! transform's orientation honest by comparing consecutive observed
//! waypoints.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                |
//! |---------------|---------------------------------------------------------|
//! | [`position`]  | `PositionEstimator`, `CurrentPosition`, GPS gating      |
//! | [`heading`]   | `HeadingCorrector`: two-waypoint bearing correction     |
//! | [`broadcast`] | `TfHandle` guarded cell + `TfBroadcaster` loop          |
//! | [`error`]     | `LocalizeError`, `LocalizeResult<T>`                    |
//!
//! # Anchoring
//!
//! Every position source ends the same way: the continuous estimate is
//! snapped to the nearest node of the immutable
//! [`NodeTable`][osmnav_spatial::NodeTable], so downstream planning always
//! starts from a valid node id.

pub mod broadcast;
pub mod error;
pub mod heading;
pub mod position;


pub use broadcast::{FramePublisher, TfBroadcaster, TfHandle, TransformState};
pub use error::{LocalizeError, LocalizeResult};
pub use heading::HeadingCorrector;
pub use position::{
    CovarianceGate, CurrentPosition, GpsFix, GpsGate, PositionEstimator, TransformSource,
};
