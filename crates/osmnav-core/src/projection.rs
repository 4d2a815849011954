//! Geodesic to planar conversion anchored at a fixed origin.
//!
//! The projection is a local equirectangular approximation:
//!
//! ```text
//! x = R * (lon - lon0) * cos(lat0)
//! y = R * (lat - lat0)
//! ```
//!
//! Within the extent of one map (a few kilometres) the planar distance
//! between two projected points tracks the haversine distance to well under
//! one percent, which is all the planner needs. No higher-order projection
//! correction is applied.

use crate::geo::{EARTH_RADIUS_M, GeoPoint};
use crate::planar::PlanarPoint;

/// Stateless converter between geographic and local planar coordinates.
///
/// One `LocalProjection` is created per graph build and shared by every
/// component of a planning session, so all planar coordinates live in a
/// single frame. All operations are pure.
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocalProjection {
    origin: GeoPoint,
    /// Cached `cos(lat0)`; recomputed only on construction.
    cos_origin_lat: f64,
}

impl LocalProjection {
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            cos_origin_lat: origin.lat.to_radians().cos(),
        }
    }

    /// The geographic point that maps to planar `(0, 0)`.
    #[inline]
    pub fn origin(&self) -> GeoPoint {
        self.origin
    }

    /// Project a geographic point into the local planar frame.
    #[inline]
    pub fn to_planar(&self, point: GeoPoint) -> PlanarPoint {
        let x = EARTH_RADIUS_M * (point.lon - self.origin.lon).to_radians() * self.cos_origin_lat;
        let y = EARTH_RADIUS_M * (point.lat - self.origin.lat).to_radians();
        PlanarPoint::new(x, y)
    }

    /// Exact inverse of [`to_planar`](Self::to_planar).
    #[inline]
    pub fn to_geo(&self, point: PlanarPoint) -> GeoPoint {
        let lat = self.origin.lat + (point.y / EARTH_RADIUS_M).to_degrees();
        let lon = self.origin.lon
            + (point.x / (EARTH_RADIUS_M * self.cos_origin_lat)).to_degrees();
        GeoPoint::new(lat, lon)
    }
}
