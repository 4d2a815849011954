//! Planar (local map frame) point and pose types.

/// A point in the shared local planar frame, metres.
///
/// All planar coordinates in one planning session share a single origin
/// fixed at graph-build time (see
/// [`LocalProjection`](crate::projection::LocalProjection)).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlanarPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanarPoint {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: PlanarPoint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Direction from `self` toward `other` in radians in `[-pi, pi]`.
    ///
    /// Identical points return `0.0`.
    #[inline]
    pub fn bearing(self, other: PlanarPoint) -> f64 {
        if self == other {
            return 0.0;
        }
        (other.y - self.y).atan2(other.x - self.x)
    }
}

impl std::fmt::Display for PlanarPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Pose ──────────────────────────────────────────────────────────────────────

/// A planar position plus a heading angle in radians.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    pub position: PlanarPoint,
    pub yaw: f64,
}

impl Pose {
    #[inline]
    pub fn new(position: PlanarPoint, yaw: f64) -> Self {
        Self { position, yaw }
    }
}

/// Normalize an angle to `[-pi, pi]`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % std::f64::consts::TAU;
    if a > std::f64::consts::PI {
        a -= std::f64::consts::TAU;
    } else if a < -std::f64::consts::PI {
        a += std::f64::consts::TAU;
    }
    a
}
