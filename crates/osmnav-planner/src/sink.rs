//! Route-consumer observer.

use osmnav_core::Pose;

use crate::route::Route;

/// External collaborator notified of planning results.
///
/// Implementations typically forward to a message transport; both hooks
/// default to no-ops so consumers implement only what they visualize.
/// Callbacks must not re-enter the orchestrator.
pub trait RouteSink: Send {
    /// A plan, skip-decision, or cancellation-replan succeeded.
    fn route_published(&mut self, route: &Route) {
        let _ = route;
    }

    /// The edge between two route poses was cancelled (visualization hook
    /// for the refused segment).
    fn segment_refused(&mut self, from: Pose, to: Pose) {
        let _ = (from, to);
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl RouteSink for NoopSink {}
