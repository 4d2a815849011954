//! Planning error type and request-level outcome codes.

use thiserror::Error;

use osmnav_localize::LocalizeError;
use osmnav_spatial::{RouteError, SpatialError};

// ── PlanError ─────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PlanError {
    /// No valid position exists yet; complete initialization first.
    #[error("position is not initialized; call an initialize service first")]
    NotInitialized,

    /// Cancellation index does not name an edge of the current route.
    /// Nothing was mutated.
    #[error("cancellation index {index} out of range for a route of {len} node(s)")]
    BadIndex { index: usize, len: usize },

    /// Search failure; carries the `NoPathFound` vs `UnknownNode`
    /// distinction for callers that branch on it.
    #[error("route search failed: {0}")]
    Routing(#[from] RouteError),

    #[error(transparent)]
    Localize(#[from] LocalizeError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type PlanResult<T> = Result<T, PlanError>;

// ── PlanOutcome ───────────────────────────────────────────────────────────────

/// Request-level result codes handed back to the transport layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlanOutcome {
    Ok,
    PlanFailed,
    NotInit,
    BadIndex,
}

impl From<&PlanError> for PlanOutcome {
    fn from(error: &PlanError) -> Self {
        match error {
            PlanError::NotInitialized
            | PlanError::Localize(LocalizeError::NotInitialized) => PlanOutcome::NotInit,
            PlanError::BadIndex { .. } => PlanOutcome::BadIndex,
            PlanError::Routing(_) | PlanError::Localize(_) | PlanError::Spatial(_) => {
                PlanOutcome::PlanFailed
            }
        }
    }
}
