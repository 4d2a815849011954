//! Localization error type.

use thiserror::Error;

use osmnav_core::NodeId;

#[derive(Debug, Error)]
pub enum LocalizeError {
    /// No valid position exists yet; complete initialization first.
    #[error("position is not initialized")]
    NotInitialized,

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    /// The node table is empty; nothing to anchor to.
    #[error("network has no nodes to anchor to")]
    EmptyNetwork,
}

pub type LocalizeResult<T> = Result<T, LocalizeError>;
