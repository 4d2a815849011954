//! Base error type.
//!
//! Sub-crates define their own error enums and either convert into
//! `CoreError` via `From` impls or wrap it as one variant; both patterns are
//! used, whichever keeps error sites clean.

use thiserror::Error;

use crate::NodeId;

/// Errors shared across the `osmnav-*` crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),
}

/// Shorthand result type.
pub type CoreResult<T> = Result<T, CoreError>;
