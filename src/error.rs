//! Error taxonomy for registry operations and the admin surface.

use thiserror::Error;

/// Errors surfaced by registry operations.
///
/// The hot path reports misses and store failures as responses rather
/// than error values, and observer publishes never produce one of
/// these; delivery failures there are swallowed at the source.
#[derive(Debug, Error)]
pub enum MockHostError {
    /// A create/update request is missing a required field.
    #[error("Missing required field: {0}")]
    Validation(&'static str),

    /// An opaque endpoint id did not decode to a key present in the store.
    #[error("Invalid endpoint ID")]
    InvalidEndpointId,

    /// The underlying store call failed or returned malformed data.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<serde_json::Error> for MockHostError {
    fn from(err: serde_json::Error) -> Self {
        MockHostError::Store(StoreError::Malformed(err))
    }
}

/// Failures originating in the key-value store layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store client has not been connected (or was disconnected).
    #[error("store is not connected")]
    NotConnected,

    /// The backend reported a failure.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A stored value was not a valid serialized record.
    #[error("malformed stored record: {0}")]
    Malformed(#[from] serde_json::Error),
}
