//! # Framework Errors
//!
//! Two layers of errors live here:
//!
//! - [`TransportError`] describes why a round trip to the remote resource failed.
//!   It is produced by a [`RemoteResource`](crate::framework::RemoteResource) implementation.
//! - [`SyncError`] is what a caller of a synchronizer operation receives. It wraps a
//!   `TransportError` together with the operation-level message that was published
//!   as the `error(message)` request state.

/// Why a call to the remote resource failed.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum TransportError {
    /// The request never reached the remote resource, or no response came back.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote resource answered with a non-success status code.
    #[error("Remote error: HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The response body was not valid JSON or lacked an expected field.
    #[error("Decode error: {0}")]
    Decode(String),
}

/// Errors returned by [`SyncClient`](crate::framework::SyncClient) operations.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SyncError {
    #[error("Synchronizer closed")]
    ActorClosed,
    #[error("Synchronizer dropped response channel")]
    ActorDropped,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{message}: {source}")]
    Transport {
        message: String,
        #[source]
        source: TransportError,
    },
}

impl SyncError {
    /// The transport failure behind this error, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            SyncError::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}
