//! Error types for the Product synchronizer.

use thiserror::Error;

use crate::framework::{SyncError, TransportError};

/// Errors that can occur during product operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    /// The product is not in the local collection.
    #[error("Product not found: {0}")]
    NotFound(String),

    /// The product data provided is invalid (e.g., an empty title).
    #[error("Product validation error: {0}")]
    ValidationError(String),

    /// The remote API call failed. `message` is the one shown to the user.
    #[error("{message}: {cause}")]
    RemoteFailure {
        message: String,
        cause: TransportError,
    },

    /// An error occurred while communicating with the synchronizer task.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<SyncError> for ProductError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::NotFound(id) => ProductError::NotFound(id),
            SyncError::Validation(msg) => ProductError::ValidationError(msg),
            SyncError::Transport { message, source } => ProductError::RemoteFailure {
                message,
                cause: source,
            },
            other @ (SyncError::ActorClosed | SyncError::ActorDropped) => {
                ProductError::ActorCommunicationError(other.to_string())
            }
        }
    }
}
