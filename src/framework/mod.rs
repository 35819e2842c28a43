//! Generic synchronizer framework.
//!
//! This module provides the building blocks for mirroring a remote REST collection
//! in memory: a control task that owns the records, a cloneable client that issues
//! operations, and a transport seam that performs the round trips.
//!
//! # Main Components
//!
//! - [`RemoteEntity`] - Trait that record types implement to be mirrored
//! - [`RemoteResource`] - Trait for the remote side (list/create/update/delete)
//! - [`SyncActor`] - The control task that owns the Collection and Request State
//! - [`SyncClient`] - Type-safe handle for issuing operations and observing snapshots
//! - [`SyncError`] / [`TransportError`] - Common error types
//!
//! # Testing
//!
//! See [`mock`] module for a remote that answers from expectations instead of the network.

pub mod core;
pub mod error;
pub mod mock;

// Re-export core types for convenience
pub use self::core::*;
