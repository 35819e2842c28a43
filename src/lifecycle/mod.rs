//! Runtime orchestration and lifecycle management.
//!
//! This module contains the infrastructure for running the synchronizer:
//!
//! - **Lifecycle management**: Starting the control task and shutting it down
//! - **Observability setup**: Initializing tracing and logging
//!
//! # Main Components
//!
//! - [`ProductSystem`] - Spawns the product synchronizer against a remote and owns its task
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod product_system;
pub mod tracing;

pub use product_system::*;
pub use self::tracing::*;
