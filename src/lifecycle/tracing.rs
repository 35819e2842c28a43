//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`); the
//! synchronizer tags its events with `entity_type` instead.
//!
//! - **Configurable log levels** via the `RUST_LOG` environment variable
//! - **Hierarchical spans** from `#[instrument]` on the client methods
//!
//! ## What Gets Traced
//!
//! - **Lifecycle**: Synchronizer started, shutdown with final collection size
//! - **Operations**: Refresh, Create, Update, Delete as they are dispatched (`debug`)
//! - **Applied results**: `Refreshed`, `Created`, `Updated`, `Deleted` with id and size (`info`)
//! - **Failures and discards**: the operation-level message plus the transport cause (`warn`)
//!
//! ## Usage Examples
//!
//! ```bash
//! # Applied mutations only
//! RUST_LOG=info cargo run
//!
//! # Payloads and HTTP requests
//! RUST_LOG=debug cargo run
//!
//! # Only the transport
//! RUST_LOG=collection_sync::remote=debug cargo run
//! ```
//!
//! **With `RUST_LOG=info`**:
//!
//! ```text
//! INFO Synchronizer started entity_type="Record"
//! INFO Refreshed entity_type="Record" size=30
//! INFO Created entity_type="Record" id=195 size=31
//! WARN Failed to update product entity_type="Record" operation=Update error=Remote error: ...
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
