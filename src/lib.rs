#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Collection Sync
//!
//! > **An in-memory mirror of a remote REST collection.**
//!
//! This crate keeps a local, ordered list of records consistent with a remote REST
//! resource over an unreliable network. Local state changes only after the server
//! confirms a change, and callers can observe both the records and the status of the
//! latest request.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Server-confirmed mutations
//!
//! - **refresh** replaces the whole collection with the server's copy.
//! - **create** appends the record the server returns, with the id the server assigned.
//! - **update** replaces the matching record in place.
//! - **delete** removes the record whose id the server confirms.
//!
//! A failed round trip never touches the collection. It sets the request state to
//! `Error(message)` and the synchronizer stays usable; calling the operation again is
//! the retry.
//!
//! ### One owner, many round trips
//!
//! The collection is owned by a single control task ([`SyncActor`](framework::SyncActor)).
//! Round trips run as separate tasks and report back to it, so operations never wait
//! for each other and the collection needs no lock. Responses may arrive out of order;
//! when two operations race on the same record, the last response wins.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: The generic control task, client handle and transport seam.
//! - **Key items**: [`RemoteEntity`](framework::RemoteEntity),
//!   [`RemoteResource`](framework::RemoteResource),
//!   [`SyncActor`](framework::SyncActor), [`SyncClient`](framework::SyncClient).
//!
//! ### 2. The Data ([`model`])
//! - **Role**: [`Record`](model::Record), an opaque JSON object with a server-assigned
//!   [`RecordId`](model::RecordId).
//!
//! ### 3. The Wire ([`remote`])
//! - **Role**: [`HttpRemote`](remote::HttpRemote), the REST transport built on `reqwest`.
//!
//! ### 4. The Interface ([`clients`], [`products`])
//! - **Role**: Domain clients such as [`ProductClient`](clients::ProductClient) with their own
//!   error types.
//!
//! ### 5. The Orchestrator ([`lifecycle`], [`config`])
//! - **Role**: Configuration loading, tracing setup, spawning and shutting down.
//! - **Key items**: [`ProductSystem`](lifecycle::ProductSystem),
//!   [`SyncConfig`](config::SyncConfig).
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Walk through refresh/add/update/delete against dummyjson.com
//! RUST_LOG=info cargo run
//!
//! # Point at another API
//! COLLECTION_SYNC_BASE_URL=http://localhost:8080 cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```

pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod products;
pub mod remote;
