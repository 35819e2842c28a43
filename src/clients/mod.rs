//! Type-safe wrappers around [`SyncClient`](crate::framework::SyncClient).

pub mod collection_client;
pub mod product_client;

pub use collection_client::*;
pub use product_client::*;
