//! Transports implementing [`RemoteResource`](crate::framework::RemoteResource).

pub mod http;

pub use http::*;
