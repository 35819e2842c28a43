//! Pure data structures implementing the [`RemoteEntity`](crate::framework::RemoteEntity) trait.

pub mod record;

pub use record::*;
