//! Product-specific wiring of the synchronizer.

pub mod error;

pub use error::*;

use crate::clients::ProductClient;
use crate::config::SyncConfig;
use crate::framework::{RemoteResource, SyncActor};
use crate::model::Record;

/// Creates a new Product synchronizer and its client.
pub fn new<R: RemoteResource<Record>>(
    remote: R,
    config: &SyncConfig,
) -> (SyncActor<Record, R>, ProductClient) {
    let (actor, generic_client) = SyncActor::new(config.buffer_size, remote, config.labels());
    let client = ProductClient::new(generic_client);

    (actor, client)
}
