use crate::framework::{RemoteEntity, Snapshot, SyncClient, SyncError};
use async_trait::async_trait;
use tokio::sync::watch;

/// Trait for resource-specific clients to inherit the common operations.
///
/// This trait reduces boilerplate by providing default implementations for
/// operations whose payload needs no domain conversion, like `refresh` and `delete`.
#[async_trait]
pub trait CollectionClient<T: RemoteEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic SyncClient.
    fn inner(&self) -> &SyncClient<T>;

    /// Map synchronizer errors to the specific resource error type.
    fn map_error(e: SyncError) -> Self::Error;

    /// Re-fetch the whole collection. Returns the new record count.
    #[tracing::instrument(skip(self))]
    async fn refresh(&self) -> Result<usize, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().refresh().await.map_err(Self::map_error)
    }

    /// Delete a record by ID. Returns the id the server confirmed.
    #[tracing::instrument(skip(self))]
    async fn delete(&self, id: T::Id) -> Result<T::Id, Self::Error> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await.map_err(Self::map_error)
    }

    /// The latest Collection and Request State.
    fn snapshot(&self) -> Snapshot<T> {
        self.inner().snapshot()
    }

    /// Change notifications for the presentation layer.
    fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.inner().subscribe()
    }
}
