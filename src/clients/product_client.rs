//! # Product Client
//!
//! Provides a high-level API for the product collection.
//! It wraps a `SyncClient<Record>` and exposes the title-oriented calls of a
//! product form: add by title, rename, delete.
use crate::clients::collection_client::CollectionClient;
use crate::framework::{SyncClient, SyncError};
use crate::model::{titled, Fields, Record, RecordId};
use crate::products::ProductError;
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Client for the product synchronizer.
#[derive(Clone)]
pub struct ProductClient {
    inner: SyncClient<Record>,
}

impl ProductClient {
    pub fn new(inner: SyncClient<Record>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CollectionClient<Record> for ProductClient {
    type Error = ProductError;

    fn inner(&self) -> &SyncClient<Record> {
        &self.inner
    }

    fn map_error(e: SyncError) -> Self::Error {
        ProductError::from(e)
    }
}

impl ProductClient {
    /// Add a product with just a title. Returns the record the server created.
    #[instrument(skip(self))]
    pub async fn add_product(&self, title: &str) -> Result<Record, ProductError> {
        debug!("Sending request");
        self.inner.create(titled(title)).await.map_err(ProductError::from)
    }

    /// Add a product with arbitrary fields; a non-empty `title` is still required.
    #[instrument(skip(self))]
    pub async fn add_product_with(&self, fields: Fields) -> Result<Record, ProductError> {
        debug!("Sending request");
        self.inner.create(fields).await.map_err(ProductError::from)
    }

    /// Rename a product. The id must be in the local collection.
    #[instrument(skip(self))]
    pub async fn update_title(&self, id: RecordId, title: &str) -> Result<Record, ProductError> {
        debug!("Sending request");
        self.inner.update(id, titled(title)).await.map_err(ProductError::from)
    }

    /// Send a partial update with any fields.
    #[instrument(skip(self))]
    pub async fn update_product(
        &self,
        id: RecordId,
        patch: Fields,
    ) -> Result<Record, ProductError> {
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    /// Delete a product. Returns the id the server confirmed.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: RecordId) -> Result<RecordId, ProductError> {
        debug!("Sending request");
        self.delete(id).await
    }

    /// The current product list, in collection order.
    pub fn products(&self) -> Vec<Record> {
        self.inner.snapshot().records
    }

    pub fn product(&self, id: &RecordId) -> Option<Record> {
        self.inner.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SyncConfig;
    use crate::framework::mock::{MockRemote, RecordedCall};
    use crate::framework::{RequestState, TransportError};
    use serde_json::json;

    fn record(id: u64, title: &str) -> Record {
        Record::from_value(json!({ "id": id, "title": title })).unwrap()
    }

    fn start(mock: &MockRemote<Record>) -> ProductClient {
        let (actor, client) = crate::products::new(mock.clone(), &SyncConfig::default());
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn test_add_product_sends_title() {
        let mock = MockRemote::<Record>::new();
        mock.expect_create().return_ok(record(195, "C"));
        let client = start(&mock);

        let added = client.add_product("C").await.unwrap();
        assert_eq!(added.id(), &RecordId::from(195));
        assert_eq!(client.products(), vec![record(195, "C")]);

        match mock.take_calls().as_slice() {
            [RecordedCall::Create(fields)] => assert_eq!(fields, &titled("C")),
            calls => panic!("Expected one create call, got {:?}", calls),
        }
        mock.verify();
    }

    #[tokio::test]
    async fn test_add_product_rejects_empty_title() {
        let mock = MockRemote::<Record>::new();
        let client = start(&mock);

        let err = client.add_product("").await.unwrap_err();
        assert_eq!(err, ProductError::ValidationError("title is required".into()));
        assert_eq!(mock.call_count(), 0);
        assert_eq!(client.snapshot().state, RequestState::Idle);
    }

    #[tokio::test]
    async fn test_update_title_unknown_id() {
        let mock = MockRemote::<Record>::new();
        let client = start(&mock);

        let err = client.update_title(RecordId::from(5), "X").await.unwrap_err();
        assert_eq!(err, ProductError::NotFound("5".into()));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_remote_failure_maps_to_product_error() {
        let mock = MockRemote::<Record>::new();
        mock.expect_list().return_err(TransportError::Remote { status: 500, body: "boom".into() });
        let client = start(&mock);

        let err = client.refresh().await.unwrap_err();
        assert_eq!(
            err,
            ProductError::RemoteFailure {
                message: "Failed to fetch products".into(),
                cause: TransportError::Remote { status: 500, body: "boom".into() },
            }
        );
        assert_eq!(client.snapshot().state.error(), Some("Failed to fetch products"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_rename_and_delete() {
        let mock = MockRemote::<Record>::new();
        mock.expect_list().return_ok(vec![record(1, "A"), record(2, "B")]);
        mock.expect_update(RecordId::from(2)).return_ok(record(2, "B2"));
        mock.expect_delete(RecordId::from(1)).return_ok(RecordId::from(1));
        let client = start(&mock);

        assert_eq!(client.refresh().await.unwrap(), 2);
        client.update_title(RecordId::from(2), "B2").await.unwrap();
        assert_eq!(client.product(&RecordId::from(2)), Some(record(2, "B2")));

        assert_eq!(client.delete_product(RecordId::from(1)).await.unwrap(), RecordId::from(1));
        assert_eq!(client.products(), vec![record(2, "B2")]);
        mock.verify();
    }
}
