//! REST transport for the synchronizer.
//!
//! Endpoint layout, relative to `base_url`:
//!
//! | Operation | Request | Response |
//! |---|---|---|
//! | list   | `GET {resource}`         | `{ "<resource>": [record, ...] }` |
//! | create | `POST {resource}/add`    | created record |
//! | update | `PUT {resource}/{id}`    | updated record |
//! | delete | `DELETE {resource}/{id}` | `{ "id": ..., "isDeleted": true, ... }` |
//!
//! Any non-2xx status is a failure, whatever the body says.

use std::fmt::Display;
use std::marker::PhantomData;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::SyncConfig;
use crate::framework::{RemoteEntity, RemoteResource, TransportError};

/// Body of a delete confirmation. Only the echoed id matters.
#[derive(Deserialize)]
struct DeleteConfirmation<I> {
    id: I,
    #[serde(rename = "isDeleted", default)]
    is_deleted: bool,
}

/// A [`RemoteResource`] speaking JSON over HTTP.
pub struct HttpRemote<T> {
    client: Client,
    base_url: String,
    resource: String,
    _entity: PhantomData<fn() -> T>,
}

impl<T> Clone for HttpRemote<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            resource: self.resource.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> HttpRemote<T> {
    /// Uses a default `reqwest` client (no timeout of its own).
    pub fn new(base_url: impl Into<String>, resource: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url, resource)
    }

    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resource: resource.into().trim_matches('/').to_string(),
            _entity: PhantomData,
        }
    }

    /// Builds the client from configuration, applying the optional request timeout.
    pub fn from_config(config: &SyncConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, &config.base_url, &config.resource))
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.resource)
    }

    /// The id is pushed as one percent-encoded path segment, so `?`, `#` and `/`
    /// in a text id stay part of it.
    fn item_url(&self, id: &impl Display) -> Result<Url, TransportError> {
        let invalid = |reason: String| {
            TransportError::Network(format!("invalid url {}: {}", self.collection_url(), reason))
        };
        let mut url = Url::parse(&self.collection_url()).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base".to_string()))?
            .push(&id.to_string());
        Ok(url)
    }
}

/// Sends the request; any transport failure or non-2xx status is an error.
async fn send(request: RequestBuilder) -> Result<Response, TransportError> {
    let response = request
        .send()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TransportError::Remote {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn decode<D: DeserializeOwned>(response: Response) -> Result<D, TransportError> {
    let bytes = response
        .bytes()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))
}

#[async_trait]
impl<T> RemoteResource<T> for HttpRemote<T>
where
    T: RemoteEntity + DeserializeOwned,
    T::Id: DeserializeOwned,
    T::Fields: Serialize,
    T::Patch: Serialize,
{
    async fn list(&self) -> Result<Vec<T>, TransportError> {
        let url = self.collection_url();
        debug!(%url, "GET");
        let mut envelope: Map<String, Value> = decode(send(self.client.get(&url)).await?).await?;
        let items = envelope.remove(&self.resource).ok_or_else(|| {
            TransportError::Decode(format!("missing `{}` in response", self.resource))
        })?;
        serde_json::from_value(items).map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn create(&self, fields: T::Fields) -> Result<T, TransportError> {
        let url = format!("{}/add", self.collection_url());
        debug!(%url, ?fields, "POST");
        decode(send(self.client.post(&url).json(&fields)).await?).await
    }

    async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, TransportError> {
        let url = self.item_url(&id)?;
        debug!(%url, ?patch, "PUT");
        decode(send(self.client.put(url).json(&patch)).await?).await
    }

    async fn delete(&self, id: T::Id) -> Result<T::Id, TransportError> {
        let url = self.item_url(&id)?;
        debug!(%url, "DELETE");
        let confirmation: DeleteConfirmation<T::Id> =
            decode(send(self.client.delete(url)).await?).await?;
        debug!(id = %confirmation.id, is_deleted = confirmation.is_deleted, "Delete confirmed");
        Ok(confirmation.id)
    }
}
