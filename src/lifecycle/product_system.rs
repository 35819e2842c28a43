use tracing::{error, info};

use crate::clients::ProductClient;
use crate::config::SyncConfig;
use crate::framework::RemoteResource;
use crate::model::Record;
use crate::remote::HttpRemote;

/// The runtime orchestrator for the product synchronizer.
///
/// `ProductSystem` is responsible for:
/// - **Wiring**: Building the remote transport from configuration
/// - **Lifecycle Management**: Spawning the control task and stopping it
///
/// # Example
///
/// ```ignore
/// let system = ProductSystem::new(&SyncConfig::load(None)?)?;
///
/// system.product_client.refresh().await?;
/// let added = system.product_client.add_product("Widget").await?;
///
/// // Gracefully shut down when done
/// system.shutdown().await?;
/// ```
pub struct ProductSystem {
    /// Client for the product synchronizer
    pub product_client: ProductClient,

    /// Task handle of the control task (used for graceful shutdown)
    handle: tokio::task::JoinHandle<()>,
}

impl ProductSystem {
    /// Creates a system talking to the REST API named in `config`.
    pub fn new(config: &SyncConfig) -> Result<Self, anyhow::Error> {
        let remote = HttpRemote::<Record>::from_config(config)?;
        info!(base_url = %config.base_url, resource = %config.resource, "Starting product system");
        Ok(Self::with_remote(remote, config))
    }

    /// Creates a system over any remote, e.g. a [`MockRemote`](crate::framework::mock::MockRemote).
    pub fn with_remote<R: RemoteResource<Record>>(remote: R, config: &SyncConfig) -> Self {
        let (actor, product_client) = crate::products::new(remote, config);
        let handle = tokio::spawn(actor.run());

        Self {
            product_client,
            handle,
        }
    }

    /// Gracefully shuts down the synchronizer.
    ///
    /// Dropping the client closes the request channel; the control task then
    /// applies any round trips still in flight and exits. Clones of the client
    /// held elsewhere keep the task alive, so drop them first.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if the task shut down cleanly
    /// - `Err(String)` if the task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.product_client);

        if let Err(e) = self.handle.await {
            error!("Synchronizer task failed: {:?}", e);
            return Err(format!("Synchronizer task failed: {:?}", e));
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
