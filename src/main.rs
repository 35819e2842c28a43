//! # Collection Sync demo
//!
//! Walks through the four operations against the configured API:
//! 1.  Fetch the product list.
//! 2.  Add a product by title.
//! 3.  Rename the first product.
//! 4.  Delete the first product.
//!
//! Usage: `collection-sync [config.yaml]`

use std::path::PathBuf;

use collection_sync::clients::CollectionClient;
use collection_sync::config::SyncConfig;
use collection_sync::lifecycle::{setup_tracing, ProductSystem};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    setup_tracing();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = SyncConfig::load(config_path.as_deref())?;

    info!(base_url = %config.base_url, "Starting collection sync demo");
    let system = ProductSystem::new(&config)?;
    let products = &system.product_client;

    // Report every published change, the way a UI would re-render.
    let mut changes = products.subscribe();
    let observer = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let snapshot = changes.borrow_and_update().clone();
            info!(count = snapshot.records.len(), state = ?snapshot.state, "Collection changed");
        }
    });

    let span = tracing::info_span!("initial_fetch");
    let count = async { products.refresh().await }.instrument(span).await?;
    info!(count, "Products fetched");

    match products.add_product("Demo Pencil").await {
        Ok(added) => info!(id = %added.id(), "Product added"),
        Err(e) => error!(error = %e, "Add failed"),
    }

    if let Some(first) = products.products().first().cloned() {
        let id = first.id().clone();

        match products.update_title(id.clone(), "Renamed by demo").await {
            Ok(updated) => info!(id = %updated.id(), title = ?updated.title(), "Product updated"),
            Err(e) => error!(error = %e, "Update failed"),
        }

        match products.delete(id).await {
            Ok(deleted) => info!(id = %deleted, "Product deleted"),
            Err(e) => error!(error = %e, "Delete failed"),
        }
    }

    for product in products.products().iter().take(5) {
        info!(id = %product.id(), title = ?product.title(), "Product");
    }

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    observer.abort();

    info!("Demo completed");
    Ok(())
}
