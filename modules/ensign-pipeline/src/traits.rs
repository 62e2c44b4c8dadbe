// Trait abstractions for the resolver's external collaborators.
//
// NameService and AssetInventory wrap the two network services; ThemeSource
// wraps theme derivation, which belongs to the rendering side.
//
// These enable deterministic testing with MockNameService and MockInventory:
// no network. `cargo test` in seconds.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use ensign_common::types::Theme;
use ensign_common::EnsignError;
use inventory_client::{InventoryAsset, InventoryClient, InventoryCollection};
use nebula_client::{NebulaClient, Resolution};

// ---------------------------------------------------------------------------
// NameService
// ---------------------------------------------------------------------------

#[async_trait]
pub trait NameService: Send + Sync {
    /// Resolve a decentralized name to its naming record and address.
    async fn resolve(&self, name: &str) -> Result<Resolution>;
}

#[async_trait]
impl NameService for NebulaClient {
    async fn resolve(&self, name: &str) -> Result<Resolution> {
        Ok(self
            .resolve(name)
            .await
            .map_err(|e| EnsignError::Resolution(e.to_string()))?)
    }
}

// ---------------------------------------------------------------------------
// AssetInventory
// ---------------------------------------------------------------------------

#[async_trait]
pub trait AssetInventory: Send + Sync {
    /// Full inventory owned by a chain address, keyed by collection id.
    async fn for_address(&self, address: &str) -> Result<HashMap<String, InventoryCollection>>;

    /// One asset by contract address and token id.
    async fn get(&self, asset_address: &str, token_id: &str) -> Result<InventoryAsset>;
}

#[async_trait]
impl AssetInventory for InventoryClient {
    async fn for_address(&self, address: &str) -> Result<HashMap<String, InventoryCollection>> {
        Ok(self
            .for_address(address)
            .await
            .map_err(|e| EnsignError::Inventory(e.to_string()))?)
    }

    async fn get(&self, asset_address: &str, token_id: &str) -> Result<InventoryAsset> {
        Ok(self
            .get(asset_address, token_id)
            .await
            .map_err(|e| EnsignError::Inventory(e.to_string()))?)
    }
}

// ---------------------------------------------------------------------------
// ThemeSource
// ---------------------------------------------------------------------------

/// Derives a page theme from the computed background color. The pipeline
/// only detects the color change; what a theme looks like is the rendering
/// layer's business.
pub trait ThemeSource: Send + Sync {
    fn derive(&self, background_color: &str) -> Theme;
}
