//! Client for the asset inventory service.
//!
//! Two endpoints: the full collection map owned by an address, and a single
//! asset by contract address + token id. Types here are the raw wire shape;
//! media normalization happens downstream.

pub mod error;

pub use error::{InventoryError, Result};

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryAsset {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default, rename = "tokenId")]
    pub token_id: String,

    #[serde(default)]
    pub img: Option<String>,

    #[serde(default)]
    pub animation: Option<String>,

    #[serde(default)]
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryCollectionMeta {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub img: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryCollection {
    #[serde(default)]
    pub meta: InventoryCollectionMeta,

    /// Assets keyed by the service's asset id.
    #[serde(default)]
    pub assets: HashMap<String, InventoryAsset>,
}

pub struct InventoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl InventoryClient {
    pub fn new(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Full inventory for a chain address, keyed by collection id.
    pub async fn for_address(&self, address: &str) -> Result<HashMap<String, InventoryCollection>> {
        let endpoint = format!("{}/v1/inventory/{address}", self.base_url);
        self.get_json(&endpoint).await
    }

    /// One asset by contract address and token id.
    pub async fn get(&self, asset_address: &str, token_id: &str) -> Result<InventoryAsset> {
        let endpoint = format!("{}/v1/asset/{asset_address}/{token_id}", self.base_url);
        self.get_json(&endpoint).await
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let resp = self.client.get(endpoint).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_tolerates_sparse_payloads() {
        let collection: InventoryCollection = serde_json::from_str("{}").unwrap();
        assert!(collection.meta.img.is_none());
        assert!(collection.assets.is_empty());
    }

    #[test]
    fn asset_parses_wire_field_names() {
        let json = r#"{
            "name": "Punk",
            "tokenId": "42",
            "img": "a.png",
            "animation": "a.mp4",
            "thumbnail": "t.png"
        }"#;
        let asset: InventoryAsset = serde_json::from_str(json).unwrap();
        assert_eq!(asset.token_id, "42");
        assert_eq!(asset.animation.as_deref(), Some("a.mp4"));
    }
}
