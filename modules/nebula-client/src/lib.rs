//! Client for the naming resolution gateway.
//!
//! One call matters: `resolve` a decentralized name to its naming record
//! (display name, free-text fields, chain addresses) and resolved address.
//! A name with no record is a data outcome, not an error: the gateway's
//! 404 maps to an empty `Resolution`.

pub mod error;

pub use error::{NebulaError, Result};

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Profile data the naming service holds for a decentralized name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamingRecord {
    #[serde(default)]
    pub name: Option<String>,

    /// Free-text fields keyed by namespaced names (`com.twitter`, `avatar`).
    #[serde(default)]
    pub text: HashMap<String, String>,

    /// Chain addresses keyed by chain tag (`eth`).
    #[serde(default)]
    pub addresses: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Resolution {
    #[serde(default)]
    pub record: Option<NamingRecord>,

    #[serde(default)]
    pub address: Option<String>,
}

pub struct NebulaClient {
    client: reqwest::Client,
    base_url: String,
}

impl NebulaClient {
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

    /// Resolve a decentralized name. Unregistered names resolve to an empty
    /// `Resolution` rather than an error.
    pub async fn resolve(&self, name: &str) -> Result<Resolution> {
        let endpoint = format!("{}/v1/resolve/{name}", self.base_url);

        let resp = self.client.get(&endpoint).send().await?;

        let status = resp.status();
        if status.as_u16() == 404 {
            return Ok(Resolution::default());
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(NebulaError::Api {
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
    fn record_tolerates_sparse_payloads() {
        let resolution: Resolution = serde_json::from_str(r#"{"record": {}}"#).unwrap();
        let record = resolution.record.unwrap();
        assert!(record.name.is_none());
        assert!(record.text.is_empty());
        assert!(record.addresses.is_empty());
        assert!(resolution.address.is_none());
    }

    #[test]
    fn record_parses_full_payload() {
        let json = r#"{
            "record": {
                "name": "Alice",
                "text": { "com.twitter": "alice", "avatar": "erc721:0xabc/1" },
                "addresses": { "eth": "0xABCDEF" }
            },
            "address": "0xABCDEF"
        }"#;
        let resolution: Resolution = serde_json::from_str(json).unwrap();
        let record = resolution.record.unwrap();
        assert_eq!(record.name.as_deref(), Some("Alice"));
        assert_eq!(record.text["com.twitter"], "alice");
        assert_eq!(record.addresses["eth"], "0xABCDEF");
        assert_eq!(resolution.address.as_deref(), Some("0xABCDEF"));
    }
}
