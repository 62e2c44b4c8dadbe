// Test mocks for the pipeline.
//
// Three mocks matching the trait boundaries:
// - MockNameService (NameService) — HashMap name→Resolution, call recording
// - MockInventory (AssetInventory) — HashMap-based inventories and assets
// - MockTheme (ThemeSource) — fixed palette, derive-call recording
//
// Plus fixture builders for naming records, inventory payloads, and the
// snapshot HTML the scanner expects.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;

use ensign_common::types::{BadgePalette, BadgeTheme, Theme};
use inventory_client::{InventoryAsset, InventoryCollection, InventoryCollectionMeta};
use nebula_client::{NamingRecord, Resolution};

use crate::traits::{AssetInventory, NameService, ThemeSource};
use crate::watcher::MutationBatch;

// ---------------------------------------------------------------------------
// MockNameService
// ---------------------------------------------------------------------------

/// HashMap-based name service. Unregistered names resolve to an empty
/// `Resolution` (no record), mirroring the gateway's 404 mapping.
/// Builder pattern: `.on_resolve()`, `.fail_on()`.
pub struct MockNameService {
    resolutions: HashMap<String, Resolution>,
    failures: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockNameService {
    pub fn new() -> Self {
        Self {
            resolutions: HashMap::new(),
            failures: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn on_resolve(mut self, name: &str, resolution: Resolution) -> Self {
        self.resolutions.insert(name.to_string(), resolution);
        self
    }

    pub fn fail_on(mut self, name: &str, message: &str) -> Self {
        self.failures.insert(name.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }
}

impl Default for MockNameService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NameService for MockNameService {
    async fn resolve(&self, name: &str) -> Result<Resolution> {
        self.calls.lock().unwrap().push(name.to_string());
        if let Some(message) = self.failures.get(name) {
            bail!("{message}");
        }
        Ok(self.resolutions.get(name).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// MockInventory
// ---------------------------------------------------------------------------

/// HashMap-based inventory. Returns `Err` for unregistered addresses.
/// Builder pattern: `.on_address()`, `.on_asset()`, `.fail_address()`.
pub struct MockInventory {
    inventories: HashMap<String, HashMap<String, InventoryCollection>>,
    assets: HashMap<(String, String), InventoryAsset>,
    failures: HashSet<String>,
}

impl MockInventory {
    pub fn new() -> Self {
        Self {
            inventories: HashMap::new(),
            assets: HashMap::new(),
            failures: HashSet::new(),
        }
    }

    pub fn on_address(
        mut self,
        address: &str,
        collections: HashMap<String, InventoryCollection>,
    ) -> Self {
        self.inventories.insert(address.to_string(), collections);
        self
    }

    pub fn on_asset(mut self, address: &str, token_id: &str, asset: InventoryAsset) -> Self {
        self.assets
            .insert((address.to_string(), token_id.to_string()), asset);
        self
    }

    pub fn fail_address(mut self, address: &str) -> Self {
        self.failures.insert(address.to_string());
        self
    }
}

impl Default for MockInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AssetInventory for MockInventory {
    async fn for_address(&self, address: &str) -> Result<HashMap<String, InventoryCollection>> {
        if self.failures.contains(address) {
            bail!("inventory unavailable for {address}");
        }
        match self.inventories.get(address) {
            Some(collections) => Ok(collections.clone()),
            None => bail!("no inventory registered for {address}"),
        }
    }

    async fn get(&self, asset_address: &str, token_id: &str) -> Result<InventoryAsset> {
        match self
            .assets
            .get(&(asset_address.to_string(), token_id.to_string()))
        {
            Some(asset) => Ok(asset.clone()),
            None => bail!("no asset registered for {asset_address}/{token_id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockTheme
// ---------------------------------------------------------------------------

/// Fixed-palette theme source that records every derive call.
pub struct MockTheme {
    derived: Mutex<Vec<String>>,
}

impl MockTheme {
    pub fn new() -> Self {
        Self {
            derived: Mutex::new(Vec::new()),
        }
    }

    pub fn derived(&self) -> Vec<String> {
        self.derived.lock().unwrap().clone()
    }
}

impl Default for MockTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeSource for MockTheme {
    fn derive(&self, background_color: &str) -> Theme {
        self.derived.lock().unwrap().push(background_color.to_string());
        let palette = BadgePalette {
            color: "#ffffff".into(),
            background: "#00d2be".into(),
        };
        Theme {
            background_color: background_color.to_string(),
            badge: BadgeTheme {
                verified: palette.clone(),
                unverified: palette.clone(),
                default: palette,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

pub fn naming_record(
    display_name: &str,
    twitter: Option<&str>,
    eth_address: Option<&str>,
    avatar: Option<&str>,
) -> NamingRecord {
    let mut text = HashMap::new();
    if let Some(twitter) = twitter {
        text.insert("com.twitter".to_string(), twitter.to_string());
    }
    if let Some(avatar) = avatar {
        text.insert("avatar".to_string(), avatar.to_string());
    }
    let mut addresses = HashMap::new();
    if let Some(eth_address) = eth_address {
        addresses.insert("eth".to_string(), eth_address.to_string());
    }
    NamingRecord {
        name: Some(display_name.to_string()),
        text,
        addresses,
    }
}

pub fn resolution(record: NamingRecord, address: &str) -> Resolution {
    Resolution {
        record: Some(record),
        address: Some(address.to_string()),
    }
}

pub fn inventory_asset(
    token_id: &str,
    img: Option<&str>,
    animation: Option<&str>,
    thumbnail: Option<&str>,
) -> InventoryAsset {
    InventoryAsset {
        name: None,
        token_id: token_id.to_string(),
        img: img.map(String::from),
        animation: animation.map(String::from),
        thumbnail: thumbnail.map(String::from),
    }
}

pub fn inventory_collection(
    meta_img: Option<&str>,
    assets: Vec<(&str, InventoryAsset)>,
) -> InventoryCollection {
    InventoryCollection {
        meta: InventoryCollectionMeta {
            name: None,
            img: meta_img.map(String::from),
        },
        assets: assets
            .into_iter()
            .map(|(id, asset)| (id.to_string(), asset))
            .collect(),
    }
}

/// Profile page whose header displays `display_name` for `handle`.
pub fn header_document(handle: &str, display_name: &str) -> String {
    format!(
        r#"
        <html><body><main>
        <div data-testid="primaryColumn">
            <div>
                <div>
                    <a href="https://twitter.com/{handle}"><img src="photo.jpg"></a>
                    <div>
                        <div>
                            <div><span><span>{display_name}</span></span></div>
                            <span>@{handle}</span>
                        </div>
                    </div>
                </div>
                <nav></nav>
            </div>
        </div>
        </main></body></html>
        "#
    )
}

/// Timeline entry fragment whose author link shows `display_name` before the
/// handle span. `padded` prepends a sibling so the anchor lands on a
/// different path than the unpadded variant.
pub fn tweet_fragment(handle: &str, display_name: &str, padded: bool) -> String {
    let pad = if padded {
        "<div><span>in reply to</span></div>"
    } else {
        ""
    };
    format!(
        r#"
        <div data-testid="tweet">
            {pad}
            <a role="link" href="https://twitter.com/{handle}">
                <div><div><div><span>{display_name}</span></div></div></div>
                <span>@{handle}</span>
            </a>
        </div>
        "#
    )
}

/// Bare document with nothing the header scan can match.
pub fn empty_document() -> String {
    "<html><body><main></main></body></html>".to_string()
}

pub fn batch(document: &str, added: Vec<String>, background_color: &str) -> MutationBatch {
    MutationBatch {
        document: document.to_string(),
        added,
        background_color: background_color.to_string(),
    }
}
