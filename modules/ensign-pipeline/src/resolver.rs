//! Asynchronous identity resolution.
//!
//! `dispatch` is the synchronous half: register the badge scaffold, consult
//! the dedup cache, and, for a fresh identity, spawn the resolution task.
//! The task resolves the naming record, fetches the asset inventory,
//! normalizes media, and writes the finished `Identity` into the store. Any
//! failure becomes a terminal per-identity error entry; nothing propagates
//! and nothing is retried within the session.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, error, info};

use ensign_common::types::{
    identity_key, AnchorPath, Asset, Collection, CollectionMeta, Identity, MediaDescriptor,
    UserEntry, Verified,
};
use ensign_scanner::extract::{asset_media, media_kind, parse_avatar_nft};
use inventory_client::{InventoryAsset, InventoryCollection};

use crate::dedup::DedupCache;
use crate::mounts::{Mount, MountKind, MountRegistry};
use crate::store::Store;
use crate::traits::{AssetInventory, NameService};

/// Naming-record text field holding the social handle claim.
const TWITTER_TEXT_KEY: &str = "com.twitter";
/// Naming-record text field holding the avatar asset declaration.
const AVATAR_TEXT_KEY: &str = "avatar";
/// Chain tag whose address owns the asset inventory.
const INVENTORY_CHAIN: &str = "eth";

pub struct Resolver {
    names: Arc<dyn NameService>,
    inventory: Arc<dyn AssetInventory>,
    store: Arc<Store>,
    mounts: Arc<MountRegistry>,
    checked: DedupCache,
}

impl Resolver {
    pub fn new(
        names: Arc<dyn NameService>,
        inventory: Arc<dyn AssetInventory>,
        store: Arc<Store>,
        mounts: Arc<MountRegistry>,
    ) -> Self {
        Self {
            names,
            inventory,
            store,
            mounts,
            checked: DedupCache::new(),
        }
    }

    /// Scaffold the badge mount and start resolution for a fresh identity.
    ///
    /// Never suspends: the mount insert and the dedup check-and-mark both
    /// complete before this returns, so a second mutation batch carrying the
    /// same identity cannot double-dispatch even though resolution itself is
    /// asynchronous. Must be called from within a tokio runtime.
    pub fn dispatch(&self, kind: MountKind, anchor: AnchorPath, handle: &str, name: &str) {
        let key = identity_key(name);

        self.mounts.insert(Mount {
            kind,
            anchor,
            handle: handle.to_string(),
            identity_key: key.clone(),
        });

        if !self.checked.check_and_mark(&key) {
            debug!(identity = key.as_str(), "already checked, skipping resolution");
            return;
        }

        let names = Arc::clone(&self.names);
        let inventory = Arc::clone(&self.inventory);
        let store = Arc::clone(&self.store);
        let name = name.to_string();
        let handle = handle.to_string();
        tokio::spawn(async move {
            if let Err(err) =
                resolve_identity(names.as_ref(), inventory.as_ref(), &store, &key, &name, &handle)
                    .await
            {
                error!(
                    identity = key.as_str(),
                    error = %err,
                    "could not resolve verification state"
                );
                store
                    .set_user(
                        &key,
                        UserEntry::Failed {
                            error: err.to_string(),
                        },
                    )
                    .await;
            }
        });
    }
}

/// Resolve the record, fetch inventory, normalize media, write the finished
/// identity. Runs inside the unsupervised task; the caller converts any
/// error into the terminal per-identity error entry.
async fn resolve_identity(
    names: &dyn NameService,
    inventory: &dyn AssetInventory,
    store: &Store,
    key: &str,
    name: &str,
    handle: &str,
) -> Result<()> {
    let resolution = names.resolve(name).await?;
    let Some(record) = resolution.record else {
        debug!(identity = key, "no naming record, leaving badge unresolved");
        return Ok(());
    };

    let address = resolution
        .address
        .map(|a| a.to_lowercase())
        .unwrap_or_default();
    let twitter_claim = record
        .text
        .get(TWITTER_TEXT_KEY)
        .cloned()
        .unwrap_or_default();

    let mut identity = Identity {
        name: record.name.clone().unwrap_or_default(),
        avatar: None,
        address: address.clone(),
        twitter_handle: handle.to_string(),
        verified: Verified {
            name: !address.is_empty() && handle.eq_ignore_ascii_case(&twitter_claim),
            // Avatar ownership verification has no wired contract.
            avatar: false,
        },
        inventory: HashMap::new(),
    };

    if let Some(chain_address) = record.addresses.get(INVENTORY_CHAIN) {
        let raw = inventory.for_address(chain_address).await?;
        identity.inventory = normalize_inventory(raw);
    }

    let avatar = parse_avatar_nft(record.text.get(AVATAR_TEXT_KEY).map_or("", String::as_str));
    if !avatar.address.is_empty() && !avatar.token_id.is_empty() {
        let asset = inventory.get(&avatar.address, &avatar.token_id).await?;
        identity.avatar = Some(asset_media(
            asset.img.as_deref(),
            asset.animation.as_deref(),
            asset.thumbnail.as_deref(),
        ));
    }

    info!(
        identity = key,
        verified = identity.verified.name,
        collections = identity.inventory.len(),
        "identity resolved"
    );
    store
        .set_user(key, UserEntry::Resolved(Box::new(identity)))
        .await;

    Ok(())
}

// ---------------------------------------------------------------------------
// Media normalization
// ---------------------------------------------------------------------------

fn normalize_inventory(
    raw: HashMap<String, InventoryCollection>,
) -> HashMap<String, Collection> {
    raw.into_iter()
        .map(|(id, collection)| (id, normalize_collection(collection)))
        .collect()
}

fn normalize_collection(raw: InventoryCollection) -> Collection {
    let declared = raw.meta.img.clone().filter(|src| !src.is_empty());
    let priority = u8::from(declared.is_some());
    let img_src = declared.unwrap_or_else(|| fallback_collection_img(&raw.assets));

    let assets = raw
        .assets
        .into_iter()
        .map(|(id, asset)| {
            let media = asset_media(
                asset.img.as_deref(),
                asset.animation.as_deref(),
                asset.thumbnail.as_deref(),
            );
            (
                id,
                Asset {
                    token_id: asset.token_id,
                    name: asset.name,
                    img: asset.img,
                    animation: asset.animation,
                    thumbnail: asset.thumbnail,
                    media,
                },
            )
        })
        .collect();

    Collection {
        meta: CollectionMeta {
            priority,
            img: MediaDescriptor {
                kind: media_kind(&img_src),
                src: img_src,
            },
        },
        assets,
    }
}

/// Fallback collection image: among assets that have one, the image of the
/// asset with the smallest token id in byte order. Token ids compare as the
/// strings the service sent ("9" sorts after "10"); that ordering is part
/// of the observed contract and is preserved as-is.
fn fallback_collection_img(assets: &HashMap<String, InventoryAsset>) -> String {
    assets
        .values()
        .filter(|asset| asset.img.as_deref().is_some_and(|src| !src.is_empty()))
        .min_by(|a, b| a.token_id.cmp(&b.token_id))
        .and_then(|asset| asset.img.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensign_common::types::MediaKind;
    use inventory_client::InventoryCollectionMeta;

    fn asset(token_id: &str, img: Option<&str>) -> InventoryAsset {
        InventoryAsset {
            name: None,
            token_id: token_id.into(),
            img: img.map(String::from),
            animation: None,
            thumbnail: None,
        }
    }

    fn collection(
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
                .map(|(id, a)| (id.to_string(), a))
                .collect(),
        }
    }

    #[test]
    fn declared_meta_img_sets_priority() {
        let normalized = normalize_collection(collection(
            Some("banner.png"),
            vec![("a", asset("1", Some("a.png")))],
        ));
        assert_eq!(normalized.meta.priority, 1);
        assert_eq!(normalized.meta.img.src, "banner.png");
        assert_eq!(normalized.meta.img.kind, MediaKind::Img);
    }

    #[test]
    fn missing_meta_img_falls_back_to_string_smallest_token_id() {
        let normalized = normalize_collection(collection(
            None,
            vec![
                ("a", asset("2", Some("two.png"))),
                ("b", asset("10", Some("ten.png"))),
            ],
        ));
        assert_eq!(normalized.meta.priority, 0);
        // byte-order comparison: "10" < "2"
        assert_eq!(normalized.meta.img.src, "ten.png");
    }

    #[test]
    fn token_id_ordering_is_not_numeric() {
        let normalized = normalize_collection(collection(
            None,
            vec![
                ("a", asset("9", Some("nine.png"))),
                ("b", asset("10", Some("ten.png"))),
            ],
        ));
        // "9" sorts after "10" in byte order
        assert_eq!(normalized.meta.img.src, "ten.png");
    }

    #[test]
    fn fallback_skips_assets_without_images() {
        let normalized = normalize_collection(collection(
            None,
            vec![
                ("a", asset("1", None)),
                ("b", asset("5", Some("five.png"))),
            ],
        ));
        assert_eq!(normalized.meta.img.src, "five.png");
    }

    #[test]
    fn no_qualifying_asset_leaves_empty_img() {
        let normalized =
            normalize_collection(collection(None, vec![("a", asset("1", None))]));
        assert_eq!(normalized.meta.img.src, "");
        assert_eq!(normalized.meta.img.kind, MediaKind::Img);
        assert_eq!(normalized.meta.priority, 0);
    }

    #[test]
    fn empty_meta_img_counts_as_absent() {
        let normalized = normalize_collection(collection(
            Some(""),
            vec![("a", asset("1", Some("a.png")))],
        ));
        assert_eq!(normalized.meta.priority, 0);
        assert_eq!(normalized.meta.img.src, "a.png");
    }

    #[test]
    fn assets_keep_raw_fields_and_gain_media() {
        let mut raw = asset("7", Some("a.png"));
        raw.animation = Some("a.mp4".to_string());
        let normalized = normalize_collection(collection(Some("m.png"), vec![("a", raw)]));

        let a = &normalized.assets["a"];
        assert_eq!(a.token_id, "7");
        assert_eq!(a.img.as_deref(), Some("a.png"));
        assert_eq!(a.animation.as_deref(), Some("a.mp4"));
        assert_eq!(a.media.img.src, "a.mp4");
        assert_eq!(a.media.img.kind, MediaKind::Video);
        assert_eq!(a.media.thumbnail.src, "a.mp4");
    }

    #[test]
    fn video_meta_img_classified() {
        let normalized = normalize_collection(collection(Some("clip.mp4"), vec![]));
        assert_eq!(normalized.meta.img.kind, MediaKind::Video);
    }
}
