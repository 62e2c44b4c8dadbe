//! Shared data model for the identity pipeline.
//!
//! Raw wire types (what the naming/inventory services return) live in their
//! client crates; everything here is the normalized form the store publishes
//! and the rendering layer reads.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage/dedup key for a decentralized name: dots become dashes.
///
/// Names reach this point already lower-cased by the extractor, so the key is
/// case-insensitively unique per distinct name.
pub fn identity_key(name: &str) -> String {
    name.replace('.', "-")
}

// ---------------------------------------------------------------------------
// Anchors
// ---------------------------------------------------------------------------

/// Element-child index path from a scanned root to a badge anchor.
///
/// Snapshots carry no node identity across mutation batches, so anchors are
/// addressed positionally: each step is the index among *element* children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnchorPath(pub Vec<usize>);

impl fmt::Display for AnchorPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for idx in &self.0 {
            if !first {
                write!(f, "/")?;
            }
            write!(f, "{idx}")?;
            first = false;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Img,
}

/// A displayable media source plus how to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub src: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

impl MediaDescriptor {
    pub fn empty() -> Self {
        Self {
            src: String::new(),
            kind: MediaKind::Img,
        }
    }
}

/// Primary and thumbnail descriptors derived from one asset's raw sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMedia {
    pub img: MediaDescriptor,
    pub thumbnail: MediaDescriptor,
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verified {
    pub name: bool,
    /// Always false: avatar ownership verification has no wired contract yet.
    pub avatar: bool,
}

/// Resolved profile for one decentralized name. Built once per identity key
/// and handed to the store whole; never mutated in place afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub avatar: Option<AssetMedia>,
    pub address: String,
    pub twitter_handle: String,
    pub verified: Verified,
    pub inventory: HashMap<String, Collection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub meta: CollectionMeta,
    pub assets: HashMap<String, Asset>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionMeta {
    /// 1 when the collection declared its own image, 0 when it fell back to
    /// an asset image (or has none).
    pub priority: u8,
    pub img: MediaDescriptor,
}

/// Normalized asset: raw inventory fields preserved, media derived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asset {
    pub token_id: String,
    pub name: Option<String>,
    pub img: Option<String>,
    pub animation: Option<String>,
    pub thumbnail: Option<String>,
    pub media: AssetMedia,
}

/// Store value for an identity key: a resolved profile, or the terminal
/// error state a failed resolution leaves behind for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserEntry {
    Resolved(Box<Identity>),
    Failed { error: String },
}

// ---------------------------------------------------------------------------
// Theme + layer pop (store pass-throughs for the rendering layer)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgePalette {
    pub color: String,
    pub background: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeTheme {
    pub verified: BadgePalette,
    pub unverified: BadgePalette,
    pub default: BadgePalette,
}

/// Page theme derived from the computed background color. Derivation itself
/// is a collaborator concern; the pipeline only detects the change and
/// publishes the result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub background_color: String,
    pub badge: BadgeTheme,
}

/// Hover-layer state for the identity popover.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerPop {
    pub position: (f64, f64),
    pub active: bool,
    pub identity_key: String,
    pub created: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_replaces_dots() {
        assert_eq!(identity_key("alice.eth"), "alice-eth");
        assert_eq!(identity_key("sub.alice.eth"), "sub-alice-eth");
    }

    #[test]
    fn anchor_path_displays_slash_separated() {
        assert_eq!(AnchorPath(vec![0, 2, 1]).to_string(), "0/2/1");
        assert_eq!(AnchorPath(vec![]).to_string(), "");
    }

    #[test]
    fn media_kind_serializes_lowercase() {
        let d = MediaDescriptor {
            src: "a.mp4".into(),
            kind: MediaKind::Video,
        };
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["type"], "video");
        assert_eq!(json["src"], "a.mp4");
    }

    #[test]
    fn user_entry_error_shape() {
        let entry = UserEntry::Failed {
            error: "resolution failed".into(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "resolution failed" }));
    }
}
