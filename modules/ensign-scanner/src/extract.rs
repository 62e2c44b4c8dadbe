//! Pure pattern functions: handles, decentralized names, avatar asset
//! specs, media classification.

use std::sync::LazyLock;

use regex::Regex;

use ensign_common::types::{AssetMedia, MediaDescriptor, MediaKind};

static ENS_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[\w.-]+\.eth").unwrap());

static AVATAR_NFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"erc(?:721|1155):(?P<address>0x\w+)/(?P<token_id>\d+)").unwrap()
});

/// Last path segment of a profile link, lower-cased.
///
/// No well-formedness check: a malformed href yields an empty or garbage
/// string, and callers verify the result against a handle span instead of
/// trusting it.
pub fn handle_from_href(href: &str) -> String {
    href.split('/').next_back().unwrap_or("").to_lowercase()
}

/// First `<word/dot/dash chars>.eth` substring, any case, lower-cased.
/// Empty string when absent.
pub fn parse_ens_name(text: &str) -> String {
    ENS_NAME_RE
        .find(text)
        .map(|m| m.as_str().to_lowercase())
        .unwrap_or_default()
}

/// Parsed `erc721:<address>/<token-id>` (or `erc1155:`) avatar declaration.
/// Both fields empty when the input doesn't match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvatarNft {
    pub address: String,
    pub token_id: String,
}

pub fn parse_avatar_nft(avatar: &str) -> AvatarNft {
    match AVATAR_NFT_RE.captures(avatar) {
        Some(caps) => AvatarNft {
            address: caps["address"].to_string(),
            token_id: caps["token_id"].to_string(),
        },
        None => AvatarNft::default(),
    }
}

/// `.mp4` / `.mov` suffixes (case-sensitive) render as video, everything
/// else as an image.
pub fn media_kind(src: &str) -> MediaKind {
    if src.ends_with(".mp4") || src.ends_with(".mov") {
        MediaKind::Video
    } else {
        MediaKind::Img
    }
}

/// Derive an asset's display media from its raw sources.
///
/// Primary prefers the animation over the still; the thumbnail prefers the
/// dedicated thumbnail, then falls through the same chain. Empty strings
/// count as absent.
pub fn asset_media(
    img: Option<&str>,
    animation: Option<&str>,
    thumbnail: Option<&str>,
) -> AssetMedia {
    let img = img.filter(|s| !s.is_empty());
    let animation = animation.filter(|s| !s.is_empty());
    let thumbnail = thumbnail.filter(|s| !s.is_empty());

    let primary = animation.or(img).unwrap_or("");
    let thumb = thumbnail.or(animation).or(img).unwrap_or("");

    AssetMedia {
        img: MediaDescriptor {
            src: primary.to_string(),
            kind: media_kind(primary),
        },
        thumbnail: MediaDescriptor {
            src: thumb.to_string(),
            kind: media_kind(thumb),
        },
    }
}

pub(crate) fn equals_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}
