//! Locating and parsing decentralized-name regions in timeline markup.
//!
//! `extract` holds the pure text/pattern functions; `document` walks parsed
//! HTML snapshots for the two layouts that display a user's name (profile
//! header, timeline entry). Everything here is synchronous and I/O-free,
//! and a scan that finds nothing is a normal outcome, not an error.

pub mod document;
pub mod extract;

pub use document::{anchor_path, descend_first_child, find_tweet, scan_entry, scan_header, ScanTarget};
pub use extract::{asset_media, handle_from_href, media_kind, parse_avatar_nft, parse_ens_name, AvatarNft};
