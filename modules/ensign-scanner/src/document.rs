//! Structural scans over parsed timeline snapshots.
//!
//! Two layouts display a user's name: the profile header and individual
//! timeline entries. Both scans are positional/attribute heuristics against
//! third-party markup. The selectors and the profile-link shape below are
//! the versioned matching contract, not something this crate owns. A missing
//! marker is a scan-miss: `None`, nothing logged.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use ensign_common::types::AnchorPath;

use crate::extract::{equals_ignore_case, handle_from_href, parse_ens_name};

/// Profile-link shape: the handle is the path segment after the host.
static PROFILE_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"twitter\.com/(?P<handle>\w+)").unwrap());

const NAV_MARKER: &str = "[data-testid=primaryColumn] nav";
const TWEET_MARKER: &str = "[data-testid=primaryColumn] [data-testid=tweet]";
const TWEET_MARKER_BARE: &str = "[data-testid=tweet]";
const ROLE_LINK: &str = "a[role=link]";

/// A successful region match: where the badge mounts, whose handle the
/// region displays, and the decentralized name parsed out of it (may be
/// empty for entry scans; callers reject empty names).
///
/// Borrowed from the scanned snapshot; consumed immediately, never stored.
#[derive(Debug, Clone)]
pub struct ScanTarget<'a> {
    pub target: ElementRef<'a>,
    pub handle: String,
    pub name: String,
}

/// Locate the name section of the profile header.
///
/// The navigation element's previous sibling is the header; its first link
/// names the profile handle; the header's second child block holds the
/// display-name section, identified by a span matching `@handle`; the
/// nested span-in-span inside that section carries the decentralized name.
/// The badge anchor is the nested span's grandparent.
pub fn scan_header(document: &Html) -> Option<ScanTarget<'_>> {
    let nav_sel = Selector::parse(NAV_MARKER).unwrap();
    let nav = document.select(&nav_sel).next()?;
    let header = prev_element_sibling(nav)?;

    let link_sel = Selector::parse("a").unwrap();
    let photo_link = header.select(&link_sel).next()?;
    let href = photo_link.value().attr("href")?;
    let caps = PROFILE_LINK_RE.captures(href)?;
    let handle = caps["handle"].to_lowercase();

    let info_section = element_children(header).nth(1)?;
    let span_sel = Selector::parse("span").unwrap();
    let name_section = element_children(info_section).find(|block| {
        block.select(&span_sel).any(|span| {
            let text = text_of(span);
            text.starts_with('@') && equals_ignore_case(&text[1..], &handle)
        })
    })?;

    let nested_sel = Selector::parse("span > span").unwrap();
    let ens_span = name_section.select(&nested_sel).next()?;
    let name = parse_ens_name(&text_of(ens_span));
    if name.is_empty() {
        return None;
    }

    let target = parent_element(ens_span).and_then(parent_element)?;
    Some(ScanTarget {
        target,
        handle,
        name,
    })
}

/// Scan one timeline entry for its author's name region.
///
/// Each role-marked link is checked for a span displaying the same handle
/// its href carries. The first link whose handle span sits at index > 0
/// short-circuits the scan; the spans before it are searched in reverse for
/// a `.eth` name. A link with the handle span at index 0 has no display
/// name and is skipped.
pub fn scan_entry<'a>(entry: &ElementRef<'a>) -> Option<ScanTarget<'a>> {
    let link_sel = Selector::parse(ROLE_LINK).unwrap();
    let span_sel = Selector::parse("span").unwrap();

    for link in entry.select(&link_sel) {
        let handle = handle_from_href(link.value().attr("href").unwrap_or(""));

        let spans: Vec<ElementRef<'a>> = link.select(&span_sel).collect();
        let handle_idx = spans.iter().position(|span| {
            let text = text_of(*span);
            text.starts_with('@') && equals_ignore_case(&text[1..], &handle)
        });

        let Some(handle_idx) = handle_idx else { continue };
        if handle_idx == 0 {
            continue;
        }

        let name = spans[..handle_idx]
            .iter()
            .rev()
            .map(|span| text_of(*span))
            .find(|text| text.contains(".eth"))
            .map(|text| parse_ens_name(&text))
            .unwrap_or_default();

        return Some(ScanTarget {
            target: link,
            handle,
            name,
        });
    }

    None
}

/// Find the timeline entry inside an added fragment, if any.
///
/// The primary-column scope is preferred, but a detached fragment may not
/// carry that ancestor, in which case the bare entry marker is accepted.
pub fn find_tweet(fragment: &Html) -> Option<ElementRef<'_>> {
    let scoped = Selector::parse(TWEET_MARKER).unwrap();
    let bare = Selector::parse(TWEET_MARKER_BARE).unwrap();
    fragment
        .select(&scoped)
        .next()
        .or_else(|| fragment.select(&bare).next())
}

/// Walk `levels` steps down the first-element-child chain.
pub fn descend_first_child<'a>(el: &ElementRef<'a>, levels: usize) -> Option<ElementRef<'a>> {
    let mut current = *el;
    for _ in 0..levels {
        current = element_children(current).next()?;
    }
    Some(current)
}

/// Element-child index path from the snapshot root down to `el`.
pub fn anchor_path(el: &ElementRef<'_>) -> AnchorPath {
    let mut indexes = Vec::new();
    let mut node = **el;
    while let Some(parent) = node.parent() {
        let position = parent
            .children()
            .filter(|child| child.value().is_element())
            .position(|child| child.id() == node.id());
        let Some(position) = position else { break };
        indexes.push(position);
        node = parent;
    }
    indexes.reverse();
    AnchorPath(indexes)
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect()
}

fn parent_element(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.parent().and_then(ElementRef::wrap)
}

fn prev_element_sibling(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    let mut node = el.prev_sibling();
    while let Some(sibling) = node {
        if let Some(element) = ElementRef::wrap(sibling) {
            return Some(element);
        }
        node = sibling.prev_sibling();
    }
    None
}

fn element_children<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.children().filter_map(ElementRef::wrap)
}
