//! Mutation-batch loop.
//!
//! The embedding host observes the live document and ships each mutation
//! batch as serialized HTML: the full snapshot, the added subtrees, and the
//! computed body background color. The watcher re-scans the header on every
//! batch (idempotent against the mount registry), inspects the first added
//! fragment for a timeline entry, and dispatches resolution for anything
//! new. Only the first added fragment is inspected per batch; that matches
//! the observed granularity of the watched mutation type, not a
//! completeness guarantee.

use std::sync::Arc;

use scraper::Html;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

use ensign_scanner::document;

use crate::mounts::{MountKind, MountRegistry};
use crate::resolver::Resolver;
use crate::store::Store;
use crate::traits::ThemeSource;

/// Levels walked down the first-child chain from an entry's anchor link to
/// the visual insertion point.
const ENTRY_ANCHOR_DEPTH: usize = 3;

/// One document-change notification from the embedding host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationBatch {
    /// Full document snapshot.
    pub document: String,
    /// Serialized subtrees added in this batch, in insertion order.
    pub added: Vec<String>,
    /// Computed background color of the page body.
    pub background_color: String,
}

pub struct Watcher {
    resolver: Arc<Resolver>,
    store: Arc<Store>,
    mounts: Arc<MountRegistry>,
    theme: Arc<dyn ThemeSource>,
    batches: mpsc::Receiver<MutationBatch>,
    disabled: bool,
    last_background: Option<String>,
}

impl Watcher {
    pub fn new(
        resolver: Arc<Resolver>,
        store: Arc<Store>,
        mounts: Arc<MountRegistry>,
        theme: Arc<dyn ThemeSource>,
        batches: mpsc::Receiver<MutationBatch>,
        disabled: bool,
    ) -> Self {
        Self {
            resolver,
            store,
            mounts,
            theme,
            batches,
            disabled,
            last_background: None,
        }
    }

    /// Consume mutation batches until the host closes the channel.
    ///
    /// With the persisted kill toggle set, the watcher is inert: no scans,
    /// no observation, immediate return.
    pub async fn run(mut self) {
        if self.disabled {
            info!("augment toggle set, pipeline disabled for this session");
            return;
        }

        while let Some(batch) = self.batches.recv().await {
            self.process(batch).await;
        }
    }

    async fn process(&mut self, batch: MutationBatch) {
        if self.last_background.as_deref() != Some(batch.background_color.as_str()) {
            let theme = self.theme.derive(&batch.background_color);
            self.store.set_theme(theme).await;
            self.last_background = Some(batch.background_color.clone());
        }

        let snapshot = Html::parse_document(&batch.document);
        self.update_header(&snapshot);

        if let Some(added) = batch.added.first() {
            let fragment = Html::parse_fragment(added);
            self.scan_added(&fragment);
        }
    }

    /// Re-scan the profile header. A mount already annotating the scanned
    /// handle is left alone; a mount for a different handle is stale and
    /// replaced. A scan-miss neither inserts nor removes anything.
    fn update_header(&self, snapshot: &Html) {
        let Some(found) = document::scan_header(snapshot) else {
            return;
        };

        if let Some(existing) = self.mounts.header_handle() {
            if existing == found.handle {
                // badge already mounted for this handle
                return;
            }
            debug!(
                old = existing.as_str(),
                new = found.handle.as_str(),
                "replacing outdated header badge"
            );
            self.mounts.remove_header();
        }

        let anchor = document::anchor_path(&found.target);
        self.resolver
            .dispatch(MountKind::Header, anchor, &found.handle, &found.name);
    }

    /// Scan an added fragment for a timeline entry with a name region.
    fn scan_added(&self, fragment: &Html) {
        let Some(tweet) = document::find_tweet(fragment) else {
            return;
        };
        let Some(found) = document::scan_entry(&tweet) else {
            return;
        };
        if found.name.is_empty() {
            return;
        }
        let Some(anchor_el) = document::descend_first_child(&found.target, ENTRY_ANCHOR_DEPTH)
        else {
            return;
        };

        let anchor = document::anchor_path(&anchor_el);
        if self.mounts.has_anchor(&anchor) {
            return;
        }

        self.resolver
            .dispatch(MountKind::Entry, anchor, &found.handle, &found.name);
    }
}
