//! Annotation mount registry.
//!
//! The Rust analog of inserting badge scaffolds into the page: a mount
//! records where a badge belongs (anchor path), whose handle it annotates,
//! and which identity key it resolves through. Registering the mount is the
//! synchronous "checking" scaffold of the resolution pipeline; it happens
//! before any network work. The rendering layer reads the registry.

use std::collections::HashMap;
use std::sync::Mutex;

use ensign_common::types::AnchorPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountKind {
    /// The single profile-header badge.
    Header,
    /// A badge on one timeline entry.
    Entry,
}

#[derive(Debug, Clone)]
pub struct Mount {
    pub kind: MountKind,
    pub anchor: AnchorPath,
    pub handle: String,
    pub identity_key: String,
}

#[derive(Default)]
struct Mounts {
    header: Option<Mount>,
    entries: HashMap<AnchorPath, Mount>,
}

pub struct MountRegistry {
    inner: Mutex<Mounts>,
}

impl MountRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Mounts::default()),
        }
    }

    /// Register a mount. Idempotent per anchor: an occupied anchor keeps its
    /// existing mount and the call reports false.
    pub fn insert(&self, mount: Mount) -> bool {
        let mut inner = self.lock();
        match mount.kind {
            MountKind::Header => {
                if inner.header.is_some() {
                    return false;
                }
                inner.header = Some(mount);
                true
            }
            MountKind::Entry => {
                if inner.entries.contains_key(&mount.anchor) {
                    return false;
                }
                inner.entries.insert(mount.anchor.clone(), mount);
                true
            }
        }
    }

    /// Handle the current header mount annotates, if any.
    pub fn header_handle(&self) -> Option<String> {
        self.lock().header.as_ref().map(|m| m.handle.clone())
    }

    /// Drop an outdated header mount.
    pub fn remove_header(&self) -> Option<Mount> {
        self.lock().header.take()
    }

    pub fn has_anchor(&self, anchor: &AnchorPath) -> bool {
        let inner = self.lock();
        inner.entries.contains_key(anchor)
            || inner.header.as_ref().is_some_and(|m| &m.anchor == anchor)
    }

    /// All current mounts, for the rendering layer.
    pub fn snapshot(&self) -> Vec<Mount> {
        let inner = self.lock();
        inner
            .header
            .iter()
            .chain(inner.entries.values())
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Mounts> {
        self.inner.lock().expect("mount registry lock poisoned")
    }
}

impl Default for MountRegistry {
    fn default() -> Self {
        Self::new()
    }
}
