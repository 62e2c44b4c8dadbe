//! The identity resolution pipeline.
//!
//! A `Watcher` consumes mutation batches from the embedding host, scans the
//! snapshot for decentralized-name regions, and (once per identity per
//! session) spawns a resolution task that writes a normalized profile into
//! the shared `Store`. The rendering layer observes the store and the
//! `MountRegistry`; nothing here renders.

pub mod bootstrap;
pub mod dedup;
pub mod mounts;
pub mod resolver;
pub mod store;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;
pub mod traits;
pub mod watcher;

pub use bootstrap::{init_tracing, session, Session};
pub use dedup::DedupCache;
pub use mounts::{Mount, MountKind, MountRegistry};
pub use resolver::Resolver;
pub use store::{Store, StoreUpdate};
pub use traits::{AssetInventory, NameService, ThemeSource};
pub use watcher::{MutationBatch, Watcher};
