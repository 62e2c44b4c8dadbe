//! Session wiring.
//!
//! Builds the store, mount registry, resolver, and watcher from a `Config`,
//! with the real HTTP clients behind the service traits. The host keeps the
//! batch sender and spawns `watcher.run()`.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use ensign_common::Config;
use inventory_client::InventoryClient;
use nebula_client::NebulaClient;

use crate::mounts::MountRegistry;
use crate::resolver::Resolver;
use crate::store::Store;
use crate::traits::ThemeSource;
use crate::watcher::{MutationBatch, Watcher};

const BATCH_CHANNEL_CAPACITY: usize = 32;

/// Initialize logging for a host binary.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("ensign=info".parse().expect("valid directive")),
        )
        .init();
}

/// A wired pipeline session. The store and registry handles are what the
/// rendering layer observes; the sender is where the host pushes batches.
pub struct Session {
    pub store: Arc<Store>,
    pub mounts: Arc<MountRegistry>,
    pub batches: mpsc::Sender<MutationBatch>,
    pub watcher: Watcher,
}

/// Wire a session against the real naming/inventory services.
///
/// Reads the persisted kill toggle once, here: a disabled session still
/// hands back a watcher, but running it is a no-op.
pub fn session(config: &Config, theme: Arc<dyn ThemeSource>) -> Session {
    let store = Arc::new(Store::new());
    let mounts = Arc::new(MountRegistry::new());
    let resolver = Arc::new(Resolver::new(
        Arc::new(NebulaClient::new(&config.nebula_url)),
        Arc::new(InventoryClient::new(&config.inventory_url)),
        Arc::clone(&store),
        Arc::clone(&mounts),
    ));

    let (batches, receiver) = mpsc::channel(BATCH_CHANNEL_CAPACITY);
    let watcher = Watcher::new(
        resolver,
        Arc::clone(&store),
        Arc::clone(&mounts),
        theme,
        receiver,
        config.augment_disabled(),
    );

    Session {
        store,
        mounts,
        batches,
        watcher,
    }
}
