//! Shared observable identity state.
//!
//! Write-only from the pipeline's perspective; the rendering layer owns
//! reads and subscribes to the change feed. Every map is append/overwrite
//! only, and each identity key is written by at most one resolution task,
//! so no transactional discipline is needed beyond the lock itself.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};

use ensign_common::types::{LayerPop, Theme, UserEntry};

const UPDATE_CHANNEL_CAPACITY: usize = 64;

/// What changed. Lagging subscribers re-read the store; the feed only
/// signals that a read is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreUpdate {
    User(String),
    Theme,
    LayerPop,
}

pub struct Store {
    users: RwLock<HashMap<String, UserEntry>>,
    theme: RwLock<Option<Theme>>,
    layer_pop: RwLock<Option<LayerPop>>,
    updates: broadcast::Sender<StoreUpdate>,
}

impl Store {
    pub fn new() -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            users: RwLock::new(HashMap::new()),
            theme: RwLock::new(None),
            layer_pop: RwLock::new(None),
            updates,
        }
    }

    pub async fn set_user(&self, identity_key: &str, entry: UserEntry) {
        self.users
            .write()
            .await
            .insert(identity_key.to_string(), entry);
        // No receivers is fine: the rendering layer may not be attached yet.
        let _ = self.updates.send(StoreUpdate::User(identity_key.to_string()));
    }

    pub async fn user(&self, identity_key: &str) -> Option<UserEntry> {
        self.users.read().await.get(identity_key).cloned()
    }

    pub async fn set_theme(&self, theme: Theme) {
        *self.theme.write().await = Some(theme);
        let _ = self.updates.send(StoreUpdate::Theme);
    }

    pub async fn theme(&self) -> Option<Theme> {
        self.theme.read().await.clone()
    }

    pub async fn set_layer_pop(&self, pop: LayerPop) {
        *self.layer_pop.write().await = Some(pop);
        let _ = self.updates.send(StoreUpdate::LayerPop);
    }

    pub async fn layer_pop(&self) -> Option<LayerPop> {
        self.layer_pop.read().await.clone()
    }

    /// Change feed for the rendering layer.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreUpdate> {
        self.updates.subscribe()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ensign_common::types::{BadgePalette, BadgeTheme};

    fn theme(background: &str) -> Theme {
        let palette = BadgePalette {
            color: "#fff".into(),
            background: "#000".into(),
        };
        Theme {
            background_color: background.into(),
            badge: BadgeTheme {
                verified: palette.clone(),
                unverified: palette.clone(),
                default: palette,
            },
        }
    }

    #[tokio::test]
    async fn set_user_is_observed_by_subscriber() {
        let store = Store::new();
        let mut updates = store.subscribe();

        store
            .set_user(
                "alice-eth",
                UserEntry::Failed {
                    error: "nope".into(),
                },
            )
            .await;

        assert_eq!(
            updates.recv().await.unwrap(),
            StoreUpdate::User("alice-eth".into())
        );
        assert!(store.user("alice-eth").await.is_some());
        assert!(store.user("bob-eth").await.is_none());
    }

    #[tokio::test]
    async fn set_user_overwrites() {
        let store = Store::new();
        store
            .set_user("alice-eth", UserEntry::Failed { error: "a".into() })
            .await;
        store
            .set_user("alice-eth", UserEntry::Failed { error: "b".into() })
            .await;

        match store.user("alice-eth").await.unwrap() {
            UserEntry::Failed { error } => assert_eq!(error, "b"),
            other => panic!("unexpected entry: {other:?}"),
        }
    }

    #[tokio::test]
    async fn theme_roundtrip() {
        let store = Store::new();
        assert!(store.theme().await.is_none());

        store.set_theme(theme("rgb(0, 0, 0)")).await;
        assert_eq!(
            store.theme().await.unwrap().background_color,
            "rgb(0, 0, 0)"
        );
    }

    #[tokio::test]
    async fn layer_pop_roundtrip() {
        use ensign_common::types::LayerPop;

        let store = Store::new();
        let mut updates = store.subscribe();

        store
            .set_layer_pop(LayerPop {
                position: (120.0, 48.5),
                active: true,
                identity_key: "alice-eth".into(),
                created: chrono::Utc::now(),
            })
            .await;

        assert_eq!(updates.recv().await.unwrap(), StoreUpdate::LayerPop);
        let pop = store.layer_pop().await.unwrap();
        assert!(pop.active);
        assert_eq!(pop.identity_key, "alice-eth");
    }

    #[tokio::test]
    async fn writes_succeed_without_subscribers() {
        let store = Store::new();
        store.set_theme(theme("#fff")).await;
        store
            .set_user("x", UserEntry::Failed { error: "e".into() })
            .await;
    }
}
