use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::store::{namespaced, KeyValueStore, StoreError};

pub type FavoritesSet = BTreeSet<String>;

/// Add `link` if absent, remove it if present.
pub fn toggle(set: &FavoritesSet, link: &str) -> FavoritesSet {
    let mut next = set.clone();
    if !next.remove(link) {
        next.insert(link.to_string());
    }
    next
}

/// Read the persisted favorites; absent or unreadable data is an empty set.
pub async fn load_favorites<S: KeyValueStore>(store: &S, key: &str) -> FavoritesSet {
    let Some(raw) = store.get(key).await else {
        return FavoritesSet::new();
    };

    match serde_json::from_str::<Vec<String>>(&raw) {
        Ok(links) => links.into_iter().collect(),
        Err(e) => {
            warn!("Ignoring corrupt favorites under '{}': {}", key, e);
            FavoritesSet::new()
        }
    }
}

pub struct Favorites<S> {
    store: Arc<S>,
    key: String,
    set: FavoritesSet,
}

impl<S: KeyValueStore> Favorites<S> {
    pub async fn load(store: Arc<S>, namespace: &str) -> Self {
        let key = namespaced(namespace, "favorites");
        let set = load_favorites(store.as_ref(), &key).await;
        debug!("Loaded {} favorites", set.len());
        Self { store, key, set }
    }

    pub fn contains(&self, link: &str) -> bool {
        self.set.contains(link)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Toggle `link` and mirror the new set to storage.
    ///
    /// Returns whether the link is now a favorite. A failed write is logged
    /// and otherwise ignored.
    pub async fn toggle(&mut self, link: &str) -> bool {
        self.set = toggle(&self.set, link);
        if let Err(e) = self.persist().await {
            warn!("Failed to persist favorites: {}", e);
        }
        self.contains(link)
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let links: Vec<&String> = self.set.iter().collect();
        let encoded = serde_json::to_string(&links)?;
        self.store.set(&self.key, &encoded).await
    }
}
