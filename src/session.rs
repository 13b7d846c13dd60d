use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use crate::favorites::Favorites;
use crate::feed::NewsItem;
use crate::filter::filter_items;
use crate::query::DebouncedQuery;
use crate::scheduler::RefreshEvent;
use crate::state::FeedState;
use crate::store::KeyValueStore;
use crate::theme::{Theme, ThemeController};

/// Everything the presentation layer reads, plus the actions it can take.
pub struct Session<S> {
    feed: FeedState,
    query: DebouncedQuery,
    favorites: Favorites<S>,
    theme: ThemeController<S>,
}

impl<S: KeyValueStore> Session<S> {
    pub async fn new(
        store: Arc<S>,
        namespace: &str,
        debounce: Duration,
        system_dark: Option<bool>,
    ) -> Self {
        let favorites = Favorites::load(store.clone(), namespace).await;
        let theme = ThemeController::initialize(store, namespace, system_dark).await;

        Self {
            feed: FeedState::new(),
            query: DebouncedQuery::new(debounce),
            favorites,
            theme,
        }
    }

    pub fn handle_event(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::Started(trigger) => {
                debug!("Fetch started ({:?})", trigger);
                self.feed.begin_fetch();
            }
            RefreshEvent::Finished(outcome) => self.feed.apply(outcome.result),
        }
    }

    pub fn on_search_input(&mut self, raw: impl Into<String>, now: Instant) {
        self.query.on_input(raw, now);
    }

    /// Apply pending search input if it has been idle long enough.
    pub fn poll_query(&mut self, now: Instant) -> bool {
        self.query.poll(now).is_some()
    }

    pub fn search_deadline(&self) -> Option<Instant> {
        self.query.deadline()
    }

    pub fn visible_items(&self) -> Vec<&NewsItem> {
        filter_items(self.feed.items(), self.query.committed())
    }

    /// Toggle the favorite flag of the item at `index` in the visible list.
    ///
    /// Returns the new flag, or `None` if there is no such item.
    pub async fn toggle_favorite(&mut self, index: usize) -> Option<bool> {
        let link = self.visible_items().get(index)?.link.clone();
        Some(self.favorites.toggle(&link).await)
    }

    pub fn is_favorite(&self, link: &str) -> bool {
        self.favorites.contains(link)
    }

    pub async fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle().await
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    pub fn feed(&self) -> &FeedState {
        &self.feed
    }

    pub fn query(&self) -> &DebouncedQuery {
        &self.query
    }

    /// Drop pending timers owned by the session.
    pub fn shutdown(&mut self) {
        self.query.cancel();
    }
}
