use chrono::{DateTime, Utc};
use tracing::warn;

use crate::feed::{FeedEnvelope, NewsItem};
use crate::fetcher::FetchError;

/// What the presentation layer should show for the feed as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// First load still in flight, nothing to show yet
    Loading,
    /// Nothing was ever loaded and the last attempt failed
    Failed,
    Ready,
}

/// Loading, error and data state for the feed.
///
/// A failed fetch never clears items from an earlier success.
#[derive(Debug, Default)]
pub struct FeedState {
    items: Vec<NewsItem>,
    scraped_at: Option<DateTime<Utc>>,
    loading: bool,
    loaded: bool,
    error: Option<FetchError>,
    upstream_error: Option<String>,
}

impl FeedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
    }

    pub fn apply(&mut self, result: Result<FeedEnvelope, FetchError>) {
        self.loading = false;
        match result {
            Ok(envelope) => {
                self.scraped_at = envelope.scraped_at_utc();
                self.upstream_error = envelope.error;
                self.items = envelope.news;
                self.error = None;
                self.loaded = true;
            }
            Err(e) => {
                warn!("Keeping {} items after failed fetch: {}", self.items.len(), e);
                self.error = Some(e);
            }
        }
    }

    pub fn phase(&self) -> Phase {
        if self.loaded {
            Phase::Ready
        } else if self.error.is_some() && !self.loading {
            Phase::Failed
        } else {
            Phase::Loading
        }
    }

    pub fn items(&self) -> &[NewsItem] {
        &self.items
    }

    pub fn scraped_at(&self) -> Option<DateTime<Utc>> {
        self.scraped_at
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn upstream_error(&self) -> Option<&str> {
        self.upstream_error.as_deref()
    }
}
