use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A single article as served by the backend. `link` identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub link: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl NewsItem {
    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedEnvelope {
    pub news: Vec<NewsItem>,
    pub scraped_at: Option<String>,
    /// Scrape failure reported by the backend inside a successful response
    pub error: Option<String>,
}

impl FeedEnvelope {
    /// Decode an envelope without ever failing on its shape.
    ///
    /// A missing or non-array `news` becomes an empty list and entries that
    /// are not valid items are dropped.
    pub fn from_json(value: &Value) -> Self {
        let news = match value.get("news").and_then(Value::as_array) {
            Some(entries) => entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    match NewsItem::deserialize(entry) {
                        Ok(item) => Some(item),
                        Err(e) => {
                            warn!("Skipping malformed news entry #{}: {}", index, e);
                            None
                        }
                    }
                })
                .collect(),
            None => {
                warn!("Feed envelope has no news list, treating it as empty");
                Vec::new()
            }
        };

        let text = |field: &str| value.get(field).and_then(Value::as_str).map(str::to_string);

        Self {
            news,
            scraped_at: text("scraped_at"),
            error: text("error"),
        }
    }

    pub fn scraped_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.scraped_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
