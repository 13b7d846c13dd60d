use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::store::{namespaced, KeyValueStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        Theme::from_dark(!self.is_dark())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the terminal advertises a dark background via `COLORFGBG`.
pub fn system_prefers_dark() -> Option<bool> {
    let value = std::env::var("COLORFGBG").ok()?;
    prefers_dark_from_colorfgbg(&value)
}

/// Interpret a `COLORFGBG` value such as `15;0` or `0;default;15`.
///
/// The last field is the background colour index: the first seven ANSI
/// colours and bright black (8) are dark, white and the other bright
/// colours are light.
pub fn prefers_dark_from_colorfgbg(value: &str) -> Option<bool> {
    let background: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    match background {
        0..=6 | 8 => Some(true),
        7 | 9..=15 => Some(false),
        _ => None,
    }
}

pub struct ThemeController<S> {
    store: Arc<S>,
    key: String,
    theme: Theme,
}

impl<S: KeyValueStore> ThemeController<S> {
    /// Persisted theme first, then the system signal, then light.
    pub async fn initialize(store: Arc<S>, namespace: &str, system_dark: Option<bool>) -> Self {
        let key = namespaced(namespace, "theme");

        let persisted = match store.get(&key).await {
            Some(raw) => {
                let parsed = Theme::parse(&raw);
                if parsed.is_none() {
                    warn!("Ignoring unknown persisted theme '{}'", raw);
                }
                parsed
            }
            None => None,
        };

        let theme = persisted
            .or_else(|| system_dark.map(Theme::from_dark))
            .unwrap_or_default();
        debug!("Initial theme: {}", theme);

        Self { store, key, theme }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub async fn set(&mut self, theme: Theme) {
        if let Err(e) = self.store.set(&self.key, theme.as_str()).await {
            warn!("Failed to persist theme: {}", e);
        }
        self.theme = theme;
        info!("Theme set to {}", theme);
    }

    pub async fn toggle(&mut self) -> Theme {
        let next = self.theme().toggled();
        self.set(next).await;
        next
    }
}
