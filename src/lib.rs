//! newsdeck - a terminal client for a scraped news feed
//!
//! Fetches the article list from a news backend, refreshes it on a timer,
//! filters it with debounced search and keeps favorites and the colour
//! theme in a persistent key-value store.

pub mod config;
pub mod favorites;
pub mod feed;
pub mod fetcher;
pub mod filter;
pub mod input;
pub mod query;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod store;
pub mod theme;
pub mod view;
