//! # feedbell
//!
//! Watches syndication feeds and pushes a notification through a
//! topic-based relay (ntfy-compatible) when a feed's newest entry changes.
//!
//! ## Architecture
//!
//! ```text
//! Locator → Fetcher → Normalizer → Fingerprint → Store → Dispatcher
//! ```
//!
//! Duplicate deliveries are suppressed twice: first against a local
//! fingerprint per (topic, feed), then against the relay's own cache of
//! recent messages, so wiping local state or running a second instance
//! does not repeat a notification.
//!
//! ## Quick Start
//!
//! ```bash
//! # Notify on the "rust-blog" topic when the Rust blog publishes
//! feedbell -t rust-blog https://blog.rust-lang.org/
//!
//! # Everything but the final post
//! feedbell --dry-run -vv https://blog.rust-lang.org/feed.xml
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the fetcher,
/// locator, normalizer, dedup store and dispatcher.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Layered configuration: flags, environment, TOML file, defaults.
pub mod config;

/// Core domain types.
///
/// - [`FeedSnapshot`](domain::FeedSnapshot): the leading entry of a feed
/// - [`Fingerprint`](domain::Fingerprint): cksum-based content digest
/// - [`Topic`](domain::Topic): relay channel and the `shortcodify` slug rule
pub mod domain;

/// HTTP capability and feed discovery.
///
/// - [`Fetcher`](fetcher::Fetcher): async trait for GET/POST
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`FeedLocator`](fetcher::FeedLocator): follows `<head>` feed links
pub mod fetcher;

/// Tolerant Atom/RSS scanning and entity decoding.
pub mod normalizer;

/// Relay cache reconciliation and notification posting.
pub mod notify;

/// The per-feed check-and-notify loop.
pub mod pipeline;

/// Dedup record persistence.
///
/// - [`DedupStore`](store::DedupStore): storage trait
/// - [`FileStore`](store::FileStore): one small file per (topic, feed)
/// - [`MemoryStore`](store::MemoryStore): in-process map
pub mod store;
