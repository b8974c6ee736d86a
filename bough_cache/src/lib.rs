// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bough Cache: shared resource caches for the Bough view engine.
//!
//! This crate provides the two caches every loaded resource in Bough funnels through:
//!
//! - [`Cache`]: a thread-safe keyed store of reference-counted values with an
//!   upgrade-only eviction [`Policy`]. Shader, texture and font caches are all `Cache`s.
//! - [`DownloadCache`]: a per-URL download store that coalesces concurrent requests
//!   for the same URL into a single transfer and can be purged down to a byte ceiling.
//!
//! ## Cache
//!
//! Values are handed out as [`Arc`](std::sync::Arc) handles. An entry added with
//! [`Policy::RemoveUnreferenced`] is dropped lazily, the next time a new key is inserted
//! after every external handle is gone. [`Policy::KeepForever`] entries stay until they
//! are removed explicitly.
//!
//! ```
//! use bough_cache::{Cache, Policy};
//!
//! let cache: Cache<String> = Cache::new();
//! let handle = cache.add("hello".to_string(), "greeting", Policy::RemoveUnreferenced);
//! assert_eq!(cache.get("greeting").as_deref(), Some(&"hello".to_string()));
//!
//! drop(handle);
//! cache.add("other".to_string(), "other", Policy::RemoveUnreferenced);
//! assert!(cache.get("greeting").is_none());
//! ```
//!
//! ## Downloads
//!
//! Transfers are performed by a [`Fetch`] implementation on a worker provided by a
//! [`Spawn`] implementation. Each request returns a [`Pending`] handle which a frame
//! loop polls without blocking.
//!
//! ```
//! use std::sync::Arc;
//! use bough_cache::{DownloadCache, DownloadConfig, Fetch, FetchError, InlineSpawner};
//!
//! struct Echo;
//! impl Fetch for Echo {
//!     fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
//!         Ok(url.as_bytes().to_vec())
//!     }
//! }
//!
//! let downloads = DownloadCache::with_spawner(Arc::new(Echo), InlineSpawner, DownloadConfig::default());
//! let pending = downloads.download("https://example.com/a");
//! assert_eq!(pending.wait().as_deref(), Some(&b"https://example.com/a"[..]));
//! assert_eq!(downloads.cached_downloads(), 1);
//! ```

mod cache;
mod download;

pub use cache::{Cache, Policy};
pub use download::{
    DownloadCache, DownloadConfig, Fetch, FetchError, InlineSpawner, Payload, Pending, Spawn,
    ThreadSpawner, UnsupportedFetch,
};
