// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Download cache: per-URL results with request coalescing and size-based purging.

use core::fmt;
use core::task::Poll;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, TryRecvError};
use hashbrown::HashMap;
use parking_lot::Mutex;

/// Shared bytes of a completed download.
pub type Payload = Arc<[u8]>;

/// Errors reported by a [`Fetch`] implementation.
///
/// These never reach callers of [`DownloadCache`]: a failed transfer resolves every waiter
/// with `None` and is logged.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The server answered with a status other than 200.
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    /// The transfer failed before a response was received.
    #[error("transport error: {0}")]
    Transport(String),
    /// No network layer is configured.
    #[error("downloads are not supported by this fetcher")]
    Unsupported,
}

/// Performs a single blocking transfer.
///
/// Implementations are supplied by the network layer. `fetch` runs on a worker, never on
/// the frame loop.
pub trait Fetch: Send + Sync + 'static {
    /// Fetch the body at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// A [`Fetch`] that fails every request.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnsupportedFetch;

impl Fetch for UnsupportedFetch {
    fn fetch(&self, _url: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Unsupported)
    }
}

/// Runs download tasks off the frame loop.
pub trait Spawn: Send + Sync + 'static {
    /// Run `task` to completion, typically on another thread.
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>);
}

/// Spawns one named OS thread per transfer.
#[derive(Copy, Clone, Debug, Default)]
pub struct ThreadSpawner;

impl Spawn for ThreadSpawner {
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        // `Builder::spawn` consumes the task even on failure, so hand it over through a slot
        // that can be reclaimed if no thread was created.
        let slot = Arc::new(Mutex::new(Some(task)));
        let worker_slot = Arc::clone(&slot);
        let spawned = std::thread::Builder::new()
            .name("bough-download".into())
            .spawn(move || {
                if let Some(task) = worker_slot.lock().take() {
                    task();
                }
            });
        if let Err(err) = spawned {
            tracing::warn!(%err, "failed to spawn download worker; running inline");
            if let Some(task) = slot.lock().take() {
                task();
            }
        }
    }
}

/// Runs every task immediately on the calling thread.
///
/// Useful in tests and in environments without threads.
#[derive(Copy, Clone, Debug, Default)]
pub struct InlineSpawner;

impl Spawn for InlineSpawner {
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        task();
    }
}

/// Configuration for a [`DownloadCache`].
#[derive(Clone, Debug)]
pub struct DownloadConfig {
    /// Ceiling applied with [`DownloadCache::purge`] after every completed transfer.
    ///
    /// `None` disables automatic purging.
    pub max_bytes: Option<usize>,
}

impl DownloadConfig {
    /// Default ceiling for cached downloads: 100 MiB.
    pub const DEFAULT_MAX_BYTES: usize = 100 * 1024 * 1024;
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            max_bytes: Some(Self::DEFAULT_MAX_BYTES),
        }
    }
}

/// A download result that may not have arrived yet.
///
/// Poll it once per frame with [`Pending::poll`]; the result is `None` if the transfer
/// failed.
pub struct Pending {
    state: PendingState,
}

enum PendingState {
    Ready(Option<Payload>),
    Waiting(Receiver<Option<Payload>>),
}

impl fmt::Debug for Pending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.state {
            PendingState::Ready(Some(_)) => "ready",
            PendingState::Ready(None) => "failed",
            PendingState::Waiting(_) => "waiting",
        };
        f.debug_struct("Pending").field("state", &state).finish()
    }
}

impl Pending {
    fn ready(result: Option<Payload>) -> Self {
        Self {
            state: PendingState::Ready(result),
        }
    }

    /// Check for the result without blocking.
    pub fn poll(&mut self) -> Poll<Option<Payload>> {
        match &self.state {
            PendingState::Ready(result) => Poll::Ready(result.clone()),
            PendingState::Waiting(rx) => {
                let result = match rx.try_recv() {
                    Ok(result) => result,
                    Err(TryRecvError::Empty) => return Poll::Pending,
                    // The worker went away without answering.
                    Err(TryRecvError::Disconnected) => None,
                };
                self.state = PendingState::Ready(result.clone());
                Poll::Ready(result)
            }
        }
    }

    /// Returns true once a result is available.
    pub fn is_ready(&mut self) -> bool {
        self.poll().is_ready()
    }

    /// Block until the result is available.
    pub fn wait(self) -> Option<Payload> {
        match self.state {
            PendingState::Ready(result) => result,
            PendingState::Waiting(rx) => rx.recv().ok().flatten(),
        }
    }
}

#[derive(Default)]
struct DownloadInfo {
    result: Option<Payload>,
    in_flight: u32,
    waiters: Vec<Sender<Option<Payload>>>,
    last_used: u64,
}

impl DownloadInfo {
    /// Approximate bytes retained by the entry, keyed under `url`.
    fn byte_size(&self, url: &str) -> usize {
        size_of::<Self>() + url.len() + self.result.as_ref().map_or(0, |r| r.len())
    }
}

#[derive(Default)]
struct Downloads {
    infos: HashMap<String, DownloadInfo>,
    tick: u64,
    transfers: u64,
}

impl Downloads {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn byte_size(&self) -> usize {
        self.infos.iter().map(|(url, info)| info.byte_size(url)).sum()
    }

    fn purge(&mut self, max_bytes: usize) -> usize {
        let mut total = self.byte_size();
        if total <= max_bytes {
            return 0;
        }
        let mut idle: Vec<(u64, String)> = self
            .infos
            .iter()
            .filter(|(_, info)| info.in_flight == 0)
            .map(|(url, info)| (info.last_used, url.clone()))
            .collect();
        idle.sort_unstable();

        let mut removed = 0;
        for (_, url) in idle {
            if total <= max_bytes {
                break;
            }
            if let Some(info) = self.infos.remove(&url) {
                total -= info.byte_size(&url);
                removed += 1;
            }
        }
        removed
    }
}

struct Shared {
    downloads: Mutex<Downloads>,
    fetch: Arc<dyn Fetch>,
    config: DownloadConfig,
}

impl Shared {
    fn complete(&self, url: &str, result: Option<Payload>) {
        let waiters = {
            let mut downloads = self.downloads.lock();
            let tick = downloads.next_tick();
            let info = downloads.infos.entry_ref(url).or_default();
            info.in_flight = info.in_flight.saturating_sub(1);
            info.last_used = tick;
            if result.is_some() {
                info.result = result.clone();
            }
            let waiters = core::mem::take(&mut info.waiters);
            if let Some(max) = self.config.max_bytes {
                let purged = downloads.purge(max);
                if purged > 0 {
                    tracing::debug!(purged, max, "purged download cache after transfer");
                }
            }
            waiters
        };
        for waiter in waiters {
            // A dropped `Pending` simply stops listening.
            let _ = waiter.send(result.clone());
        }
    }
}

/// Per-URL download store with coalescing and LRU purging.
///
/// - At most one transfer per URL is in flight. Requests made while a transfer is running
///   attach to it, and every one of them receives the same [`Payload`].
/// - The last successful result per URL is cached and served immediately by
///   [`DownloadCache::download`].
/// - Failed transfers resolve all waiters with `None`; nothing is retried.
///
/// Cloning a `DownloadCache` yields another handle to the same store.
#[derive(Clone)]
pub struct DownloadCache {
    shared: Arc<Shared>,
    spawner: Arc<dyn Spawn>,
}

impl fmt::Debug for DownloadCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let downloads = self.shared.downloads.lock();
        f.debug_struct("DownloadCache")
            .field("entries", &downloads.infos.len())
            .field("transfers", &downloads.transfers)
            .field("config", &self.shared.config)
            .finish_non_exhaustive()
    }
}

impl DownloadCache {
    /// Create a download cache that runs transfers on [`ThreadSpawner`] workers.
    pub fn new(fetch: Arc<dyn Fetch>, config: DownloadConfig) -> Self {
        Self::with_spawner(fetch, ThreadSpawner, config)
    }

    /// Create a download cache that runs transfers through `spawner`.
    pub fn with_spawner(
        fetch: Arc<dyn Fetch>,
        spawner: impl Spawn,
        config: DownloadConfig,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                downloads: Mutex::new(Downloads::default()),
                fetch,
                config,
            }),
            spawner: Arc::new(spawner),
        }
    }

    /// Request `url`, serving a cached result when one exists.
    pub fn download(&self, url: &str) -> Pending {
        self.request(url, true)
    }

    /// Request `url`, ignoring any cached result.
    ///
    /// A transfer already in flight for `url` is still joined rather than duplicated.
    pub fn download_uncached(&self, url: &str) -> Pending {
        self.request(url, false)
    }

    fn request(&self, url: &str, use_cache: bool) -> Pending {
        let (tx, rx) = crossbeam_channel::bounded(1);
        {
            let mut downloads = self.shared.downloads.lock();
            let tick = downloads.next_tick();
            let info = downloads.infos.entry_ref(url).or_default();
            info.last_used = tick;
            if use_cache && let Some(result) = &info.result {
                return Pending::ready(Some(Arc::clone(result)));
            }
            info.waiters.push(tx);
            if info.in_flight > 0 {
                tracing::trace!(url, "joining in-flight download");
                return Pending {
                    state: PendingState::Waiting(rx),
                };
            }
            info.in_flight += 1;
            downloads.transfers += 1;
        }

        tracing::debug!(url, "starting download");
        let shared = Arc::clone(&self.shared);
        let url = url.to_owned();
        self.spawner.spawn(Box::new(move || {
            let result = match shared.fetch.fetch(&url) {
                Ok(bytes) => Some(Payload::from(bytes)),
                Err(err) => {
                    tracing::warn!(url = %url, %err, "download failed");
                    None
                }
            };
            shared.complete(&url, result);
        }));

        Pending {
            state: PendingState::Waiting(rx),
        }
    }

    /// The cached result for `url`, without starting a transfer.
    pub fn cached(&self, url: &str) -> Option<Payload> {
        self.shared
            .downloads
            .lock()
            .infos
            .get(url)
            .and_then(|info| info.result.clone())
    }

    /// Returns true while a transfer for `url` is running.
    pub fn is_in_flight(&self, url: &str) -> bool {
        self.shared
            .downloads
            .lock()
            .infos
            .get(url)
            .is_some_and(|info| info.in_flight > 0)
    }

    /// Number of URLs with a cached result.
    pub fn cached_downloads(&self) -> usize {
        self.shared
            .downloads
            .lock()
            .infos
            .values()
            .filter(|info| info.result.is_some())
            .count()
    }

    /// Total number of transfers started by this cache.
    pub fn transfers_started(&self) -> u64 {
        self.shared.downloads.lock().transfers
    }

    /// Approximate number of bytes held, including per-entry bookkeeping.
    pub fn byte_size(&self) -> usize {
        self.shared.downloads.lock().byte_size()
    }

    /// Remove least recently used entries that are not in flight until the cache holds at
    /// most `max_bytes`, or only in-flight entries remain.
    ///
    /// Returns the number of entries removed. Any ceiling is valid, including zero.
    pub fn purge(&self, max_bytes: usize) -> usize {
        let removed = self.shared.downloads.lock().purge(max_bytes);
        if removed > 0 {
            tracing::debug!(removed, max_bytes, "purged download cache");
        }
        removed
    }
}
