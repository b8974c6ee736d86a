// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for `DownloadCache` running transfers on real worker threads.
//!
//! These exercise coalescing of concurrent requests and non-blocking polling.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::task::Poll;

use bough_cache::{DownloadCache, DownloadConfig, Fetch, FetchError};
use crossbeam_channel::{Receiver, Sender};

/// Blocks every transfer until the test releases it.
struct Gated {
    calls: AtomicUsize,
    gate: Receiver<()>,
}

impl Fetch for Gated {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate
            .recv()
            .map_err(|_| FetchError::Transport("gate closed".into()))?;
        Ok(format!("body of {url}").into_bytes())
    }
}

fn gated() -> (Arc<Gated>, Sender<()>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (
        Arc::new(Gated {
            calls: AtomicUsize::new(0),
            gate: rx,
        }),
        tx,
    )
}

#[test]
fn concurrent_requests_share_one_transfer() {
    let (fetch, release) = gated();
    let cache = DownloadCache::new(fetch.clone(), DownloadConfig::default());

    let mut first = cache.download("https://example.com/img.png");
    let mut second = cache.download("https://example.com/img.png");
    assert!(cache.is_in_flight("https://example.com/img.png"));
    assert!(first.poll().is_pending(), "transfer is still gated");
    assert!(second.poll().is_pending(), "transfer is still gated");

    release.send(()).expect("worker waiting on gate");

    let a = first.wait().expect("first result");
    let b = second.wait().expect("second result");
    assert!(Arc::ptr_eq(&a, &b), "coalesced waiters share one payload");
    assert_eq!(&*a, b"body of https://example.com/img.png");
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.transfers_started(), 1);
}

#[test]
fn uncached_request_joins_in_flight_transfer() {
    let (fetch, release) = gated();
    let cache = DownloadCache::new(fetch.clone(), DownloadConfig::default());

    let first = cache.download("u");
    let second = cache.download_uncached("u");
    release.send(()).expect("worker waiting on gate");

    let a = first.wait().expect("first result");
    let b = second.wait().expect("second result");
    assert!(Arc::ptr_eq(&a, &b), "uncached request still coalesces");
    assert_eq!(fetch.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn purge_skips_in_flight_entries() {
    let (fetch, release) = gated();
    let cache = DownloadCache::new(fetch, DownloadConfig { max_bytes: None });

    let pending = cache.download("slow");
    assert_eq!(cache.purge(0), 0, "in-flight entries are never purged");
    assert!(cache.is_in_flight("slow"));

    release.send(()).expect("worker waiting on gate");
    assert!(pending.wait().is_some());
    assert_eq!(cache.purge(0), 1);
}

#[test]
fn dropped_pending_does_not_disturb_other_waiters() {
    let (fetch, release) = gated();
    let cache = DownloadCache::new(fetch, DownloadConfig::default());

    let dropped = cache.download("x");
    let mut kept = cache.download("x");
    drop(dropped);
    release.send(()).expect("worker waiting on gate");

    let result = loop {
        if let Poll::Ready(result) = kept.poll() {
            break result;
        }
        std::thread::yield_now();
    };
    assert!(result.is_some());
}
