// Copyright 2026 the Bough Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keyed, reference-counted cache with upgrade-only eviction policies.

use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::sync::Arc;

use hashbrown::{DefaultHashBuilder, HashMap};
use parking_lot::Mutex;

/// Eviction eligibility of a cached entry.
///
/// Policies are ordered: `RemoveUnreferenced < KeepForever`. Re-adding an existing key
/// with a higher policy upgrades the entry; a lower policy never downgrades it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Policy {
    /// Drop the entry once nothing outside the cache holds it.
    #[default]
    RemoveUnreferenced,
    /// Keep the entry until [`Cache::remove`] or [`Cache::clear`].
    KeepForever,
}

struct Entry<T: ?Sized> {
    value: Arc<T>,
    policy: Policy,
}

impl<T: ?Sized> Entry<T> {
    fn is_unreferenced(&self) -> bool {
        self.policy == Policy::RemoveUnreferenced && Arc::strong_count(&self.value) == 1
    }
}

/// A thread-safe keyed store of reference-counted values.
///
/// Keys are any [`Hash`] value; the cache stores only their 64-bit hash, computed with a
/// hasher owned by this cache instance. Keys that hash equally are treated as the same key.
///
/// A single mutex guards the map for the duration of every operation. Handles returned
/// from the cache are plain [`Arc`]s and can be cloned and dropped from any thread.
///
/// Eviction is lazy: unreferenced [`Policy::RemoveUnreferenced`] entries are swept only
/// immediately before inserting a key that is not yet present, or by [`Cache::sweep`].
pub struct Cache<T: ?Sized> {
    hasher: DefaultHashBuilder,
    entries: Mutex<HashMap<u64, Entry<T>>>,
}

impl<T: ?Sized> Default for Cache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> fmt::Debug for Cache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.entries.lock();
        let pinned = entries
            .values()
            .filter(|e| e.policy == Policy::KeepForever)
            .count();
        f.debug_struct("Cache")
            .field("len", &entries.len())
            .field("keep_forever", &pinned)
            .finish_non_exhaustive()
    }
}

impl<T: ?Sized> Cache<T> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self {
            hasher: DefaultHashBuilder::default(),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn hash_key<K: Hash + ?Sized>(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }

    /// Look up `key`, returning a new handle to the cached value.
    pub fn get<K: Hash + ?Sized>(&self, key: &K) -> Option<Arc<T>> {
        let hash = self.hash_key(key);
        self.entries.lock().get(&hash).map(|e| Arc::clone(&e.value))
    }

    /// Return the policy currently attached to `key`, if present.
    pub fn policy<K: Hash + ?Sized>(&self, key: &K) -> Option<Policy> {
        let hash = self.hash_key(key);
        self.entries.lock().get(&hash).map(|e| e.policy)
    }

    /// Returns true if `key` is present.
    pub fn contains<K: Hash + ?Sized>(&self, key: &K) -> bool {
        let hash = self.hash_key(key);
        self.entries.lock().contains_key(&hash)
    }

    /// Insert an already shared value under `key`.
    ///
    /// If `key` is present, the existing handle is returned (and `value` dropped) after
    /// upgrading the entry's policy to `policy` when that is higher. Otherwise unreferenced
    /// entries are swept and `value` is inserted.
    pub fn add_arc<K: Hash + ?Sized>(&self, value: Arc<T>, key: &K, policy: Policy) -> Arc<T> {
        self.add_with(key, policy, move || value)
    }

    /// Insert a value produced by `make` under `key`, calling `make` only on a miss.
    ///
    /// Semantics otherwise match [`Cache::add_arc`]. `make` runs while the cache is locked,
    /// so it must not call back into this cache.
    pub fn add_with<K: Hash + ?Sized>(
        &self,
        key: &K,
        policy: Policy,
        make: impl FnOnce() -> Arc<T>,
    ) -> Arc<T> {
        let hash = self.hash_key(key);
        let mut entries = self.entries.lock();
        if let Some(existing) = entries.get_mut(&hash) {
            if policy > existing.policy {
                existing.policy = policy;
            }
            return Arc::clone(&existing.value);
        }

        sweep_entries(&mut entries);

        let value = make();
        entries.insert(
            hash,
            Entry {
                value: Arc::clone(&value),
                policy,
            },
        );
        value
    }

    /// Drop every [`Policy::RemoveUnreferenced`] entry nobody else holds a handle to.
    ///
    /// Insertions already do this lazily; call it directly to release memory early.
    /// Returns the number of entries dropped.
    pub fn sweep(&self) -> usize {
        sweep_entries(&mut self.entries.lock())
    }

    /// Remove `key`, regardless of its policy.
    pub fn remove<K: Hash + ?Sized>(&self, key: &K) {
        let hash = self.hash_key(key);
        self.entries.lock().remove(&hash);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries, including unreferenced ones that have not been swept yet.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn sweep_entries<T: ?Sized>(entries: &mut HashMap<u64, Entry<T>>) -> usize {
    let before = entries.len();
    entries.retain(|_, e| !e.is_unreferenced());
    let swept = before - entries.len();
    if swept > 0 {
        tracing::trace!(swept, "swept unreferenced cache entries");
    }
    swept
}

impl<T> Cache<T> {
    /// Insert `value` under `key`.
    ///
    /// See [`Cache::add_arc`] for the semantics when `key` is already present.
    pub fn add<K: Hash + ?Sized>(&self, value: T, key: &K, policy: Policy) -> Arc<T> {
        self.add_with(key, policy, move || Arc::new(value))
    }
}
