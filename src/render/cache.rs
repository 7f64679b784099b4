//! Caches shared by every grid in a registry.
//!
//! `LruCache` is a small bounded map with recency ordering. `ImageCache`
//! builds on it to hold decoded images keyed by URL, tracks which grids are
//! waiting on an in-flight load, and hands out the URLs that still need a
//! request.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::hash::Hash;

use crate::types::GridId;

/// Default number of decoded images kept per registry.
pub const DEFAULT_IMAGE_CAPACITY: usize = 256;

/// A simple LRU cache with a fixed capacity.
///
/// When the cache exceeds capacity, the least recently used entry is
/// evicted. `get` promotes the entry it finds.
pub struct LruCache<K: Hash + Eq + Clone, V> {
    entries: HashMap<K, V>,
    order: VecDeque<K>,
    capacity: usize,
}

impl<K: Hash + Eq + Clone, V> LruCache<K, V> {
    /// Create a new cache with the given capacity.
    ///
    /// A capacity of 0 disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity,
        }
    }

    /// Look up a value by key and mark it most recently used.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        if !self.entries.contains_key(key) {
            return None;
        }
        self.touch(key);
        self.entries.get(key)
    }

    /// Look up without changing recency.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Insert or replace a value. Returns the keys evicted to make room.
    pub fn insert(&mut self, key: K, value: V) -> Vec<K> {
        if self.capacity == 0 {
            return Vec::new();
        }
        self.insert_pinned(key, value, |_| false)
    }

    /// Insert or replace a value, evicting only keys `pinned` rejects.
    ///
    /// Pinned entries are stored even past capacity (including a capacity of
    /// 0) and stay until a later eviction finds them unpinned.
    pub fn insert_pinned(&mut self, key: K, value: V, pinned: impl Fn(&K) -> bool) -> Vec<K> {
        if self.entries.insert(key.clone(), value).is_some() {
            self.touch(&key);
        } else {
            self.order.push_back(key);
        }
        self.evict_unpinned(pinned)
    }

    /// Evict the oldest unpinned entries until at or below capacity.
    pub fn evict_unpinned(&mut self, pinned: impl Fn(&K) -> bool) -> Vec<K> {
        let mut evicted = Vec::new();
        let mut kept = Vec::new();
        while self.entries.len() > self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            if pinned(&oldest) {
                kept.push(oldest);
            } else {
                self.entries.remove(&oldest);
                evicted.push(oldest);
            }
        }
        for key in kept.into_iter().rev() {
            self.order.push_front(key);
        }
        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn touch(&mut self, key: &K) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            if let Some(k) = self.order.remove(pos) {
                self.order.push_back(k);
            }
        }
    }
}

/// What a frame can do with an image URL right now.
#[derive(Debug)]
pub enum ImageLookup<'a, I> {
    Ready(&'a I),
    Pending,
    Failed,
}

/// Bounded image cache with load tracking.
///
/// URLs a grid looked up during its latest frame are pinned: eviction never
/// drops them, so a frame showing more images than the capacity keeps them
/// all instead of reloading one for every other that lands.
pub struct ImageCache<I> {
    loaded: LruCache<String, Option<I>>,
    pending: HashMap<String, BTreeSet<GridId>>,
    requests: Vec<String>,
    in_use: HashMap<GridId, HashSet<String>>,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self::new(DEFAULT_IMAGE_CAPACITY)
    }
}

impl<I> ImageCache<I> {
    pub fn new(capacity: usize) -> Self {
        Self {
            loaded: LruCache::new(capacity),
            pending: HashMap::new(),
            requests: Vec::new(),
            in_use: HashMap::new(),
        }
    }

    /// `grid` starts a frame; the URLs its previous frame used are unpinned.
    pub fn begin_frame(&mut self, grid: GridId) {
        if let Some(urls) = self.in_use.get_mut(&grid) {
            urls.clear();
        }
    }

    /// `grid` finished a frame. Entries no grid's latest frame uses are
    /// evicted down to capacity.
    pub fn end_frame(&mut self, grid: GridId) {
        if self.in_use.get(&grid).is_some_and(HashSet::is_empty) {
            self.in_use.remove(&grid);
        }
        let in_use = &self.in_use;
        let evicted = self.loaded.evict_unpinned(|url| is_pinned(in_use, url));
        for url in evicted {
            tracing::debug!(url = %url, "image evicted");
        }
    }

    /// Look up `url` for `waiter`. Unknown URLs become pending and are queued
    /// for loading; the waiter is remembered either way until the load ends.
    pub fn lookup(&mut self, url: &str, waiter: GridId) -> ImageLookup<'_, I> {
        let key = url.to_string();
        self.in_use.entry(waiter).or_default().insert(key.clone());
        if self.loaded.contains_key(&key) {
            return match self.loaded.get(&key) {
                Some(Some(image)) => ImageLookup::Ready(image),
                _ => ImageLookup::Failed,
            };
        }
        let waiters = self.pending.entry(key).or_insert_with(|| {
            self.requests.push(url.to_string());
            BTreeSet::new()
        });
        waiters.insert(waiter);
        ImageLookup::Pending
    }

    /// URLs that became pending since the last call.
    pub fn take_requests(&mut self) -> Vec<String> {
        std::mem::take(&mut self.requests)
    }

    /// Store a decoded image and return the grids that were waiting for it.
    pub fn complete(&mut self, url: &str, image: I) -> Vec<GridId> {
        self.finish(url, Some(image))
    }

    /// Record a failed load so it is not retried. Returns the former waiters.
    pub fn fail(&mut self, url: &str) -> Vec<GridId> {
        self.finish(url, None)
    }

    fn finish(&mut self, url: &str, image: Option<I>) -> Vec<GridId> {
        let waiters = self.pending.remove(url).unwrap_or_default();
        let in_use = &self.in_use;
        let evicted = self
            .loaded
            .insert_pinned(url.to_string(), image, |key| is_pinned(in_use, key));
        for evicted in evicted {
            tracing::debug!(url = %evicted, "image evicted");
        }
        waiters.into_iter().collect()
    }

    /// Forget `waiter` everywhere. Loads nobody waits for any more are
    /// dropped and their URLs returned so the caller can cancel them.
    pub fn release_waiter(&mut self, waiter: GridId) -> Vec<String> {
        self.in_use.remove(&waiter);
        let mut abandoned = Vec::new();
        self.pending.retain(|url, waiters| {
            waiters.remove(&waiter);
            if waiters.is_empty() {
                abandoned.push(url.clone());
                false
            } else {
                true
            }
        });
        self.requests.retain(|url| !abandoned.contains(url));
        abandoned.sort();
        abandoned
    }

    pub fn is_pending(&self, url: &str) -> bool {
        self.pending.contains_key(url)
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        matches!(self.loaded.peek(&url.to_string()), Some(Some(_)))
    }

    /// Number of finished entries (loaded or failed).
    pub fn len(&self) -> usize {
        self.loaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.loaded.clear();
        self.pending.clear();
        self.requests.clear();
        self.in_use.clear();
    }
}

fn is_pinned(in_use: &HashMap<GridId, HashSet<String>>, url: &str) -> bool {
    in_use.values().any(|urls| urls.contains(url))
}
