// In-process cache storage for hosts without the browser Cache API.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use async_trait::async_trait;

use super::{CacheStorage, Request, Response};
use crate::error::Result;

/// Operation counters, handy when checking what a strategy touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub lookups: usize,
    pub writes: usize,
    pub deletes: usize,
}

/// Partitions are kept in creation order, which is the order lookups
/// search them in.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    partitions: RefCell<Vec<(String, HashMap<String, Response>)>>,
    stats: Cell<StorageStats>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without touching the counters.
    pub fn insert(&self, cache: &str, url: &str, response: Response) {
        let mut partitions = self.partitions.borrow_mut();
        let idx = match partitions.iter().position(|(name, _)| name == cache) {
            Some(idx) => idx,
            None => {
                partitions.push((cache.to_string(), HashMap::new()));
                partitions.len() - 1
            }
        };
        partitions[idx].1.insert(url.to_string(), response);
    }

    /// Number of entries in one partition.
    pub fn len_of(&self, cache: &str) -> usize {
        self.partitions
            .borrow()
            .iter()
            .find(|(name, _)| name == cache)
            .map_or(0, |(_, entries)| entries.len())
    }

    pub fn stats(&self) -> StorageStats {
        self.stats.get()
    }

    fn bump(&self, f: impl FnOnce(&mut StorageStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

#[async_trait(?Send)]
impl CacheStorage for MemoryCacheStorage {
    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self
            .partitions
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn delete(&self, cache: &str) -> Result<bool> {
        self.bump(|s| s.deletes += 1);
        let mut partitions = self.partitions.borrow_mut();
        let before = partitions.len();
        partitions.retain(|(name, _)| name != cache);
        Ok(partitions.len() != before)
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        self.bump(|s| s.lookups += 1);
        let key = request.cache_key();
        Ok(self
            .partitions
            .borrow()
            .iter()
            .find_map(|(_, entries)| entries.get(&key).cloned()))
    }

    async fn lookup_in(&self, cache: &str, request: &Request) -> Result<Option<Response>> {
        self.bump(|s| s.lookups += 1);
        let key = request.cache_key();
        Ok(self
            .partitions
            .borrow()
            .iter()
            .find(|(name, _)| name == cache)
            .and_then(|(_, entries)| entries.get(&key).cloned()))
    }

    async fn put(&self, cache: &str, request: &Request, response: Response) -> Result<()> {
        self.bump(|s| s.writes += 1);
        self.insert(cache, &request.cache_key(), response);
        Ok(())
    }
}
