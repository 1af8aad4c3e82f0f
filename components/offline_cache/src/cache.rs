//! Cache Storage: named, versioned buckets of response snapshots.
//!
//! Each bucket maps a (method, URL) key to a full response. Entries are
//! only ever replaced wholesale, so concurrent requests can read and write
//! a bucket without coordination beyond the per-bucket lock; the last
//! write for a key wins.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CacheError;
use crate::http::{CacheKey, Method, Request, Response};
use crate::origin::Origin;

// ============================================================================
// Accounting
// ============================================================================

/// Read/write counters shared by every bucket of a storage
#[derive(Debug, Default)]
struct Counters {
    reads: AtomicU64,
    hits: AtomicU64,
    writes: AtomicU64,
}

/// Point-in-time view of cache traffic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups performed, hit or miss
    pub reads: u64,
    /// Lookups that found an entry
    pub hits: u64,
    /// Entries stored
    pub writes: u64,
}

/// Byte budget shared by every bucket of a storage
#[derive(Debug)]
struct Quota {
    limit: Option<usize>,
    used: AtomicUsize,
}

impl Quota {
    fn available(&self) -> usize {
        match self.limit {
            Some(limit) => limit.saturating_sub(self.used.load(Ordering::SeqCst)),
            None => usize::MAX,
        }
    }

    /// Check that replacing `freed` bytes with `needed` bytes fits the budget
    fn check(&self, needed: usize, freed: usize) -> Result<(), CacheError> {
        let available = self.available().saturating_add(freed);
        if needed > available {
            return Err(CacheError::QuotaExceeded { needed, available });
        }
        Ok(())
    }

    fn commit(&self, added: usize, freed: usize) {
        self.used.fetch_add(added, Ordering::SeqCst);
        self.used.fetch_sub(freed, Ordering::SeqCst);
    }
}

// ============================================================================
// Cache bucket
// ============================================================================

/// A single cache bucket in the Cache Storage
pub struct Cache {
    /// Cache name, embeds the deployment version
    name: String,
    /// Cached entries ((method, URL) -> Response)
    entries: RwLock<HashMap<CacheKey, Response>>,
    counters: Arc<Counters>,
    quota: Arc<Quota>,
}

impl Cache {
    fn new(name: String, counters: Arc<Counters>, quota: Arc<Quota>) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            counters,
            quota,
        }
    }

    /// Get the cache name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Match a request against the cache
    pub fn match_request(&self, request: &Request) -> Option<Response> {
        self.lookup(&request.cache_key())
    }

    /// Match a GET of `url` against the cache
    pub fn match_url(&self, url: &Url) -> Option<Response> {
        self.lookup(&CacheKey::get(url))
    }

    fn lookup(&self, key: &CacheKey) -> Option<Response> {
        self.counters.reads.fetch_add(1, Ordering::SeqCst);
        let found = self.entries.read().get(key).cloned();
        if found.is_some() {
            self.counters.hits.fetch_add(1, Ordering::SeqCst);
        }
        found
    }

    /// Store a response for a request, replacing any previous entry
    pub fn put(&self, request: &Request, response: Response) -> Result<(), CacheError> {
        if request.method != Method::Get {
            return Err(CacheError::UnsupportedMethod(request.method));
        }
        self.put_all(vec![(request.cache_key(), response)])
    }

    /// Store several entries at once. Either every entry is stored or none.
    /// A key repeated within the batch keeps its last response.
    pub fn put_all(&self, batch: Vec<(CacheKey, Response)>) -> Result<(), CacheError> {
        if batch.iter().any(|(_, response)| response.status == 206) {
            return Err(CacheError::PartialResponse);
        }
        if let Some((key, _)) = batch.iter().find(|(key, _)| key.method != Method::Get) {
            return Err(CacheError::UnsupportedMethod(key.method));
        }
        let batch: HashMap<CacheKey, Response> = batch.into_iter().collect();

        let mut entries = self.entries.write();
        let needed: usize = batch.iter().map(|(_, r)| r.byte_len()).sum();
        let freed: usize = batch
            .iter()
            .filter_map(|(key, _)| entries.get(key))
            .map(Response::byte_len)
            .sum();
        self.quota.check(needed, freed)?;

        let count = batch.len() as u64;
        for (key, response) in batch {
            entries.insert(key, response);
        }
        self.quota.commit(needed, freed);
        self.counters.writes.fetch_add(count, Ordering::SeqCst);
        Ok(())
    }

    /// Delete a cached entry
    pub fn delete(&self, request: &Request) -> bool {
        let removed = self.entries.write().remove(&request.cache_key());
        match removed {
            Some(response) => {
                self.quota.commit(0, response.byte_len());
                true
            }
            None => false,
        }
    }

    /// Get all cached request keys
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of stored entries
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the bucket has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn byte_len(&self) -> usize {
        self.entries.read().values().map(Response::byte_len).sum()
    }
}

impl std::fmt::Debug for Cache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("entry_count", &self.len())
            .finish()
    }
}

// ============================================================================
// Cache storage
// ============================================================================

#[derive(Serialize, Deserialize)]
struct BucketSnapshot {
    name: String,
    entries: Vec<(CacheKey, Response)>,
}

/// Cache Storage API for one origin
pub struct CacheStorage {
    /// All caches, in creation order
    caches: RwLock<Vec<Arc<Cache>>>,
    /// Origin for this storage
    origin: Origin,
    counters: Arc<Counters>,
    quota: Arc<Quota>,
}

impl CacheStorage {
    /// Create a new cache storage without a byte quota
    pub fn new(origin: Origin) -> Self {
        Self::build(origin, None)
    }

    /// Create a cache storage limited to `bytes` of stored responses
    pub fn with_quota(origin: Origin, bytes: usize) -> Self {
        Self::build(origin, Some(bytes))
    }

    fn build(origin: Origin, limit: Option<usize>) -> Self {
        Self {
            caches: RwLock::new(Vec::new()),
            origin,
            counters: Arc::new(Counters::default()),
            quota: Arc::new(Quota {
                limit,
                used: AtomicUsize::new(0),
            }),
        }
    }

    /// Origin this storage belongs to
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Open a cache (creates if doesn't exist)
    pub fn open(&self, name: &str) -> Arc<Cache> {
        let mut caches = self.caches.write();
        if let Some(cache) = caches.iter().find(|c| c.name() == name) {
            return Arc::clone(cache);
        }
        let cache = Arc::new(Cache::new(
            name.to_string(),
            Arc::clone(&self.counters),
            Arc::clone(&self.quota),
        ));
        caches.push(Arc::clone(&cache));
        cache
    }

    /// Check if a cache exists
    pub fn has(&self, name: &str) -> bool {
        self.caches.read().iter().any(|c| c.name() == name)
    }

    /// Delete a cache and release its quota
    pub fn delete(&self, name: &str) -> bool {
        let mut caches = self.caches.write();
        match caches.iter().position(|c| c.name() == name) {
            Some(idx) => {
                let cache = caches.remove(idx);
                self.quota.commit(0, cache.byte_len());
                true
            }
            None => false,
        }
    }

    /// Get all cache names, in creation order
    pub fn keys(&self) -> Vec<String> {
        self.caches
            .read()
            .iter()
            .map(|c| c.name().to_string())
            .collect()
    }

    /// Match a request against all caches, oldest first
    pub fn match_request(&self, request: &Request) -> Option<Response> {
        let caches = self.caches.read().clone();
        caches.iter().find_map(|cache| cache.match_request(request))
    }

    /// Traffic counters across all buckets
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            reads: self.counters.reads.load(Ordering::SeqCst),
            hits: self.counters.hits.load(Ordering::SeqCst),
            writes: self.counters.writes.load(Ordering::SeqCst),
        }
    }

    /// Bytes currently stored across all buckets
    pub fn usage(&self) -> usize {
        self.quota.used.load(Ordering::SeqCst)
    }

    /// Serialize every bucket for persistence
    pub fn to_snapshot(&self) -> Result<Vec<u8>, CacheError> {
        let buckets: Vec<BucketSnapshot> = self
            .caches
            .read()
            .iter()
            .map(|cache| {
                let entries = cache.entries.read();
                let mut entries: Vec<(CacheKey, Response)> = entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                BucketSnapshot {
                    name: cache.name().to_string(),
                    entries,
                }
            })
            .collect();
        Ok(bincode::serialize(&buckets)?)
    }

    /// Restore a storage persisted with [`CacheStorage::to_snapshot`]
    pub fn from_snapshot(origin: Origin, bytes: &[u8]) -> Result<Self, CacheError> {
        let buckets: Vec<BucketSnapshot> = bincode::deserialize(bytes)?;
        let storage = Self::new(origin);
        for bucket in buckets {
            storage.open(&bucket.name).put_all(bucket.entries)?;
        }
        Ok(storage)
    }
}

impl std::fmt::Debug for CacheStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStorage")
            .field("origin", &self.origin)
            .field("cache_count", &self.caches.read().len())
            .finish()
    }
}
