use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info};

use urpaq_core::error::Result;
use urpaq_core::types::{ProcessedQuery, ScoredDocument};

use crate::orchestrator::RagResponse;

#[derive(Debug, Clone, Copy)]
pub struct CacheSettings {
    pub search_ttl: Duration,
    pub query_ttl: Duration,
    pub response_ttl: Duration,
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            search_ttl: Duration::from_secs(30 * 60),
            query_ttl: Duration::from_secs(60 * 60),
            response_ttl: Duration::from_secs(30 * 60),
            max_entries: 1000,
        }
    }
}

struct Entry<T> {
    value: T,
    expires_at: Instant,
}

impl<T> Entry<T> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Bounded map with per-entry expiry.
struct TtlCache<T> {
    entries: Mutex<HashMap<String, Entry<T>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<T: Clone> TtlCache<T> {
    fn new(ttl: Duration, max_entries: usize) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl, max_entries }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry<T>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn get(&self, key: &str) -> Option<T> {
        let entries = self.lock();
        entries.get(key).filter(|e| !e.is_expired(Instant::now())).map(|e| e.value.clone())
    }

    fn insert(&self, key: String, value: T) {
        let mut entries = self.lock();
        let now = Instant::now();
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            entries.retain(|_, e| !e.is_expired(now));
            if entries.len() >= self.max_entries {
                let mut by_expiry: Vec<(String, Instant)> =
                    entries.iter().map(|(k, e)| (k.clone(), e.expires_at)).collect();
                by_expiry.sort_by_key(|(_, at)| *at);
                for (k, _) in by_expiry.into_iter().take((self.max_entries / 4).max(1)) {
                    entries.remove(&k);
                }
                info!("Cache cleanup performed, removed old entries");
            }
        }
        entries.insert(key, Entry { value, expires_at: now + self.ttl });
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn size(&self) -> usize {
        self.lock().len()
    }

    fn valid(&self) -> usize {
        let now = Instant::now();
        self.lock().values().filter(|e| !e.is_expired(now)).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub search_cache_size: usize,
    pub query_cache_size: usize,
    pub response_cache_size: usize,
    pub search_cache_valid: usize,
    pub query_cache_valid: usize,
    pub response_cache_valid: usize,
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cache Stats: Search[{}/{}] Query[{}/{}] Response[{}/{}]",
            self.search_cache_valid,
            self.search_cache_size,
            self.query_cache_valid,
            self.query_cache_size,
            self.response_cache_valid,
            self.response_cache_size
        )
    }
}

/// Caches for processed queries, search results and final answers.
/// Keys are the lower-cased, trimmed input.
pub struct CacheService {
    search: TtlCache<Vec<ScoredDocument>>,
    query: TtlCache<ProcessedQuery>,
    response: TtlCache<RagResponse>,
}

impl Default for CacheService {
    fn default() -> Self {
        Self::new(CacheSettings::default())
    }
}

impl CacheService {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            search: TtlCache::new(settings.search_ttl, settings.max_entries),
            query: TtlCache::new(settings.query_ttl, settings.max_entries),
            response: TtlCache::new(settings.response_ttl, settings.max_entries),
        }
    }

    pub async fn get_or_compute_search<F, Fut>(&self, query: &str, compute: F) -> Result<Vec<ScoredDocument>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<ScoredDocument>>>,
    {
        let key = cache_key("search", query);
        if let Some(hit) = self.search.get(&key) {
            debug!("Search cache HIT for query: {}", query);
            return Ok(hit);
        }
        debug!("Search cache MISS for query: {}", query);
        let result = compute().await?;
        self.search.insert(key, result.clone());
        Ok(result)
    }

    pub async fn get_or_compute_query<F, Fut>(&self, query: &str, compute: F) -> Result<ProcessedQuery>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ProcessedQuery>>,
    {
        let key = cache_key("query", query);
        if let Some(hit) = self.query.get(&key) {
            debug!("Query cache HIT for: {}", query);
            return Ok(hit);
        }
        debug!("Query cache MISS for: {}", query);
        let result = compute().await?;
        self.query.insert(key, result.clone());
        Ok(result)
    }

    pub fn cached_response(&self, question: &str) -> Option<RagResponse> {
        self.response.get(&cache_key("response", question))
    }

    pub fn store_response(&self, question: &str, response: RagResponse) {
        self.response.insert(cache_key("response", question), response);
    }

    pub fn invalidate_search_cache(&self) {
        self.search.clear();
        info!("Search cache invalidated");
    }

    pub fn invalidate_all(&self) {
        self.search.clear();
        self.query.clear();
        self.response.clear();
        info!("All caches invalidated");
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            search_cache_size: self.search.size(),
            query_cache_size: self.query.size(),
            response_cache_size: self.response.size(),
            search_cache_valid: self.search.valid(),
            query_cache_valid: self.query.valid(),
            response_cache_valid: self.response.valid(),
        }
    }
}

fn cache_key(kind: &str, text: &str) -> String {
    format!("{}:{}", kind, text.to_lowercase().trim())
}
