use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::data::ContentItem;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_SWEEP_PROBABILITY: f64 = 0.1;

/// What the service keeps per key. Values are shared, never copied out.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Items(Arc<Vec<ContentItem>>),
    Item(Arc<ContentItem>),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: CachedValue,
    stored_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// In-memory TTL cache. Expired entries are dropped lazily on read, and a
/// fraction of reads also sweep the whole map.
#[derive(Debug)]
pub struct ContentCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    sweep_probability: f64,
}

impl Default for ContentCache {
    fn default() -> Self { Self::new(DEFAULT_TTL, DEFAULT_SWEEP_PROBABILITY) }
}

impl ContentCache {
    pub fn new(ttl: Duration, sweep_probability: f64) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            sweep_probability: sweep_probability.clamp(0.0, 1.0),
        }
    }

    pub fn ttl(&self) -> Duration { self.ttl }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn should_sweep(&self) -> bool {
        match self.sweep_probability {
            p if p <= 0.0 => false,
            p if p >= 1.0 => true,
            p => rand::random::<f64>() < p,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.ttl
    }

    pub fn get(&self, key: &str) -> Option<CachedValue> { self.get_at(key, Instant::now()) }

    pub fn get_at(&self, key: &str, now: Instant) -> Option<CachedValue> {
        if self.should_sweep() {
            self.sweep_at(now);
        }
        let mut entries = self.lock();
        let found = entries.get(key).map(|e| (self.is_fresh(e, now), e.value.clone()));
        match found {
            Some((true, value)) => Some(value),
            Some((false, _)) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: CachedValue) { self.set_at(key, value, Instant::now()) }

    pub fn set_at(&self, key: impl Into<String>, value: CachedValue, now: Instant) {
        self.lock().insert(key.into(), CacheEntry { value, stored_at: now });
    }

    pub fn clear(&self) {
        self.lock().clear();
        tracing::info!("content cache cleared");
    }

    /// Evict every expired entry; returns how many were dropped.
    pub fn sweep_at(&self, now: Instant) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, e| now.saturating_duration_since(e.stored_at) < self.ttl);
        let evicted = before - entries.len();
        if evicted > 0 {
            tracing::debug!(evicted, "swept expired cache entries");
        }
        evicted
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats { size: entries.len(), keys }
    }
}
