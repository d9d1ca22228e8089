// Time-bounded cache for one remote resource
//
// One TtlCache exists per feed. The entry is written only after a successful
// fetch, so a failure always leaves the previous value and timestamp in place.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

// Counters for one cache
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub fetch_count: AtomicUsize,
    pub failed_fetch_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub hit_count: usize,
    pub miss_count: usize,
    pub fetch_count: usize,
    pub failed_fetch_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct CacheEntry<T> {
    pub items: T,
    // None until the first successful fetch
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl<T: Clone> CacheEntry<T> {
    /// Returns the cached items if they were fetched less than `ttl` before
    /// `now`. A zero TTL never yields a hit, nor does an entry that was never
    /// fetched. A clock that went backwards counts as fresh.
    pub fn fresh(&self, now: DateTime<Utc>, ttl: Duration) -> Option<T> {
        let fetched_at = self.last_fetched_at?;
        let age = (now - fetched_at).to_std().unwrap_or(Duration::ZERO);

        if age < ttl {
            Some(self.items.clone())
        } else {
            None
        }
    }

    pub fn store(&mut self, items: T, now: DateTime<Utc>) {
        self.items = items;
        self.last_fetched_at = Some(now);
    }
}

pub struct TtlCache<T> {
    entry: Mutex<CacheEntry<T>>,
    ttl: Duration,
    stats: CacheStats,
}

impl<T: Clone + Default> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entry: Mutex::new(CacheEntry::default()),
            ttl,
            stats: CacheStats::default(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    // Looks up the entry against the wall clock and counts the hit or miss
    pub fn fresh(&self) -> Option<T> {
        let found = self.entry.lock().fresh(Utc::now(), self.ttl);

        match found {
            Some(_) => self.stats.hit_count.fetch_add(1, Ordering::SeqCst),
            None => self.stats.miss_count.fetch_add(1, Ordering::SeqCst),
        };
        found
    }

    pub fn commit(&self, items: T) {
        self.entry.lock().store(items, Utc::now());
    }

    // Callers that fetch on their own report the outcome here
    pub fn record_fetch(&self, succeeded: bool) {
        self.stats.fetch_count.fetch_add(1, Ordering::SeqCst);
        if !succeeded {
            self.stats.failed_fetch_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Serves the cached value while it is fresh; otherwise runs `fetch` and
    /// stores its result. Errors from `fetch` are returned untouched and the
    /// entry is left as it was.
    pub async fn get_or_fetch<E, F, Fut>(&self, fetch: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(items) = self.fresh() {
            return Ok(items);
        }

        let result = fetch().await;
        self.record_fetch(result.is_ok());

        let items = result?;
        self.commit(items.clone());
        Ok(items)
    }

    // Last stored value, fresh or not
    pub fn peek(&self) -> T {
        self.entry.lock().items.clone()
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.entry.lock().last_fetched_at
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            fetch_count: self.stats.fetch_count.load(Ordering::SeqCst),
            failed_fetch_count: self.stats.failed_fetch_count.load(Ordering::SeqCst),
        }
    }
}
