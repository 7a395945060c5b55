use crate::core::error::Result;
use crate::core::rate::ExchangeRateSnapshot;
use crate::core::store::RateStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
/// Longer TTLs are clamped to this.
pub const MAX_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

struct CacheEntry {
    snapshot: Arc<ExchangeRateSnapshot>,
    expires_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entry: Option<CacheEntry>,
    // Bumped by every invalidate so a load that raced with it is not cached.
    generation: u64,
}

/// Single-entry, sliding-expiration cache in front of a [`RateStore`].
pub struct RateCache {
    store: Arc<dyn RateStore>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

impl RateCache {
    pub fn new(store: Arc<dyn RateStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl: ttl.min(MAX_TTL),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached snapshot, reading through to the store on a miss.
    /// Every hit pushes the expiry out by another `ttl`.
    pub async fn get(&self) -> Result<Option<Arc<ExchangeRateSnapshot>>> {
        let generation = {
            let mut state = self.state.lock().await;
            let now = Instant::now();
            if let Some(entry) = state.entry.as_mut() {
                if entry.expires_at > now {
                    entry.expires_at = now + self.ttl;
                    debug!("Cache HIT for exchange rates");
                    return Ok(Some(Arc::clone(&entry.snapshot)));
                }
                debug!("Cache entry expired for exchange rates");
                state.entry = None;
            } else {
                debug!("Cache MISS for exchange rates");
            }
            state.generation
        };

        // The store is read without holding the lock.
        let Some(snapshot) = self.store.load().await? else {
            return Ok(None);
        };
        let snapshot = Arc::new(snapshot);

        let mut state = self.state.lock().await;
        if state.generation == generation {
            debug!("Cache PUT for exchange rates");
            state.entry = Some(CacheEntry {
                snapshot: Arc::clone(&snapshot),
                expires_at: Instant::now() + self.ttl,
            });
        } else {
            debug!("Cache invalidated during load, not caching");
        }
        Ok(Some(snapshot))
    }

    /// Forces the next `get` to re-read the store.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.entry = None;
        state.generation = state.generation.wrapping_add(1);
        debug!("Cache INVALIDATE for exchange rates");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::{DEFAULT_SOURCE, ExchangeRate};
    use crate::core::time::taiwan_now;
    use crate::store::memory::MemoryStore;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Store whose loads block until `release` is notified.
    struct GatedStore {
        snapshot: ExchangeRateSnapshot,
        started: Notify,
        release: Notify,
        loads: AtomicUsize,
    }

    #[async_trait]
    impl RateStore for GatedStore {
        async fn load(&self) -> Result<Option<ExchangeRateSnapshot>> {
            let call = self.loads.fetch_add(1, Ordering::SeqCst);
            if call == 0 {
                self.started.notify_one();
                self.release.notified().await;
            }
            Ok(Some(self.snapshot.clone()))
        }

        async fn save(&self, _snapshot: &ExchangeRateSnapshot) -> Result<()> {
            Ok(())
        }

        async fn exists(&self) -> bool {
            true
        }

        async fn last_modified(&self) -> Option<chrono::DateTime<chrono::Local>> {
            None
        }
    }

    fn snapshot(buy: rust_decimal::Decimal) -> ExchangeRateSnapshot {
        let rate = ExchangeRate::new("USD", "美金", buy, dec!(31.0), taiwan_now()).unwrap();
        ExchangeRateSnapshot::new(vec![rate], taiwan_now(), DEFAULT_SOURCE).unwrap()
    }

    #[tokio::test]
    async fn test_cache_empty_store() {
        let store = Arc::new(MemoryStore::new());
        let cache = RateCache::new(store.clone(), DEFAULT_TTL);

        assert!(cache.get().await.unwrap().is_none());
        // Absence is not cached
        assert!(cache.get().await.unwrap().is_none());
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_reload() {
        let store = Arc::new(MemoryStore::with_snapshot(snapshot(dec!(30.5))));
        let cache = RateCache::new(store.clone(), DEFAULT_TTL);

        let first = cache.get().await.unwrap().unwrap();
        let second = cache.get().await.unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let store = Arc::new(MemoryStore::with_snapshot(snapshot(dec!(30.5))));
        let cache = RateCache::new(store.clone(), DEFAULT_TTL);

        cache.get().await.unwrap();
        store.save(&snapshot(dec!(29.9))).await.unwrap();

        // Still served from memory until invalidated
        let cached = cache.get().await.unwrap().unwrap();
        assert_eq!(cached.rate("USD").unwrap().cash_buy_rate, dec!(30.5));

        cache.invalidate().await;
        let reloaded = cache.get().await.unwrap().unwrap();
        assert_eq!(reloaded.rate("USD").unwrap().cash_buy_rate, dec!(29.9));
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sliding_expiration() {
        let store = Arc::new(MemoryStore::with_snapshot(snapshot(dec!(30.5))));
        let cache = RateCache::new(store.clone(), Duration::from_secs(60));

        cache.get().await.unwrap();
        tokio::time::advance(Duration::from_secs(40)).await;
        cache.get().await.unwrap();
        // 80s after the first load but only 40s after the last access
        tokio::time::advance(Duration::from_secs(40)).await;
        cache.get().await.unwrap();
        assert_eq!(store.load_count(), 1);

        tokio::time::advance(Duration::from_secs(61)).await;
        cache.get().await.unwrap();
        assert_eq!(store.load_count(), 2);
    }

    #[tokio::test]
    async fn test_load_racing_invalidate_is_not_cached() {
        let store = Arc::new(GatedStore {
            snapshot: snapshot(dec!(30.5)),
            started: Notify::new(),
            release: Notify::new(),
            loads: AtomicUsize::new(0),
        });
        let cache = Arc::new(RateCache::new(store.clone(), DEFAULT_TTL));

        let pending = tokio::spawn({
            let cache = Arc::clone(&cache);
            async move { cache.get().await }
        });
        store.started.notified().await;
        cache.invalidate().await;
        store.release.notify_one();

        // The caller still gets what it loaded
        let loaded = pending.await.unwrap().unwrap();
        assert!(loaded.is_some());
        assert_eq!(store.loads.load(Ordering::SeqCst), 1);

        // but it was not cached, so the next read goes to the store
        cache.get().await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
        cache.get().await.unwrap();
        assert_eq!(store.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let store = Arc::new(MemoryStore::with_snapshot(snapshot(dec!(30.5))));
        let cache = RateCache::new(store.clone(), Duration::from_secs(u64::MAX));

        assert_eq!(cache.ttl(), MAX_TTL);
        assert!(cache.get().await.unwrap().is_some());
        assert!(cache.get().await.unwrap().is_some());
        assert_eq!(store.load_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_entry() {
        let store = Arc::new(MemoryStore::with_snapshot(snapshot(dec!(30.5))));
        let cache = Arc::new(RateCache::new(store.clone(), DEFAULT_TTL));
        cache.get().await.unwrap();

        let reads = (0..16).map(|_| {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move { cache.get().await.unwrap().unwrap() })
        });
        for handle in futures::future::join_all(reads).await {
            assert_eq!(handle.unwrap().rates().len(), 1);
        }
        assert_eq!(store.load_count(), 1);
    }
}
