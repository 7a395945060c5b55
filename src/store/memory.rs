use crate::core::error::Result;
use crate::core::rate::ExchangeRateSnapshot;
use crate::core::store::RateStore;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

struct StoredSnapshot {
    snapshot: ExchangeRateSnapshot,
    saved_at: DateTime<Local>,
}

/// Process-local snapshot store; nothing survives a restart.
pub struct MemoryStore {
    inner: Mutex<Option<StoredSnapshot>>,
    loads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(None),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn with_snapshot(snapshot: ExchangeRateSnapshot) -> Self {
        Self {
            inner: Mutex::new(Some(StoredSnapshot {
                snapshot,
                saved_at: Local::now(),
            })),
            loads: AtomicUsize::new(0),
        }
    }

    /// Number of `load` calls served so far.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RateStore for MemoryStore {
    async fn load(&self) -> Result<Option<ExchangeRateSnapshot>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let inner = self.inner.lock().await;
        debug!("Memory store LOAD");
        Ok(inner.as_ref().map(|stored| stored.snapshot.clone()))
    }

    async fn save(&self, snapshot: &ExchangeRateSnapshot) -> Result<()> {
        let mut inner = self.inner.lock().await;
        *inner = Some(StoredSnapshot {
            snapshot: snapshot.clone(),
            saved_at: Local::now(),
        });
        debug!("Memory store SAVE");
        Ok(())
    }

    async fn exists(&self) -> bool {
        self.inner.lock().await.is_some()
    }

    async fn last_modified(&self) -> Option<DateTime<Local>> {
        self.inner.lock().await.as_ref().map(|stored| stored.saved_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rate::{DEFAULT_SOURCE, ExchangeRate};
    use crate::core::time::taiwan_now;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_memory_store_save_load() {
        let store = MemoryStore::new();
        assert!(store.load().await.unwrap().is_none());
        assert!(!store.exists().await);
        assert!(store.last_modified().await.is_none());

        let rate = ExchangeRate::new("JPY", "日圓", dec!(0.20), dec!(0.22), taiwan_now()).unwrap();
        let snapshot = ExchangeRateSnapshot::new(vec![rate], taiwan_now(), DEFAULT_SOURCE).unwrap();
        store.save(&snapshot).await.unwrap();

        assert!(store.exists().await);
        assert!(store.last_modified().await.is_some());
        assert_eq!(store.load().await.unwrap(), Some(snapshot));
        assert_eq!(store.load_count(), 2);
    }
}
