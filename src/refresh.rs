use crate::core::cache::RateCache;
use crate::core::error::Result;
use crate::core::feed::RateFeedSource;
use crate::core::rate::{DEFAULT_SOURCE, ExchangeRateSnapshot};
use crate::core::store::RateStore;
use crate::core::time::taiwan_now;
use crate::providers::bot_csv;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetch → parse → persist → invalidate.
///
/// Nothing visible changes unless the snapshot was persisted. No retries are
/// attempted; retry policy belongs to the caller.
pub struct RateRefresher {
    feed: Arc<dyn RateFeedSource>,
    store: Arc<dyn RateStore>,
    cache: Arc<RateCache>,
}

impl RateRefresher {
    pub fn new(
        feed: Arc<dyn RateFeedSource>,
        store: Arc<dyn RateStore>,
        cache: Arc<RateCache>,
    ) -> Self {
        Self { feed, store, cache }
    }

    pub async fn refresh(&self) -> Result<Arc<ExchangeRateSnapshot>> {
        info!("Fetching latest exchange rates");

        let raw = self.feed.fetch().await?;
        let rates = bot_csv::parse(&raw).inspect_err(|e| {
            warn!(error = %e, "Failed to parse exchange rate feed");
        })?;
        let snapshot = ExchangeRateSnapshot::new(rates, taiwan_now(), DEFAULT_SOURCE)?;

        self.store.save(&snapshot).await?;
        self.cache.invalidate().await;

        info!(
            count = snapshot.rates().len(),
            "Fetched and stored exchange rates"
        );
        Ok(Arc::new(snapshot))
    }
}
