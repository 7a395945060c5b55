//! The operations the presentation layer needs, wired together.

use crate::calculator::Calculator;
use crate::core::cache::RateCache;
use crate::core::config::AppConfig;
use crate::core::error::{RateError, Result};
use crate::core::feed::RateFeedSource;
use crate::core::rate::{ConversionResult, ExchangeRateSnapshot};
use crate::core::store::RateStore;
use crate::providers::TaiwanBankFeed;
use crate::refresh::RateRefresher;
use crate::store::JsonFileStore;
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct RateService {
    calculator: Calculator,
    cache: Arc<RateCache>,
    store: Arc<dyn RateStore>,
    refresher: RateRefresher,
    auto_refresh: bool,
}

impl RateService {
    pub fn new(
        feed: Arc<dyn RateFeedSource>,
        store: Arc<dyn RateStore>,
        cache_ttl: Duration,
        auto_refresh: bool,
    ) -> Self {
        let cache = Arc::new(RateCache::new(Arc::clone(&store), cache_ttl));
        Self {
            calculator: Calculator::new(Arc::clone(&cache)),
            refresher: RateRefresher::new(feed, Arc::clone(&store), Arc::clone(&cache)),
            cache,
            store,
            auto_refresh,
        }
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let data_path = config.default_data_path()?;
        let store = Arc::new(JsonFileStore::new(&data_path)?);
        let feed = Arc::new(TaiwanBankFeed::new(
            &config.feed.base_url,
            config.feed_timeout(),
        )?);
        Ok(Self::new(
            feed,
            store,
            config.cache_ttl(),
            config.auto_refresh,
        ))
    }

    pub async fn convert_from_base(&self, amount: Decimal, target: &str) -> Result<ConversionResult> {
        match self.calculator.convert_from_base(amount, target).await {
            Err(RateError::InvalidState(_)) if self.auto_refresh => {
                self.populate().await?;
                self.calculator.convert_from_base(amount, target).await
            }
            result => result,
        }
    }

    pub async fn convert_to_base(&self, amount: Decimal, source: &str) -> Result<ConversionResult> {
        match self.calculator.convert_to_base(amount, source).await {
            Err(RateError::InvalidState(_)) if self.auto_refresh => {
                self.populate().await?;
                self.calculator.convert_to_base(amount, source).await
            }
            result => result,
        }
    }

    pub async fn current_snapshot(&self) -> Result<Option<Arc<ExchangeRateSnapshot>>> {
        self.cache.get().await
    }

    /// Missing data counts as stale.
    pub async fn is_stale(&self) -> Result<bool> {
        Ok(self
            .current_snapshot()
            .await?
            .is_none_or(|snapshot| snapshot.is_stale()))
    }

    pub async fn refresh(&self) -> Result<Arc<ExchangeRateSnapshot>> {
        self.refresher.refresh().await
    }

    /// When the stored snapshot was last written.
    pub async fn stored_at(&self) -> Option<DateTime<Local>> {
        self.store.last_modified().await
    }

    async fn populate(&self) -> Result<()> {
        info!("No exchange rate data stored, fetching before converting");
        self.refresh().await.map(|_| ())
    }
}
