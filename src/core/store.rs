//! Snapshot persistence abstractions

use crate::core::error::Result;
use crate::core::rate::ExchangeRateSnapshot;
use async_trait::async_trait;
use chrono::{DateTime, Local};

#[async_trait]
pub trait RateStore: Send + Sync {
    /// `Ok(None)` when nothing has ever been saved.
    async fn load(&self) -> Result<Option<ExchangeRateSnapshot>>;

    /// Replaces the persisted snapshot; readers never observe a partial write.
    async fn save(&self, snapshot: &ExchangeRateSnapshot) -> Result<()>;

    async fn exists(&self) -> bool;

    async fn last_modified(&self) -> Option<DateTime<Local>>;
}
