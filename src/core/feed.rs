//! Upstream rate feed abstractions

use crate::core::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RateFeedSource: Send + Sync {
    /// Raw, still-encoded feed document.
    async fn fetch(&self) -> Result<Vec<u8>>;
}
