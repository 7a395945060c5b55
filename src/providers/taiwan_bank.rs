use crate::core::error::{RateError, Result};
use crate::core::feed::RateFeedSource;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_BASE_URL: &str = "https://rate.bot.com.tw";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const FEED_PATH: &str = "/xrt/flcsv/0/day";

/// Downloads the daily cash-rate CSV from Bank of Taiwan.
pub struct TaiwanBankFeed {
    base_url: String,
    client: reqwest::Client,
}

impl TaiwanBankFeed {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("twfx/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                RateError::ExternalService(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn url(&self) -> String {
        format!("{}{}", self.base_url, FEED_PATH)
    }
}

fn fetch_error(url: &str, e: reqwest::Error) -> RateError {
    if e.is_timeout() {
        error!(url = %url, error = %e, "Exchange rate request timed out");
        RateError::ExternalService(format!("failed to fetch exchange rates: request timed out ({url})"))
    } else {
        error!(url = %url, error = %e, "Exchange rate request failed");
        RateError::ExternalService(format!("failed to fetch exchange rates: {e}"))
    }
}

#[async_trait]
impl RateFeedSource for TaiwanBankFeed {
    async fn fetch(&self) -> Result<Vec<u8>> {
        let url = self.url();
        debug!("Requesting exchange rates from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, %status, "Exchange rate request returned non-success status");
            return Err(RateError::ExternalService(format!(
                "failed to fetch exchange rates: HTTP {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| fetch_error(&url, e))?;
        debug!("Received {} bytes of exchange rate data", bytes.len());
        Ok(bytes.to_vec())
    }
}
