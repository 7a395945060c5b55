//! Supported currencies

use crate::core::error::RateError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Code of the base currency every conversion starts from or ends in.
pub const BASE_CURRENCY: &str = "TWD";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum CurrencyCode {
    USD,
    JPY,
    CNY,
    EUR,
    GBP,
    HKD,
    AUD,
}

impl CurrencyCode {
    pub const ALL: [CurrencyCode; 7] = [
        CurrencyCode::USD,
        CurrencyCode::JPY,
        CurrencyCode::CNY,
        CurrencyCode::EUR,
        CurrencyCode::GBP,
        CurrencyCode::HKD,
        CurrencyCode::AUD,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyCode::USD => "USD",
            CurrencyCode::JPY => "JPY",
            CurrencyCode::CNY => "CNY",
            CurrencyCode::EUR => "EUR",
            CurrencyCode::GBP => "GBP",
            CurrencyCode::HKD => "HKD",
            CurrencyCode::AUD => "AUD",
        }
    }

    /// Localized label shown next to the code.
    pub fn display_name(&self) -> &'static str {
        match self {
            CurrencyCode::USD => "美元 (USD)",
            CurrencyCode::JPY => "日圓 (JPY)",
            CurrencyCode::CNY => "人民幣 (CNY)",
            CurrencyCode::EUR => "歐元 (EUR)",
            CurrencyCode::GBP => "英鎊 (GBP)",
            CurrencyCode::HKD => "港幣 (HKD)",
            CurrencyCode::AUD => "澳幣 (AUD)",
        }
    }

    pub fn is_supported(code: &str) -> bool {
        code.parse::<CurrencyCode>().is_ok()
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "USD" => Ok(CurrencyCode::USD),
            "JPY" => Ok(CurrencyCode::JPY),
            "CNY" => Ok(CurrencyCode::CNY),
            "EUR" => Ok(CurrencyCode::EUR),
            "GBP" => Ok(CurrencyCode::GBP),
            "HKD" => Ok(CurrencyCode::HKD),
            "AUD" => Ok(CurrencyCode::AUD),
            _ => Err(RateError::InvalidArgument(format!(
                "unsupported currency code: {s}"
            ))),
        }
    }
}
