//! Exchange rate types and snapshot invariants

use crate::core::currency::BASE_CURRENCY;
use crate::core::error::{RateError, Result};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MAX_CURRENCY_NAME_CHARS: usize = 50;
pub const DEFAULT_SOURCE: &str = "台灣銀行";
/// Decimal places kept for converted amounts and derived rates.
pub const MONEY_DP: u32 = 6;

/// Rounds half away from zero and pins the scale to [`MONEY_DP`].
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DP);
    rounded
}

fn is_valid_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRate {
    pub currency_code: String,
    pub currency_name: String,
    pub cash_buy_rate: Decimal,
    pub cash_sell_rate: Decimal,
    pub last_updated: DateTime<FixedOffset>,
}

impl ExchangeRate {
    pub fn new(
        currency_code: &str,
        currency_name: &str,
        cash_buy_rate: Decimal,
        cash_sell_rate: Decimal,
        last_updated: DateTime<FixedOffset>,
    ) -> Result<Self> {
        let rate = Self {
            currency_code: currency_code.to_string(),
            currency_name: currency_name.to_string(),
            cash_buy_rate,
            cash_sell_rate,
            last_updated,
        };
        rate.validate()?;
        Ok(rate)
    }

    pub fn validate(&self) -> Result<()> {
        if !is_valid_code(&self.currency_code) {
            return Err(RateError::InvalidArgument(format!(
                "currency code must be 3 upper-case letters: {}",
                self.currency_code
            )));
        }
        if self.currency_name.chars().count() > MAX_CURRENCY_NAME_CHARS {
            return Err(RateError::InvalidArgument(format!(
                "currency name exceeds {MAX_CURRENCY_NAME_CHARS} characters: {}",
                self.currency_name
            )));
        }
        if self.cash_buy_rate <= Decimal::ZERO || self.cash_sell_rate <= Decimal::ZERO {
            return Err(RateError::InvalidArgument(format!(
                "rates for {} must be positive",
                self.currency_code
            )));
        }
        Ok(())
    }
}

/// One complete set of rates as of one fetch. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRateSnapshot {
    rates: Vec<ExchangeRate>,
    fetched_at: DateTime<FixedOffset>,
    source: String,
}

impl ExchangeRateSnapshot {
    pub const STALE_AFTER_HOURS: i64 = 24;

    pub fn new(
        rates: Vec<ExchangeRate>,
        fetched_at: DateTime<FixedOffset>,
        source: &str,
    ) -> Result<Self> {
        let snapshot = Self {
            rates,
            fetched_at,
            source: source.to_string(),
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rates.is_empty() {
            return Err(RateError::InvalidArgument(
                "snapshot requires at least one rate".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for rate in &self.rates {
            rate.validate()?;
            if !seen.insert(rate.currency_code.as_str()) {
                return Err(RateError::InvalidArgument(format!(
                    "duplicate currency code in snapshot: {}",
                    rate.currency_code
                )));
            }
        }
        Ok(())
    }

    pub fn rates(&self) -> &[ExchangeRate] {
        &self.rates
    }

    pub fn fetched_at(&self) -> DateTime<FixedOffset> {
        self.fetched_at
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Case-insensitive lookup by currency code.
    pub fn rate(&self, code: &str) -> Option<&ExchangeRate> {
        let code = code.trim();
        self.rates
            .iter()
            .find(|r| r.currency_code.eq_ignore_ascii_case(code))
    }

    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) > Duration::hours(Self::STALE_AFTER_HOURS)
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub source_amount: Decimal,
    pub source_currency: String,
    pub target_amount: Decimal,
    pub target_currency: String,
    pub rate_used: Decimal,
    pub computed_at: DateTime<FixedOffset>,
}

impl ConversionResult {
    /// `1,000 TWD = 32.26 USD`; base amounts without decimals, foreign with two.
    pub fn formatted(&self) -> String {
        let source_dp = if self.source_currency == BASE_CURRENCY { 0 } else { 2 };
        format!(
            "{} {} = {} {}",
            format_amount(self.source_amount, source_dp),
            self.source_currency,
            format_amount(self.target_amount, 2),
            self.target_currency
        )
    }
}

/// Fixed decimals with thousands separators.
pub fn format_amount(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}
