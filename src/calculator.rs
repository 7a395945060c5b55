//! Directional TWD conversions.
//!
//! Base → foreign uses the cash *sell* rate (the bank sells foreign currency
//! to the customer); foreign → base uses the cash *buy* rate (the bank buys
//! it back). Swapping them yields wrong amounts.

use crate::core::cache::RateCache;
use crate::core::currency::BASE_CURRENCY;
use crate::core::error::{RateError, Result};
use crate::core::rate::{ConversionResult, ExchangeRate, ExchangeRateSnapshot, round_money};
use crate::core::time::taiwan_now;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

pub struct Calculator {
    cache: Arc<RateCache>,
}

impl Calculator {
    pub fn new(cache: Arc<RateCache>) -> Self {
        Self { cache }
    }

    /// TWD amount → foreign currency.
    pub async fn convert_from_base(&self, amount: Decimal, target: &str) -> Result<ConversionResult> {
        validate_amount(amount)?;
        let snapshot = self.snapshot().await?;
        let rate = lookup(&snapshot, target)?;

        let raw_rate = Decimal::ONE / rate.cash_sell_rate;
        let converted = checked_product(amount, raw_rate)?;
        debug!(%amount, currency = %rate.currency_code, %raw_rate, "Converting from base");

        Ok(ConversionResult {
            source_amount: amount,
            source_currency: BASE_CURRENCY.to_string(),
            target_amount: round_money(converted),
            target_currency: rate.currency_code.clone(),
            rate_used: round_money(raw_rate),
            computed_at: taiwan_now(),
        })
    }

    /// Foreign currency amount → TWD.
    pub async fn convert_to_base(&self, amount: Decimal, source: &str) -> Result<ConversionResult> {
        validate_amount(amount)?;
        let snapshot = self.snapshot().await?;
        let rate = lookup(&snapshot, source)?;

        let converted = checked_product(amount, rate.cash_buy_rate)?;
        debug!(%amount, currency = %rate.currency_code, rate = %rate.cash_buy_rate, "Converting to base");

        Ok(ConversionResult {
            source_amount: amount,
            source_currency: rate.currency_code.clone(),
            target_amount: round_money(converted),
            target_currency: BASE_CURRENCY.to_string(),
            rate_used: rate.cash_buy_rate,
            computed_at: taiwan_now(),
        })
    }

    async fn snapshot(&self) -> Result<Arc<ExchangeRateSnapshot>> {
        self.cache.get().await?.ok_or_else(|| {
            RateError::InvalidState("no exchange rate data available".to_string())
        })
    }
}

fn validate_amount(amount: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(RateError::InvalidArgument(
            "amount must be positive".to_string(),
        ));
    }
    Ok(())
}

fn lookup<'a>(snapshot: &'a ExchangeRateSnapshot, code: &str) -> Result<&'a ExchangeRate> {
    snapshot
        .rate(code)
        .ok_or_else(|| RateError::InvalidArgument(format!("unsupported currency code: {code}")))
}

fn checked_product(amount: Decimal, rate: Decimal) -> Result<Decimal> {
    amount
        .checked_mul(rate)
        .ok_or_else(|| RateError::InvalidArgument(format!("amount is too large: {amount}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::DEFAULT_TTL;
    use crate::core::rate::DEFAULT_SOURCE;
    use crate::store::memory::MemoryStore;
    use rust_decimal_macros::dec;

    fn calculator_with_rates() -> Calculator {
        let now = taiwan_now();
        let rates = vec![
            ExchangeRate::new("USD", "美金", dec!(30.5), dec!(31.0), now).unwrap(),
            ExchangeRate::new("JPY", "日圓", dec!(0.20), dec!(0.22), now).unwrap(),
            ExchangeRate::new("EUR", "歐元", dec!(33.5), dec!(34.5), now).unwrap(),
        ];
        let snapshot = ExchangeRateSnapshot::new(rates, now, DEFAULT_SOURCE).unwrap();
        let store = Arc::new(MemoryStore::with_snapshot(snapshot));
        Calculator::new(Arc::new(RateCache::new(store, DEFAULT_TTL)))
    }

    fn empty_calculator() -> Calculator {
        let store = Arc::new(MemoryStore::new());
        Calculator::new(Arc::new(RateCache::new(store, DEFAULT_TTL)))
    }

    #[tokio::test]
    async fn test_convert_from_base_uses_sell_rate() {
        let calculator = calculator_with_rates();
        let result = calculator.convert_from_base(dec!(1000), "USD").await.unwrap();

        assert_eq!(result.source_amount, dec!(1000));
        assert_eq!(result.source_currency, "TWD");
        assert_eq!(result.target_currency, "USD");
        assert_eq!(result.rate_used.to_string(), "0.032258");
        assert_eq!(result.target_amount.to_string(), "32.258065");
    }

    #[tokio::test]
    async fn test_convert_to_base_uses_buy_rate() {
        let calculator = calculator_with_rates();
        let result = calculator.convert_to_base(dec!(100), "USD").await.unwrap();

        assert_eq!(result.source_currency, "USD");
        assert_eq!(result.target_currency, "TWD");
        assert_eq!(result.rate_used, dec!(30.5));
        assert_eq!(result.target_amount.to_string(), "3050.000000");
    }

    #[tokio::test]
    async fn test_conversions_match_rounding_property() {
        let calculator = calculator_with_rates();
        for (code, buy, sell) in [
            ("USD", dec!(30.5), dec!(31.0)),
            ("JPY", dec!(0.20), dec!(0.22)),
            ("EUR", dec!(33.5), dec!(34.5)),
        ] {
            for amount in [dec!(0.01), dec!(1), dec!(123.45), dec!(99999.99)] {
                let from = calculator.convert_from_base(amount, code).await.unwrap();
                assert_eq!(from.target_amount, round_money(amount * (Decimal::ONE / sell)));

                let to = calculator.convert_to_base(amount, code).await.unwrap();
                assert_eq!(to.target_amount, round_money(amount * buy));
            }
        }
    }

    #[tokio::test]
    async fn test_code_lookup_is_case_insensitive() {
        let calculator = calculator_with_rates();
        let result = calculator.convert_from_base(dec!(22), "jpy").await.unwrap();
        assert_eq!(result.target_currency, "JPY");
        assert_eq!(result.target_amount.to_string(), "100.000000");
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let calculator = calculator_with_rates();
        for amount in [dec!(0), dec!(-1), dec!(-100)] {
            assert!(matches!(
                calculator.convert_from_base(amount, "USD").await,
                Err(RateError::InvalidArgument(_))
            ));
            assert!(matches!(
                calculator.convert_to_base(amount, "USD").await,
                Err(RateError::InvalidArgument(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_currency_rejected() {
        let calculator = calculator_with_rates();
        let err = calculator.convert_from_base(dec!(100), "XXX").await.unwrap_err();
        assert!(matches!(err, RateError::InvalidArgument(_)));
        assert!(err.to_string().contains("XXX"));

        // Supported but absent from this snapshot
        assert!(matches!(
            calculator.convert_to_base(dec!(100), "GBP").await,
            Err(RateError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_no_snapshot_is_invalid_state() {
        let calculator = empty_calculator();
        assert!(matches!(
            calculator.convert_from_base(dec!(100), "USD").await,
            Err(RateError::InvalidState(_))
        ));
        assert!(matches!(
            calculator.convert_to_base(dec!(100), "USD").await,
            Err(RateError::InvalidState(_))
        ));
        // Amount is validated before data availability
        assert!(matches!(
            calculator.convert_to_base(dec!(0), "USD").await,
            Err(RateError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_overflowing_amount_rejected() {
        let calculator = calculator_with_rates();
        assert!(matches!(
            calculator.convert_to_base(Decimal::MAX, "USD").await,
            Err(RateError::InvalidArgument(_))
        ));
    }
}
