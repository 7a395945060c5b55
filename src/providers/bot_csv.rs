//! Parser for the Bank of Taiwan daily cash-rate CSV.
//!
//! The feed is Big5-encoded. Columns are located by header name, so column
//! order and extra columns do not matter:
//!
//! | header         | field          |
//! |----------------|----------------|
//! | `幣別`         | currency code  |
//! | `幣別名稱`     | currency name  |
//! | `本行現金買入` | cash buy rate  |
//! | `本行現金賣出` | cash sell rate |

use crate::core::currency::CurrencyCode;
use crate::core::error::{RateError, Result};
use crate::core::rate::{ExchangeRate, MAX_CURRENCY_NAME_CHARS};
use crate::core::time::taiwan_now;
use chrono::{DateTime, FixedOffset};
use csv::{ReaderBuilder, StringRecord, Trim};
use encoding_rs::Encoding;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::str::FromStr;
use tracing::{debug, warn};

pub const CODE_COLUMN: &str = "幣別";
pub const NAME_COLUMN: &str = "幣別名稱";
pub const CASH_BUY_COLUMN: &str = "本行現金買入";
pub const CASH_SELL_COLUMN: &str = "本行現金賣出";

/// Marker the feed uses when a currency has no quote today.
const NO_QUOTE: &str = "-";

pub fn feed_encoding() -> &'static Encoding {
    encoding_rs::BIG5
}

/// Decodes raw feed bytes, rejecting malformed sequences instead of
/// substituting replacement characters.
pub fn decode_feed(raw: &[u8]) -> Result<String> {
    let encoding = feed_encoding();
    encoding
        .decode_without_bom_handling_and_without_replacement(raw)
        .map(|text| text.into_owned())
        .ok_or_else(|| {
            RateError::DataFormat(format!("feed is not valid {} text", encoding.name()))
        })
}

struct Columns {
    code: usize,
    name: usize,
    cash_buy: usize,
    cash_sell: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                RateError::DataFormat(format!("feed header is missing column '{name}'"))
            })
        };
        Ok(Self {
            code: find(CODE_COLUMN)?,
            name: find(NAME_COLUMN)?,
            cash_buy: find(CASH_BUY_COLUMN)?,
            cash_sell: find(CASH_SELL_COLUMN)?,
        })
    }
}

fn parse_rate(raw: &str) -> Option<Decimal> {
    if raw.is_empty() || raw == NO_QUOTE {
        return None;
    }
    Decimal::from_str(raw).ok().filter(|rate| *rate > Decimal::ZERO)
}

/// Parses the feed, stamping every rate with the current Taiwan time.
pub fn parse(raw: &[u8]) -> Result<Vec<ExchangeRate>> {
    parse_at(raw, taiwan_now())
}

pub fn parse_at(raw: &[u8], now: DateTime<FixedOffset>) -> Result<Vec<ExchangeRate>> {
    let text = decode_feed(raw)?;

    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| RateError::DataFormat(format!("failed to read feed header: {e}")))?
        .clone();
    let columns = Columns::from_headers(&headers)?;

    let mut rates = Vec::new();
    let mut seen = HashSet::new();

    for (index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| RateError::DataFormat(format!("failed to read feed row: {e}")))?;
        let row = index + 2;

        let Some(raw_code) = record.get(columns.code) else {
            continue;
        };
        let Ok(currency) = raw_code.parse::<CurrencyCode>() else {
            debug!(row, code = raw_code, "Skipping unsupported currency");
            continue;
        };

        let (Some(name), Some(raw_buy), Some(raw_sell)) = (
            record.get(columns.name),
            record.get(columns.cash_buy),
            record.get(columns.cash_sell),
        ) else {
            warn!(row, %currency, "Skipping row with missing fields");
            continue;
        };

        let Some(cash_buy) = parse_rate(raw_buy) else {
            warn!(row, %currency, cash_buy = raw_buy, "Skipping row with unusable cash buy rate");
            continue;
        };
        let Some(cash_sell) = parse_rate(raw_sell) else {
            warn!(row, %currency, cash_sell = raw_sell, "Skipping row with unusable cash sell rate");
            continue;
        };

        if !seen.insert(currency) {
            warn!(row, %currency, "Skipping duplicate currency row");
            continue;
        }

        if name.contains(char::REPLACEMENT_CHARACTER) {
            warn!(row, %currency, name, "Currency name contains replacement characters");
        }
        let name: String = name.chars().take(MAX_CURRENCY_NAME_CHARS).collect();

        match ExchangeRate::new(currency.as_str(), &name, cash_buy, cash_sell, now) {
            Ok(rate) => rates.push(rate),
            Err(e) => warn!(row, %currency, error = %e, "Skipping invalid rate row"),
        }
    }

    if rates.is_empty() {
        return Err(RateError::DataFormat(
            "no valid exchange rates in feed".to_string(),
        ));
    }

    debug!("Parsed {} exchange rates from feed", rates.len());
    Ok(rates)
}
