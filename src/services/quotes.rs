// src/services/quotes.rs
use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use log::{info, warn};
use reqwest::Client;
use serde::Deserialize;

use crate::models::Candle;
use crate::BoxError;

pub const DEFAULT_BASE_URL: &str =
    "https://groww.in/v1/api/charting_service/v4/chart/exchange/NSE/segment/CASH";

/// One day expressed in minutes, as the charting API wants it.
const DAILY_INTERVAL_MINUTES: u32 = 1440;
/// The API serves at most this many days of daily candles per request.
const MAX_DAYS_PER_REQUEST: i64 = 180;
/// Consecutive empty windows before giving up on the rest of the range.
const MAX_EMPTY_WINDOWS: u32 = 2;

/// Source of historical daily candles for one symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Daily candles covering `[start, end)`, ascending by date.
    async fn daily_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, BoxError>;
}

/// Uppercase, trim, and strip a venue suffix; the charting API takes bare
/// NSE symbols.
pub fn normalize_symbol(symbol: &str) -> String {
    let upper = symbol.trim().to_uppercase();
    for suffix in [".NS", ".BO"] {
        if let Some(stripped) = upper.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    upper
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    #[serde(default)]
    candles: Vec<Vec<serde_json::Value>>,
}

/// Daily-candle client for the Groww NSE charting API.
pub struct GrowwQuotes {
    client: Client,
    base_url: String,
}

impl GrowwQuotes {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        GrowwQuotes {
            client,
            base_url: base_url.into(),
        }
    }

    async fn fetch_window(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, BoxError> {
        let url = format!("{}/{}", self.base_url, symbol);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("startTimeInMillis", midnight_millis(start).to_string()),
                ("endTimeInMillis", midnight_millis(end).to_string()),
                ("intervalInMinutes", DAILY_INTERVAL_MINUTES.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<ChartResponse>()
            .await?;

        Ok(response
            .candles
            .iter()
            .filter_map(|row| parse_candle(row))
            .collect())
    }
}

#[async_trait]
impl QuoteSource for GrowwQuotes {
    async fn daily_candles(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Candle>, BoxError> {
        let mut all = Vec::new();
        let mut empty_windows = 0;
        let mut current_end = end;

        while current_end > start {
            let current_start = (current_end - Duration::days(MAX_DAYS_PER_REQUEST)).max(start);
            let batch = self.fetch_window(symbol, current_start, current_end).await?;

            if batch.is_empty() {
                warn!(
                    "No candles for {} between {} and {}",
                    symbol, current_start, current_end
                );
                empty_windows += 1;
                if empty_windows >= MAX_EMPTY_WINDOWS {
                    warn!("Consecutive data gaps for {}, stopping the scan", symbol);
                    break;
                }
            } else {
                info!(
                    "Fetched {} candles for {}: {} to {}",
                    batch.len(),
                    symbol,
                    current_start,
                    current_end
                );
                empty_windows = 0;
                all.extend(batch);
            }

            current_end = current_start;
        }

        all.sort_by_key(|c| c.date);
        all.dedup_by_key(|c| c.date);
        Ok(all)
    }
}

fn midnight_millis(date: NaiveDate) -> i64 {
    // Midnight always exists, the unwrap cannot fire.
    date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp_millis()
}

/// Rows arrive as `[epoch_seconds, open, high, low, close, volume]`; rows
/// that fail numeric extraction are dropped.
fn parse_candle(row: &[serde_json::Value]) -> Option<Candle> {
    let epoch = row.first()?.as_i64()?;
    let date = chrono::DateTime::from_timestamp(epoch, 0)?.date_naive();
    let num = |i: usize| row.get(i).and_then(|v| v.as_f64());
    Some(Candle {
        date,
        open: num(1)?,
        high: num(2)?,
        low: num(3)?,
        close: num(4)?,
        volume: num(5).unwrap_or(0.0),
    })
}
