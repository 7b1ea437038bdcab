// src/services/indicators.rs
use chrono::{Datelike, NaiveDate};

use crate::models::Candle;

/// Bars required up to and including the feature row; SMA-50 is the longest
/// window.
const MIN_HISTORY: usize = 50;

/// The feature row fed to the estimator: lagged prices and volumes plus the
/// standard technical indicators, computed as of one trading day.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub close_t1: f64,
    pub close_t2: f64,
    pub close_t3: f64,
    pub volume_t1: f64,
    pub volume_t2: f64,
    pub volume_t3: f64,
    pub sma_10: f64,
    pub sma_50: f64,
    pub ema_10: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub bollinger_high: f64,
    pub bollinger_low: f64,
    pub atr: f64,
    pub obv: f64,
    pub day_of_week: u32,
    pub month: u32,
}

/// Builds the feature row for the most recent candle on or before `target`.
/// Returns `None` when no such candle exists or there is not enough history
/// for every indicator.
pub fn prepare_features(candles: &[Candle], target: NaiveDate) -> Option<FeatureSet> {
    let idx = candles.iter().rposition(|c| c.date <= target)?;
    if idx + 1 < MIN_HISTORY {
        return None;
    }

    let window = &candles[..=idx];
    let closes: Vec<f64> = window.iter().map(|c| c.close).collect();

    let ema_12 = ema_series(&closes, 12);
    let ema_26 = ema_series(&closes, 26);
    let macd_series: Vec<f64> = ema_12.iter().zip(&ema_26).map(|(a, b)| a - b).collect();
    let macd = *macd_series.last()?;
    let macd_signal = ema(&macd_series, 9)?;

    let (bollinger_high, bollinger_low) = bollinger(&closes, 20, 2.0)?;
    let row = &window[idx];

    Some(FeatureSet {
        close_t1: window[idx - 1].close,
        close_t2: window[idx - 2].close,
        close_t3: window[idx - 3].close,
        volume_t1: window[idx - 1].volume,
        volume_t2: window[idx - 2].volume,
        volume_t3: window[idx - 3].volume,
        sma_10: sma(&closes, 10)?,
        sma_50: sma(&closes, 50)?,
        ema_10: ema(&closes, 10)?,
        rsi: rsi(&closes, 14)?,
        macd,
        macd_signal,
        bollinger_high,
        bollinger_low,
        atr: atr(window, 14)?,
        obv: obv(window),
        day_of_week: row.date.weekday().num_days_from_monday(),
        month: row.date.month(),
    })
}

/// Mean of the last `window` values.
fn sma(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    Some(tail.iter().sum::<f64>() / window as f64)
}

/// Exponential moving average seeded with the first value, alpha 2/(w+1).
fn ema_series(values: &[f64], window: usize) -> Vec<f64> {
    let alpha = 2.0 / (window as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut current = match values.first() {
        Some(v) => *v,
        None => return out,
    };
    out.push(current);
    for v in &values[1..] {
        current = alpha * v + (1.0 - alpha) * current;
        out.push(current);
    }
    out
}

fn ema(values: &[f64], window: usize) -> Option<f64> {
    ema_series(values, window).last().copied()
}

/// Relative strength index with Wilder smoothing.
fn rsi(values: &[f64], window: usize) -> Option<f64> {
    if window == 0 || values.len() < window + 1 {
        return None;
    }
    let w = window as f64;

    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in values.windows(2).take(window) {
        let delta = pair[1] - pair[0];
        if delta >= 0.0 {
            gains += delta;
        } else {
            losses -= delta;
        }
    }
    let mut avg_gain = gains / w;
    let mut avg_loss = losses / w;

    for pair in values.windows(2).skip(window) {
        let delta = pair[1] - pair[0];
        let (gain, loss) = if delta >= 0.0 { (delta, 0.0) } else { (0.0, -delta) };
        avg_gain = (avg_gain * (w - 1.0) + gain) / w;
        avg_loss = (avg_loss * (w - 1.0) + loss) / w;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

/// Bollinger bands: SMA ± width standard deviations (population std dev).
fn bollinger(values: &[f64], window: usize, width: f64) -> Option<(f64, f64)> {
    if window == 0 || values.len() < window {
        return None;
    }
    let tail = &values[values.len() - window..];
    let mean = tail.iter().sum::<f64>() / window as f64;
    let variance = tail.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / window as f64;
    let std_dev = variance.sqrt();
    Some((mean + width * std_dev, mean - width * std_dev))
}

fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .windows(2)
        .map(|w| {
            let prev_close = w[0].close;
            let c = &w[1];
            (c.high - c.low)
                .max((c.high - prev_close).abs())
                .max((c.low - prev_close).abs())
        })
        .collect()
}

/// Average true range with Wilder smoothing.
fn atr(candles: &[Candle], window: usize) -> Option<f64> {
    let trs = true_ranges(candles);
    if window == 0 || trs.len() < window {
        return None;
    }
    let w = window as f64;
    let mut value = trs[..window].iter().sum::<f64>() / w;
    for tr in &trs[window..] {
        value = (value * (w - 1.0) + tr) / w;
    }
    Some(value)
}

/// On-balance volume over the whole window.
fn obv(candles: &[Candle]) -> f64 {
    let mut total = 0.0;
    for w in candles.windows(2) {
        if w[1].close > w[0].close {
            total += w[1].volume;
        } else if w[1].close < w[0].close {
            total -= w[1].volume;
        }
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn flat_candle(date: NaiveDate, close: f64, volume: f64) -> Candle {
        Candle {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    fn history(days: usize) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..days)
            .map(|i| {
                let close = 100.0 + i as f64;
                Candle {
                    date: start + Duration::days(i as i64),
                    open: close - 0.5,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000.0 + i as f64,
                }
            })
            .collect()
    }

    #[test]
    fn sma_is_mean_of_tail() {
        assert_eq!(sma(&[1.0, 2.0, 3.0, 4.0], 2), Some(3.5));
        assert_eq!(sma(&[1.0], 2), None);
    }

    #[test]
    fn ema_of_constant_series_is_constant() {
        let values = [5.0; 30];
        let result = ema(&values, 10).unwrap();
        assert!((result - 5.0).abs() < 1e-12);
    }

    #[test]
    fn rsi_saturates_on_one_sided_series() {
        let rising: Vec<f64> = (1..=20).map(f64::from).collect();
        assert_eq!(rsi(&rising, 14), Some(100.0));

        let falling: Vec<f64> = (1..=20).rev().map(f64::from).collect();
        assert_eq!(rsi(&falling, 14), Some(0.0));
    }

    #[test]
    fn bollinger_bands_collapse_on_constant_series() {
        let values = [7.0; 25];
        let (high, low) = bollinger(&values, 20, 2.0).unwrap();
        assert_eq!(high, 7.0);
        assert_eq!(low, 7.0);
    }

    #[test]
    fn atr_of_flat_market_is_zero() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let candles: Vec<Candle> = (0..20)
            .map(|i| flat_candle(start + Duration::days(i), 50.0, 100.0))
            .collect();
        assert_eq!(atr(&candles, 14), Some(0.0));
    }

    #[test]
    fn obv_accumulates_signed_volume() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let closes = [10.0, 11.0, 10.0, 10.0];
        let volumes = [100.0, 5.0, 3.0, 2.0];
        let candles: Vec<Candle> = closes
            .iter()
            .zip(&volumes)
            .enumerate()
            .map(|(i, (c, v))| flat_candle(start + Duration::days(i as i64), *c, *v))
            .collect();
        // +5 (up), -3 (down), 0 (flat)
        assert_eq!(obv(&candles), 2.0);
    }

    #[test]
    fn prepare_features_uses_lagged_rows() {
        let candles = history(60);
        let target = candles.last().unwrap().date;
        let features = prepare_features(&candles, target).unwrap();
        assert_eq!(features.close_t1, candles[58].close);
        assert_eq!(features.close_t3, candles[56].close);
        assert_eq!(features.volume_t1, candles[58].volume);
        assert_eq!(features.month, target.month());
        assert_eq!(features.day_of_week, target.weekday().num_days_from_monday());
    }

    #[test]
    fn prepare_features_requires_enough_history() {
        let candles = history(20);
        let target = candles.last().unwrap().date;
        assert!(prepare_features(&candles, target).is_none());
    }

    #[test]
    fn prepare_features_rejects_dates_before_the_data() {
        let candles = history(60);
        let target = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert!(prepare_features(&candles, target).is_none());
    }

    #[test]
    fn prepare_features_picks_the_row_on_or_before_target() {
        let candles = history(60);
        // Target in the middle of the data: later bars must be ignored.
        let target = candles[54].date;
        let features = prepare_features(&candles, target).unwrap();
        assert_eq!(features.close_t1, candles[53].close);
    }
}
