// src/services/estimator.rs
use chrono::NaiveDate;
use log::warn;

use crate::models::Candle;
use crate::services::indicators::FeatureSet;

/// Hard bound on the predicted one-day move, in percent.
const MAX_ROC_PERCENT: f64 = 5.0;

/// Predicted next-session rate of change in percent: a momentum blend of the
/// close's gap to its 10-day SMA, the RSI's pull away from neutral, and the
/// MACD histogram, clamped to ±5%.
pub fn estimate_roc(features: &FeatureSet) -> f64 {
    let sma_gap = if features.sma_10 != 0.0 {
        (features.close_t1 - features.sma_10) / features.sma_10 * 100.0
    } else {
        0.0
    };
    let rsi_pull = (features.rsi - 50.0) / 50.0;
    let macd_push = if features.close_t1 != 0.0 {
        (features.macd - features.macd_signal) / features.close_t1 * 100.0
    } else {
        0.0
    };

    let roc = 0.4 * sma_gap + 0.4 * rsi_pull + 0.2 * macd_push;
    roc.clamp(-MAX_ROC_PERCENT, MAX_ROC_PERCENT)
}

/// Converts a predicted rate of change into a price level.
pub fn estimated_price(prev_close: f64, roc_percent: f64) -> f64 {
    prev_close * (1.0 + roc_percent / 100.0)
}

/// Last close strictly before `date`, falling back to the last available
/// close on or before it when nothing earlier exists.
pub fn previous_close(candles: &[Candle], date: NaiveDate) -> Option<f64> {
    if let Some(candle) = candles.iter().rev().find(|c| c.date < date) {
        return Some(candle.close);
    }
    candles.iter().rev().find(|c| c.date <= date).map(|candle| {
        warn!(
            "No close strictly before {}; using last available close on {}",
            date, candle.date
        );
        candle.close
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn features(close_t1: f64, sma_10: f64, rsi: f64, macd: f64, macd_signal: f64) -> FeatureSet {
        FeatureSet {
            close_t1,
            close_t2: close_t1,
            close_t3: close_t1,
            volume_t1: 0.0,
            volume_t2: 0.0,
            volume_t3: 0.0,
            sma_10,
            sma_50: sma_10,
            ema_10: sma_10,
            rsi,
            macd,
            macd_signal,
            bollinger_high: close_t1,
            bollinger_low: close_t1,
            atr: 0.0,
            obv: 0.0,
            day_of_week: 0,
            month: 1,
        }
    }

    fn candles(closes: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle {
                date: start + Duration::days(i as i64),
                open: *c,
                high: *c,
                low: *c,
                close: *c,
                volume: 0.0,
            })
            .collect()
    }

    #[test]
    fn neutral_features_predict_no_move() {
        let f = features(100.0, 100.0, 50.0, 0.0, 0.0);
        assert_eq!(estimate_roc(&f), 0.0);
    }

    #[test]
    fn runaway_momentum_is_clamped() {
        let f = features(200.0, 100.0, 100.0, 10.0, 0.0);
        assert_eq!(estimate_roc(&f), MAX_ROC_PERCENT);

        let f = features(50.0, 100.0, 0.0, -10.0, 0.0);
        assert_eq!(estimate_roc(&f), -MAX_ROC_PERCENT);
    }

    #[test]
    fn price_conversion_applies_percent_move() {
        assert!((estimated_price(100.0, 5.0) - 105.0).abs() < 1e-9);
        assert!((estimated_price(200.0, -2.5) - 195.0).abs() < 1e-9);
    }

    #[test]
    fn previous_close_prefers_strictly_earlier_bars() {
        let data = candles(&[10.0, 11.0, 12.0, 13.0]);
        // 2024-01-03: strictly-before close is the Jan 2 bar.
        let date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert_eq!(previous_close(&data, date), Some(11.0));
    }

    #[test]
    fn previous_close_falls_back_to_same_day() {
        let data = candles(&[10.0, 11.0]);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(previous_close(&data, date), Some(10.0));
    }

    #[test]
    fn previous_close_is_none_before_all_data() {
        let data = candles(&[10.0, 11.0]);
        let date = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(previous_close(&data, date), None);
    }
}
