// src/handlers/predict.rs
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use log::{error, info};
use warp::reply::Json;
use warp::Rejection;

use super::error::ApiError;
use crate::models::{PredictionRequest, PredictionResponse};
use crate::services::estimator::{estimate_roc, estimated_price, previous_close};
use crate::services::indicators::prepare_features;
use crate::services::quotes::{normalize_symbol, QuoteSource};

/// Calendar days of history fetched before the prediction date; generous
/// enough for the 50-bar indicator requirement across weekends and holidays.
const LOOKBACK_DAYS: i64 = 250;

pub async fn post_predict(
    request: PredictionRequest,
    quotes: Arc<dyn QuoteSource>,
) -> Result<Json, Rejection> {
    let symbol = normalize_symbol(&request.company_symbol);
    info!(
        "Handling prediction request for {} on {}",
        symbol, request.prediction_date
    );

    let date = NaiveDate::parse_from_str(&request.prediction_date, "%Y-%m-%d").map_err(|_| {
        warp::reject::custom(ApiError::bad_request(format!(
            "Invalid predictionDate '{}'; expected YYYY-MM-DD",
            request.prediction_date
        )))
    })?;

    if symbol.is_empty() {
        return Err(warp::reject::custom(ApiError::bad_request(
            "companySymbol must not be empty",
        )));
    }

    let start = date - Duration::days(LOOKBACK_DAYS);
    let end = date + Duration::days(1);
    let candles = quotes.daily_candles(&symbol, start, end).await.map_err(|e| {
        error!("Quote fetch failed for {}: {}", symbol, e);
        warp::reject::custom(ApiError::internal(format!(
            "Failed to fetch quotes for {}: {}",
            symbol, e
        )))
    })?;

    let features = prepare_features(&candles, date).ok_or_else(|| {
        warp::reject::custom(ApiError::bad_request(format!(
            "Could not prepare features for {} on {}. This could be due to invalid symbol, \
             date, or insufficient historical data.",
            symbol, request.prediction_date
        )))
    })?;

    let prev_close = previous_close(&candles, date).ok_or_else(|| {
        warp::reject::custom(ApiError::bad_request(format!(
            "Could not retrieve previous day's closing price for {}. Insufficient data \
             for price conversion.",
            symbol
        )))
    })?;

    let roc = estimate_roc(&features);
    let price = estimated_price(prev_close, roc);
    info!(
        "Estimated price for {} on {}: {:.2} (roc {:.3}%)",
        symbol, date, price, roc
    );

    Ok(warp::reply::json(&PredictionResponse {
        company_symbol: Some(symbol),
        prediction_date: Some(request.prediction_date),
        estimated_price: Some(price),
    }))
}
