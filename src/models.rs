// src/models.rs
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Payload POSTed to the predict endpoint. The wire names are fixed; the
/// server keys off them exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    #[serde(rename = "companySymbol")]
    pub company_symbol: String,
    #[serde(rename = "predictionDate")]
    pub prediction_date: String,
}

/// Success body of the predict endpoint. Only `estimatedPrice` is load-bearing
/// for the client; the echoed symbol and date are informational.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(rename = "companySymbol", skip_serializing_if = "Option::is_none")]
    pub company_symbol: Option<String>,
    #[serde(rename = "predictionDate", skip_serializing_if = "Option::is_none")]
    pub prediction_date: Option<String>,
    #[serde(rename = "estimatedPrice", skip_serializing_if = "Option::is_none")]
    pub estimated_price: Option<f64>,
}

/// Error body of the predict endpoint on non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
}

/// One daily bar from the quote source.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}
