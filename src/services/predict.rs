// src/services/predict.rs
use log::{error, info};
use reqwest::Client;
use std::fmt;

use crate::models::{ErrorBody, PredictionRequest, PredictionResponse};

/// Failure of a single prediction exchange.
#[derive(Debug)]
pub enum PredictError {
    /// The request never produced a usable response: connection failure,
    /// or a success body that could not be read as JSON.
    Transport(reqwest::Error),
    /// The server answered with a non-success status; carries the body's
    /// `error` field or the generic fallback.
    Server { message: String },
}

impl fmt::Display for PredictError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictError::Transport(e) => write!(f, "{}", e),
            PredictError::Server { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for PredictError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PredictError::Transport(e) => Some(e),
            PredictError::Server { .. } => None,
        }
    }
}

impl From<reqwest::Error> for PredictError {
    fn from(e: reqwest::Error) -> Self {
        PredictError::Transport(e)
    }
}

/// POST the payload to the predict endpoint and parse the typed response.
///
/// A non-success status becomes `PredictError::Server` with the message
/// extracted from the body's `error` field, or "Server error" when the body
/// has none or cannot be parsed.
pub async fn request_prediction(
    client: &Client,
    url: &str,
    payload: &PredictionRequest,
) -> Result<PredictionResponse, PredictError> {
    info!(
        "Requesting prediction for {} on {} from {}",
        payload.company_symbol, payload.prediction_date, url
    );

    let response = client.post(url).json(payload).send().await?;
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.unwrap_or_else(|| "Server error".to_string()),
            Err(_) => "Server error".to_string(),
        };
        error!("Predict endpoint returned {}: {}", status, message);
        return Err(PredictError::Server { message });
    }

    let parsed = response.json::<PredictionResponse>().await?;
    Ok(parsed)
}
