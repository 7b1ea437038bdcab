// src/form.rs
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, error, info};
use reqwest::Client;

use crate::models::{PredictionRequest, PredictionResponse};
use crate::services::predict::{request_prediction, PredictError};

/// Where a submission's outcome is rendered. The terminal binary prints to
/// stdout; tests substitute a recording panel.
pub trait ResultPanel: Send {
    fn set_text(&mut self, text: &str);
    fn show(&mut self);
}

/// Current values of the two form fields at submit time.
#[derive(Debug, Clone)]
pub struct FormFields {
    pub symbol: String,
    pub date: String,
}

/// Drives one prediction exchange per submission: build the payload, call the
/// endpoint once, render the outcome into the panel. Submissions take a ticket
/// from a generation counter; a response resolving after a newer submission
/// has started is discarded instead of rendered, so the latest submission
/// always wins.
pub struct FormController {
    client: Client,
    endpoint: String,
    generation: AtomicU64,
}

impl FormController {
    pub fn new(client: Client, endpoint: impl Into<String>) -> Self {
        FormController {
            client,
            endpoint: endpoint.into(),
            generation: AtomicU64::new(0),
        }
    }

    /// One submission: exactly one request, exactly one `show` on the panel
    /// unless a newer submission superseded this one while it was in flight.
    pub async fn submit(&self, fields: FormFields, panel: &mut dyn ResultPanel) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let payload = PredictionRequest {
            company_symbol: fields.symbol,
            prediction_date: fields.date,
        };

        let outcome = request_prediction(&self.client, &self.endpoint, &payload).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!("Discarding stale result for submission {}", ticket);
            return;
        }

        match &outcome {
            Ok(response) => {
                if let Some(price) = response.estimated_price {
                    info!("Submission {} estimated price: {:.2}", ticket, price);
                }
            }
            Err(e) => error!("Submission {} failed: {}", ticket, e),
        }

        panel.set_text(&render_outcome(&outcome));
        panel.show();
    }
}

/// Maps a finished exchange to the text shown in the result panel.
pub fn render_outcome(outcome: &Result<PredictionResponse, PredictError>) -> String {
    match outcome {
        Ok(response) => match response.estimated_price {
            Some(price) => format!("{:.2}", price),
            None => "Error: Prediction result not found.".to_string(),
        },
        Err(e) => format!("Error predicting: {}. Check server.", e),
    }
}
