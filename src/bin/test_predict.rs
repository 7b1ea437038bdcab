use log::{error, info};
use reqwest::Client;

use stock_sight::models::PredictionRequest;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let url = std::env::var("PREDICT_URL")
        .unwrap_or_else(|_| "https://stock-sight-1-d4b2.onrender.com/predict".to_string());
    info!("Probing predict endpoint at {}", url);

    let payload = PredictionRequest {
        company_symbol: "RELIANCE".to_string(),
        prediction_date: chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string(),
    };
    info!(
        "Sample payload: {} on {}",
        payload.company_symbol, payload.prediction_date
    );

    let response = Client::new().post(&url).json(&payload).send().await?;
    let status = response.status();
    let body = response.text().await?;

    info!("Status: {}", status);
    info!("Raw body: {}", body);

    match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(json) => info!("Parsed body: {:#}", json),
        Err(e) => error!("Body is not valid JSON: {}", e),
    }

    Ok(())
}
