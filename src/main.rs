use dotenv::dotenv;
use env_logger;
use log::{info, warn};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

use stock_sight::routes;
use stock_sight::services::quotes::{GrowwQuotes, QuoteSource, DEFAULT_BASE_URL};

#[tokio::main]
async fn main() {
    dotenv().ok();

    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting the prediction server...");

    let port_str = env::var("PORT").unwrap_or_else(|_| {
        warn!("$PORT not set, defaulting to 5000");
        "5000".to_string()
    });

    let port: u16 = port_str.parse().expect("PORT must be a number");
    info!("Using PORT: {}", port);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    info!("Will bind to: {}", addr);

    let base_url = env::var("GROWW_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let quotes: Arc<dyn QuoteSource> =
        Arc::new(GrowwQuotes::new(reqwest::Client::new(), base_url));

    // Set up CORS for the browser front end
    let cors = warp::cors()
        .allow_any_origin()
        .allow_header("content-type")
        .allow_methods(vec!["GET", "POST"]);

    // Set up routes
    let api = routes::routes(quotes).with(cors);
    info!("Routes configured successfully with CORS.");

    // Start the server
    info!("Starting server on {}", addr);
    warp::serve(api).run(addr).await;
}
