// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::error::ApiError;
use crate::handlers::predict::post_predict;
use crate::services::quotes::QuoteSource;

// Every rejection renders as the `{"error": message}` shape clients parse.
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let (code, message) = if err.is_not_found() {
        (warp::http::StatusCode::NOT_FOUND, "Not Found".to_string())
    } else if let Some(api_error) = err.find::<ApiError>() {
        (api_error.status, api_error.message.clone())
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (
            warp::http::StatusCode::BAD_REQUEST,
            "Invalid request body".to_string(),
        )
    } else {
        (
            warp::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    quotes: Arc<dyn QuoteSource>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let quotes_filter = warp::any().map(move || quotes.clone());

    let predict_route = warp::path!("predict")
        .and(warp::post())
        .and(warp::body::json())
        .and(quotes_filter)
        .and_then(post_predict);

    info!("All routes configured successfully.");

    predict_route.recover(handle_rejection)
}
