//! RPC method handlers. Each method is one POST route carrying JSON
//! payloads; request-level problems come back as error-shaped JSON bodies
//! (not protocol faults) so the channel stays usable.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use tracing::{error, info, warn};

use crate::error::PriceError;
use crate::models::prices::{ErrorResponse, HistoricalQuery};
use crate::AppState;

pub fn rpc_router(state: AppState) -> Router {
    Router::new()
        .route("/rpc/getLatestPrices", post(get_latest_prices))
        .route("/rpc/getHistoricalPrices", post(get_historical_prices))
        .with_state(state)
}

async fn get_latest_prices(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    info!("RPC request: getLatestPrices");

    match state.prices.get_latest().await {
        Ok(Some(snapshot)) => Ok(Json(serde_json::to_value(snapshot).map_err(internal_error)?)),
        Ok(None) => Ok(Json(json!({}))),
        Err(err) => Err(internal_error(err)),
    }
}

async fn get_historical_prices(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<ErrorResponse>)> {
    info!("RPC request: getHistoricalPrices");

    let query: HistoricalQuery = match serde_json::from_slice(&body) {
        Ok(query) => query,
        Err(err) => {
            warn!("Malformed getHistoricalPrices request: {err}");
            return Ok(Json(json!({ "error": "Bad request format" })));
        }
    };

    let (Some(from), Some(to)) = (query.from, query.to) else {
        return Ok(Json(json!({ "error": "Invalid time range" })));
    };
    if from >= to {
        return Ok(Json(json!({ "error": "Invalid time range" })));
    }

    match state.prices.get_historical(from, to).await {
        Ok(entries) => Ok(Json(serde_json::to_value(entries).map_err(internal_error)?)),
        Err(PriceError::InvalidRange { .. }) => Ok(Json(json!({ "error": "Invalid time range" }))),
        Err(err) => Err(internal_error(err)),
    }
}

fn internal_error(err: impl std::fmt::Display) -> (StatusCode, Json<ErrorResponse>) {
    error!("RPC request failed: {err}");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}
