// Performance graph and measurement ingest

use crate::core::error::{ApiError, ValidationError};
use crate::core::state::AppState;
use crate::models::api::{ApiKeyQuery, GraphPoint, GraphQuery, GraphResponse, MeasurementBody};
use crate::utils::auth::verify_api_key;
use crate::utils::time::current_timestamp;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;
use tracing::{debug, warn};

fn address_param(address: Option<&str>) -> Result<&str, ValidationError> {
    match address.map(str::trim) {
        Some(address) if !address.is_empty() => Ok(address),
        _ => Err(ValidationError::MissingParameter("address".to_string())),
    }
}

/// GET /measure?address=<addr>
///
/// Latest `graph_limit` readings for the address, oldest first.
pub async fn graph_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GraphQuery>,
) -> Result<Response, ApiError> {
    let address = address_param(params.address.as_deref())?;

    let points: Vec<GraphPoint> = state
        .measurements
        .latest(address, state.config.measurements.graph_limit)
        .iter()
        .map(GraphPoint::from)
        .collect();

    if points.is_empty() {
        return Err(ApiError::NotFound(format!("No measurements for {}", address)));
    }

    Ok((
        StatusCode::OK,
        Json(GraphResponse {
            address: address.to_string(),
            points,
        }),
    )
        .into_response())
}

/// POST /measure?api_key=<key>
pub async fn record_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ApiKeyQuery>,
    Json(body): Json<MeasurementBody>,
) -> Result<Response, ApiError> {
    if !verify_api_key(&params.api_key, &state.config.auth.api_key) {
        warn!("Unauthorized measurement ingest attempt");
        return Err(ApiError::InvalidApiKey);
    }

    let address = address_param(Some(body.address.as_str()))?;

    // NaN fails the range check too
    if !(0.0..=100.0).contains(&body.score) {
        return Err(ValidationError::OutOfRange(format!("score must be between 0 and 100, got {}", body.score)).into());
    }

    let measurement = state.measurements.record(address, body.score, current_timestamp());
    state.metrics.increment_measurements();

    debug!(address, score = body.score, "Measurement recorded");

    Ok((StatusCode::CREATED, Json(GraphPoint::from(&measurement))).into_response())
}
