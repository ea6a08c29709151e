//! The single inbound HTTP contract: `POST /api/v1/predict`.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use tokio::time::Instant;

use crate::domain::query::{RouteQuery, RouteQueryInput};
use crate::domain::Prediction;
use crate::errors::AppError;
use crate::orchestrator::Orchestrator;

/// State for the prediction route: the orchestrator plus the per-request
/// deadline budget.
#[derive(Clone)]
pub struct PredictState {
    pub orchestrator: Arc<Orchestrator>,
    pub request_timeout: Duration,
}

/// Compute a safety score for a route and target date.
///
/// Validates the request (422 on failure), then runs the full prediction
/// pipeline: elevation resolution, candidate filtering by distance/route
/// type, weather gathering, and weighted-kernel scoring.
#[utoipa::path(
    post,
    path = "/api/v1/predict",
    tag = "Prediction",
    request_body = RouteQueryInput,
    responses(
        (status = 200, description = "Prediction computed", body = Prediction),
        (status = 422, description = "Validation error"),
        (status = 503, description = "Upstream or resource unavailable"),
        (status = 504, description = "Request timed out"),
    )
)]
pub async fn predict(State(state): State<PredictState>, Json(input): Json<RouteQueryInput>) -> Result<Json<Prediction>, AppError> {
    let today = Utc::now().date_naive();
    let query = RouteQuery::validate(input, today)?;
    let deadline = Instant::now() + state.request_timeout;

    let prediction = state.orchestrator.predict(query, deadline).await?;
    Ok(Json(prediction))
}
