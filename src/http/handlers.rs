//! HTTP handlers for the statistics API.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error, warn};

use super::AppState;
use crate::error::CareerscopeError;
use crate::stats::{CalculationResult, FilterParams, Filters};

type HandlerError = (StatusCode, &'static str);

/// `GET /api/calculate` runs the job-opportunity calculation.
pub async fn calculate(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Json<CalculationResult>, HandlerError> {
    let filters = Filters::from(params);
    if filters.location.is_empty() {
        warn!("Received calculate request without a location");
        return Err((StatusCode::BAD_REQUEST, "Location is required"));
    }

    debug!(location = %filters.location, "Processing calculate request");
    let result = state
        .stats
        .calculate(&filters)
        .await
        .map_err(internal_error)?;
    Ok(Json(result))
}

/// `GET /api/occupations` lists the distinct occupation titles.
pub async fn occupations(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let occupations = state.stats.occupations().await.map_err(internal_error)?;
    let count = occupations.len();
    Ok(Json(json!({ "occupations": occupations, "count": count })))
}

/// `GET /api/locations` lists the distinct area titles.
pub async fn locations(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let locations = state.stats.locations().await.map_err(internal_error)?;
    let count = locations.len();
    Ok(Json(json!({ "locations": locations, "count": count })))
}

/// `GET /api/states` lists the state-level area titles.
pub async fn states(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let states = state.stats.states().await.map_err(internal_error)?;
    let count = states.len();
    Ok(Json(json!({ "states": states, "count": count })))
}

/// Query parameters for the areas-by-state lookup.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StateParams {
    pub state: String,
}

/// `GET /api/areas-by-state` lists the areas belonging to one state.
pub async fn areas_by_state(
    State(state): State<AppState>,
    Query(params): Query<StateParams>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    if params.state.is_empty() {
        warn!("Received areas request without a state");
        return Err((StatusCode::BAD_REQUEST, "Missing state parameter"));
    }

    let areas = state
        .stats
        .areas_by_state(&params.state)
        .await
        .map_err(internal_error)?;
    let count = areas.len();
    Ok(Json(json!({ "areas": areas, "count": count })))
}

/// `GET /api/health` reports liveness. Stays open when API keys are
/// enforced so probes keep working.
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Log the failure and answer with an opaque 500.
fn internal_error(err: CareerscopeError) -> HandlerError {
    error!(error = %err, "Request failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}
