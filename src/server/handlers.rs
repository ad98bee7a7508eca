use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::cache::DestinationCache;
use crate::error::TripgraphError;
use crate::graph::{lock_graph, GraphStore, SharedGraph};
use crate::itinerary::plan_itinerary;
use crate::recommend::{recommend_places, RecommendOptions, TripRequest};
use crate::services::ServiceSet;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub graph: SharedGraph,
    pub destinations: Arc<DestinationCache>,
    pub services: ServiceSet,
    pub options: Arc<RecommendOptions>,
}

impl AppState {
    pub fn new(
        graph: SharedGraph,
        destinations: Arc<DestinationCache>,
        services: ServiceSet,
        options: RecommendOptions,
    ) -> Self {
        Self {
            graph,
            destinations,
            services,
            options: Arc::new(options),
        }
    }
}

/// Error response rendered as `{"error": message}`. `InvalidInput` maps to
/// 400, everything else to 500.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<TripgraphError> for ApiError {
    fn from(err: TripgraphError) -> Self {
        let status = match err {
            TripgraphError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// GET /api/places
pub async fn handle_places(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.destinations.names())
}

/// POST /api/top-places
pub async fn handle_top_places(
    State(state): State<AppState>,
    body: Result<Json<TripRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body
        .map_err(|e| TripgraphError::InvalidInput(format!("No user data provided: {}", e)))?;
    if request.destination.trim().is_empty() {
        return Err(TripgraphError::InvalidInput("Missing required parameter: destination".to_string()).into());
    }

    log::info!("Recommending places for {}", request.destination);
    let known = state.destinations.names_set();
    let places = recommend_places(
        &request,
        &known,
        &state.graph,
        state.services.borrow(),
        &state.options,
    )
    .await
    .map_err(|e| {
        log::error!("Recommendation for {} failed: {}", request.destination, e);
        ApiError::from(e)
    })?;

    if state.destinations.insert(&request.destination)? {
        log::info!("Recorded destination {}", request.destination);
    }

    Ok(Json(json!({ "places": places })).into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerRequest {
    pub selected_places: String,
    pub user_input: String,
}

/// POST /api/event-planner
pub async fn handle_event_planner(
    State(state): State<AppState>,
    body: Result<Json<PlannerRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body
        .map_err(|e| TripgraphError::InvalidInput(format!("No data provided: {}", e)))?;
    if request.selected_places.is_empty() || request.user_input.is_empty() {
        return Err(TripgraphError::InvalidInput(
            "Missing required parameters: selectedPlaces or userInput".to_string(),
        )
        .into());
    }

    let schedule = plan_itinerary(
        &request.selected_places,
        &request.user_input,
        state.services.generator.as_ref(),
    )
    .await
    .map_err(|e| {
        log::error!("Itinerary planning failed: {}", e);
        ApiError::from(e)
    })?;

    Ok((StatusCode::OK, Json(schedule)).into_response())
}

/// GET /health
pub async fn handle_health(State(state): State<AppState>) -> Result<Response, ApiError> {
    let (nodes, edges) = {
        let store = lock_graph(&state.graph)?;
        (store.node_count()?, store.edge_count()?)
    };
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "nodes": nodes,
            "edges": edges
        })),
    )
        .into_response())
}
