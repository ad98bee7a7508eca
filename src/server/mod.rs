//! HTTP surface: recommendation, itinerary and registry endpoints.

mod handlers;

pub use handlers::{ApiError, AppState, PlannerRequest};

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpServerConfig;
use crate::error::{Result, TripgraphError};

use handlers::{handle_event_planner, handle_health, handle_places, handle_top_places};

/// HTTP server wrapper
pub struct HttpServer {
    state: AppState,
    config: HttpServerConfig,
}

impl HttpServer {
    pub fn new(state: AppState, config: HttpServerConfig) -> Self {
        Self { state, config }
    }

    /// Bind `host:port` and serve until the process exits.
    pub async fn run(&self) -> Result<()> {
        let app = create_router(self.state.clone(), &self.config.allowed_origins);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
            TripgraphError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to bind to {}: {}", addr, e),
            ))
        })?;
        log::info!("Starting HTTP server on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            TripgraphError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP server error: {}", e),
            ))
        })?;

        Ok(())
    }
}

/// Build the router. Empty `allowed_origins` allows any origin.
pub fn create_router(state: AppState, allowed_origins: &[String]) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/places", get(handle_places))
        .route("/api/top-places", post(handle_top_places))
        .route("/api/event-planner", post(handle_event_planner))
        .route("/health", get(handle_health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::DestinationCache;
    use crate::graph::{lock_graph, shared, GraphStore, MemoryGraph, SharedGraph};
    use crate::recommend::RecommendOptions;
    use crate::testing::{service_set, MockEncyclopedia, MockGenerator, MockPlaces};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    const ROME_TSV: &str = "Node_1\tRelation\tNode_2\tNode_1_Type\tNode_2_Type\tAttributes\n\
                            Colosseum\tLOCATED_IN\tRome\tLandmark\tCity\t\n";

    struct Fixture {
        _dir: TempDir,
        router: Router,
        graph: SharedGraph,
        destinations: Arc<DestinationCache>,
    }

    fn fixture(places: MockPlaces, generator: MockGenerator) -> Fixture {
        let dir = TempDir::new().unwrap();
        let destinations = Arc::new(DestinationCache::load(dir.path().join("known.json")).unwrap());
        let graph = shared(MemoryGraph::new());
        let state = AppState::new(
            graph.clone(),
            destinations.clone(),
            service_set(
                Arc::new(places),
                Arc::new(MockEncyclopedia::new()),
                Arc::new(generator),
            ),
            RecommendOptions::default(),
        );
        Fixture {
            _dir: dir,
            router: create_router(state, &[]),
            graph,
            destinations,
        }
    }

    async fn call(router: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_api_error_status_mapping() {
        use axum::response::IntoResponse;

        let response = ApiError::from(TripgraphError::InvalidInput("bad budget".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Invalid input: bad budget");

        let response = ApiError::from(TripgraphError::Graph("lock poisoned".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health_reports_counts() {
        let fx = fixture(MockPlaces::with_names(&[]), MockGenerator::new());
        let (status, body) = call(&fx.router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["nodes"], 0);
        assert_eq!(body["edges"], 0);
    }

    #[tokio::test]
    async fn test_top_places_ingests_and_records_destination() {
        let generator = MockGenerator::new()
            .then_ok(ROME_TSV)
            .then_ok("```json\n[\"Colosseum\"]\n```");
        let fx = fixture(MockPlaces::with_names(&["Colosseum", "Pantheon"]), generator);

        let (status, body) = call(
            &fx.router,
            "POST",
            "/api/top-places",
            Some(r#"{"destination":"Rome","budget":"800 EUR","description":"history"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let places = body["places"].as_array().unwrap();
        assert_eq!(places.len(), 1);
        assert_eq!(places[0]["name"], "Colosseum");
        assert_eq!(places[0]["selected"], true);

        assert!(fx.destinations.contains("Rome"));
        assert_eq!(lock_graph(&fx.graph).unwrap().node_count().unwrap(), 2);

        let (_, names) = call(&fx.router, "GET", "/api/places", None).await;
        assert_eq!(names, serde_json::json!(["Rome"]));
    }

    #[tokio::test]
    async fn test_top_places_generation_failure_returns_names() {
        let generator = MockGenerator::new().then_ok(ROME_TSV).then_err("quota exceeded");
        let fx = fixture(MockPlaces::with_names(&["Colosseum", "Pantheon"]), generator);

        let (status, body) = call(&fx.router, "POST", "/api/top-places", Some(r#"{"destination":"Rome"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["places"], serde_json::json!(["Colosseum", "Pantheon"]));
    }

    #[tokio::test]
    async fn test_top_places_rejects_missing_destination() {
        let fx = fixture(MockPlaces::with_names(&[]), MockGenerator::new());

        let (status, body) = call(&fx.router, "POST", "/api/top-places", Some(r#"{"budget":"100"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Invalid input: Missing required parameter: destination");

        let (status, _) = call(&fx.router, "POST", "/api/top-places", Some("not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_top_places_search_failure_is_500() {
        let fx = fixture(MockPlaces::failing(403), MockGenerator::new());
        let (status, body) = call(&fx.router, "POST", "/api/top-places", Some(r#"{"destination":"Rome"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("403"));
        assert!(!fx.destinations.contains("Rome"));
    }

    #[tokio::test]
    async fn test_event_planner() {
        let generator = MockGenerator::new().then_ok("```json\n[{\"place_id\": 0, \"name\": \"Colosseum\"}]\n```");
        let fx = fixture(MockPlaces::with_names(&[]), generator);

        let (status, body) = call(
            &fx.router,
            "POST",
            "/api/event-planner",
            Some(r#"{"selectedPlaces":"NAME: 'Colosseum'","userInput":"Two days in Rome. "}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Colosseum");
        assert_eq!(body[0]["Famous Activity"], "");
    }

    #[tokio::test]
    async fn test_event_planner_validation_and_failure() {
        let fx = fixture(MockPlaces::with_names(&[]), MockGenerator::always("no fence here"));

        let (status, _) = call(&fx.router, "POST", "/api/event-planner", Some(r#"{"selectedPlaces":"x"}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = call(
            &fx.router,
            "POST",
            "/api/event-planner",
            Some(r#"{"selectedPlaces":"x","userInput":"y"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].is_string());
    }
}
