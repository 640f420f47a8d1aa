use axum::{
    extract::{Json, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use floor_route::{Point3, ProjectedRoom, RouteError, RoutePlanner, RouteScene, RouterConfig};
use indexmap::IndexMap;
use room_dataset_loader::{Dataset, LoaderError, RoomLabel};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub mod config;

pub use config::ServerConfig;

/// Longest path accepted by `POST /geometry`.
pub const MAX_PATH_ROOMS: usize = 10_000;

/// Read-only state shared by every request.
#[derive(Clone)]
pub struct AppState {
    planner: Arc<RoutePlanner>,
    labels: Arc<Vec<RoomLabel>>,
}

impl AppState {
    pub fn new(dataset: Dataset, config: &RouterConfig) -> Result<Self, LoaderError> {
        let labels = dataset.labels();
        let planner = dataset.into_planner(config)?;
        Ok(Self {
            planner: Arc::new(planner),
            labels: Arc::new(labels),
        })
    }

    pub fn planner(&self) -> &RoutePlanner {
        &self.planner
    }
}

#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct GeometryRequest {
    pub path: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GeometryResponse {
    points: Vec<ProjectedRoom>,
}

#[derive(Debug, Serialize)]
struct RoomsResponse {
    rooms: Vec<RoomLabel>,
    total_rooms: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    rooms: usize,
    passages: usize,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: &str, message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.to_string(),
            message,
        }),
    )
}

fn route_error(err: RouteError) -> ApiError {
    let status = match err {
        RouteError::UnknownRoom(_) => StatusCode::NOT_FOUND,
        RouteError::NoPathFound { .. } | RouteError::SearchLimitExceeded { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: err.code().to_string(),
            message: err.to_string(),
        }),
    )
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        rooms: state.planner.registry().len(),
        passages: state.planner.graph().edge_count(),
    })
}

async fn list_rooms(State(state): State<AppState>) -> Json<RoomsResponse> {
    Json(RoomsResponse {
        total_rooms: state.labels.len(),
        rooms: state.labels.as_ref().clone(),
    })
}

async fn route_handler(
    State(state): State<AppState>,
    Json(request): Json<RouteRequest>,
) -> Result<Json<RouteScene>, ApiError> {
    info!("Route request {} -> {}", request.source, request.target);

    if request.source.trim().is_empty() || request.target.trim().is_empty() {
        return Err(bad_request(
            "INVALID_REQUEST",
            "Both source and target rooms are required".to_string(),
        ));
    }

    let scene = state
        .planner
        .scene(&request.source, &request.target)
        .map_err(|e| {
            warn!("Route {} -> {} failed: {}", request.source, request.target, e);
            route_error(e)
        })?;

    info!(
        "Route found: {} rooms, weight {}",
        scene.route.path.len(),
        scene.route.total_weight
    );

    Ok(Json(scene))
}

async fn geometry_for_handler(
    State(state): State<AppState>,
    Json(request): Json<GeometryRequest>,
) -> Result<Json<GeometryResponse>, ApiError> {
    if request.path.len() > MAX_PATH_ROOMS {
        warn!(
            "Request rejected: path too long ({} > {})",
            request.path.len(),
            MAX_PATH_ROOMS
        );
        return Err(bad_request(
            "PATH_TOO_LONG",
            format!(
                "Too many rooms in path. Maximum allowed: {}. Received: {}",
                MAX_PATH_ROOMS,
                request.path.len()
            ),
        ));
    }

    let points = state
        .planner
        .geometry_for(&request.path)
        .map_err(route_error)?;

    Ok(Json(GeometryResponse { points }))
}

async fn all_geometry_handler(State(state): State<AppState>) -> Json<IndexMap<String, Point3>> {
    Json(state.planner.all_room_geometry())
}

/// Build the router. An empty origin list allows any origin.
pub fn create_app(state: AppState, allowed_origins: &[String]) -> Router {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    let cors = if origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/rooms", get(list_rooms))
        .route("/route", post(route_handler))
        .route("/geometry", get(all_geometry_handler).post(geometry_for_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
