use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use floor_route::RouterConfig;
use room_dataset_loader::Dataset;
use route_server::{create_app, AppState, MAX_PATH_ROOMS};
use serde_json::{json, Value};
use tower::ServiceExt;

const ROOMS_CSV: &str = "\
room,link,x,y,piano,corridoio
101,102,2.0,3.0,1,A
102,scala_a1,4.0,3.0,1,A
scala_a1,scala_a2,6.0,1.0,1,
scala_a2,201,6.0,1.0,2,
201,,8.0,3.0,2,B
magazzino,,0.0,9.0,1,
";

fn app() -> Router {
    app_with(RouterConfig::default())
}

fn app_with(config: RouterConfig) -> Router {
    let dataset = Dataset::from_reader(ROOMS_CSV.as_bytes()).unwrap();
    let state = AppState::new(dataset, &config).unwrap();
    create_app(state, &[])
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    send_to(app(), request).await
}

async fn send_to(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_graph_size() {
    let (status, body) = send(get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["rooms"], 6);
    assert_eq!(body["passages"], 4);
}

#[tokio::test]
async fn rooms_listed_in_file_order_with_labels() {
    let (status, body) = send(get("/rooms")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rooms"], 6);
    assert_eq!(body["rooms"][0]["id"], "101");
    assert_eq!(body["rooms"][0]["label"], "stanza 101");
    assert_eq!(body["rooms"][2]["label"], "scala_A piano 1");
    assert_eq!(body["rooms"][2]["category"], "stairwell");
}

#[tokio::test]
async fn route_returns_scene() {
    let (status, body) = send(post_json("/route", json!({"source": "101", "target": "201"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["route"]["path"],
        json!(["101", "102", "scala_a1", "scala_a2", "201"])
    );
    assert_eq!(body["route"]["total_weight"], 23.0);
    assert_eq!(body["points"][4]["z"], 20.0);
    assert_eq!(body["segments"].as_array().unwrap().len(), 4);
    assert_eq!(body["visible_max_floor"], 2);
}

#[tokio::test]
async fn route_to_unknown_room_is_404() {
    let (status, body) = send(post_json("/route", json!({"source": "101", "target": "999"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "UNKNOWN_ROOM");
}

#[tokio::test]
async fn route_to_isolated_room_is_422() {
    let (status, body) =
        send(post_json("/route", json!({"source": "101", "target": "magazzino"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "NO_PATH_FOUND");
}

#[tokio::test]
async fn route_requires_both_endpoints() {
    let (status, body) = send(post_json("/route", json!({"source": " ", "target": "101"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REQUEST");
}

#[tokio::test]
async fn geometry_for_path() {
    let (status, body) = send(post_json("/geometry", json!({"path": ["scala_a2", "201"]}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["points"],
        json!([
            {"room_id": "scala_a2", "x": 6.0, "y": 1.0, "z": 20.0},
            {"room_id": "201", "x": 8.0, "y": 3.0, "z": 20.0}
        ])
    );
}

#[tokio::test]
async fn route_over_search_limit_is_422() {
    let mut config = RouterConfig::default();
    config.max_settled = Some(1);

    let (status, body) = send_to(
        app_with(config),
        post_json("/route", json!({"source": "101", "target": "201"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "SEARCH_LIMIT_EXCEEDED");
}

#[tokio::test]
async fn geometry_with_unknown_room_is_404() {
    let (status, body) = send(post_json("/geometry", json!({"path": ["101", "999"]}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "UNKNOWN_ROOM");
}

#[tokio::test]
async fn geometry_rejects_overlong_path() {
    let path = vec!["101"; MAX_PATH_ROOMS + 1];
    let (status, body) = send(post_json("/geometry", json!({ "path": path }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "PATH_TOO_LONG");
}

#[tokio::test]
async fn all_geometry_keeps_room_order() {
    let (status, body) = send(get("/geometry")).await;
    assert_eq!(status, StatusCode::OK);

    let keys: Vec<_> = body.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys.len(), 6);
    assert_eq!(body["101"], json!({"x": 2.0, "y": 3.0, "z": 0.0}));
}
