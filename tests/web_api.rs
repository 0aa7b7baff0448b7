use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tile_catalog::{
    catalog::{parse_tiles, TileCatalog},
    chains::ResourceChains,
    web::{build_router, AppState},
};
use tower::ServiceExt;

fn router_with(catalog: TileCatalog) -> Router {
    let chains = ResourceChains::embedded().unwrap();
    build_router(Arc::new(AppState::new(catalog, chains)))
}

fn sample_router() -> Router {
    let tiles = parse_tiles(
        r#"[
            {"name": "Monument", "type": "Public", "generation": "I", "requires": "Stone"},
            {"name": "Quarry", "type": "Resource", "generation": "I", "requires": "none", "produces": "Stone"},
            {"name": "Farm", "type": "Resource", "generation": "I", "requires": "none", "produces": "Wheat"},
            {"name": "Pit", "type": "Resource", "generation": "I", "requires": "none", "produces": "Stone"}
        ]"#,
    )
    .unwrap();
    router_with(TileCatalog::from_tiles(tiles))
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn names(json: &Value) -> Vec<String> {
    json["tiles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tile| tile["name"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn index_returns_html() {
    let response = sample_router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn script_is_served_as_javascript() {
    let response = sample_router()
        .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("application/javascript"));
}

#[tokio::test]
async fn script_discards_superseded_tile_requests() {
    let response = sample_router()
        .oneshot(Request::get("/app.js").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let script = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(script.contains("new AbortController()"));
    assert!(script.contains("if (request === latestRequest) renderTiles(payload);"));
}

#[tokio::test]
async fn tiles_are_listed_in_dataset_order() {
    let (status, json) = get(sample_router(), "/api/tiles").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 4);
    assert_eq!(json["available"], true);
    assert_eq!(names(&json), vec!["Monument", "Quarry", "Farm", "Pit"]);
    let quarry = &json["tiles"][1];
    assert_eq!(quarry["type"], "Resource");
    assert_eq!(quarry["requiresGoods"], Value::Array(Vec::new()));
    assert_eq!(quarry["requiresOther"], Value::Array(Vec::new()));
    assert_eq!(quarry["produces"][0], "Stone");
}

#[tokio::test]
async fn query_filters_are_applied() {
    let (_, json) = get(sample_router(), "/api/tiles?search=FARM&type=Resource&generation=I").await;
    assert_eq!(names(&json), vec!["Farm"]);

    let (_, json) = get(sample_router(), "/api/tiles?search=&type=&generation=").await;
    assert_eq!(json["count"], 4);
}

#[tokio::test]
async fn chain_filter_sorts_resources_first() {
    let (_, json) = get(sample_router(), "/api/tiles?chain=stone").await;
    assert_eq!(names(&json), vec!["Quarry", "Pit", "Monument"]);
}

#[tokio::test]
async fn filter_options_list_types_generations_and_chains() {
    let (status, json) = get(sample_router(), "/api/filters").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["types"], serde_json::json!(["Resource", "Public"]));
    assert_eq!(json["generations"], serde_json::json!(["I"]));
    assert!(json["chains"]
        .as_array()
        .unwrap()
        .iter()
        .any(|chain| chain == "stone"));
}

#[tokio::test]
async fn unavailable_catalog_reports_empty_state() {
    let router = router_with(TileCatalog::load_or_unavailable("/nonexistent/tiles.json"));

    let (status, json) = get(router.clone(), "/api/tiles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["available"], false);
    assert_eq!(json["count"], 0);

    let (_, health) = get(router, "/api/health").await;
    assert_eq!(health["status"], "unavailable");
    assert_eq!(health["tiles"], 0);
    assert!(health["loaded_at"].is_null());
}

#[tokio::test]
async fn unknown_paths_are_not_found() {
    let response = sample_router()
        .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
