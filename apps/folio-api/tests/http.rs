use std::sync::Arc;

use axum::{
	body::Body,
	http::{Request, StatusCode},
};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use folio_api::{routes, state::AppState};
use folio_service::FolioService;
use folio_storage::db::Db;

const SAMPLE_CONFIG_TOML: &str =
	include_str!("../../../packages/folio-config/tests/fixtures/sample_config.template.toml");

fn test_state() -> AppState {
	let cfg: folio_config::Config =
		toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.");
	let pool = PgPoolOptions::new()
		.connect_lazy(&cfg.storage.postgres.dsn)
		.expect("Failed to create lazy pool.");

	AppState { service: Arc::new(FolioService::new(cfg, Db { pool })) }
}

#[tokio::test]
async fn health_returns_ok_without_touching_storage() {
	let app = routes::router(test_state(), 1_048_576);
	let response = app
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("request"))
		.await
		.expect("Expected the router to respond.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn ask_with_a_blank_query_maps_to_bad_request() {
	let app = routes::router(test_state(), 1_048_576);
	let payload = serde_json::json!({
		"tenant_id": "t1",
		"session_id": "00000000-0000-0000-0000-000000000001",
		"query": "   "
	});
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/ask")
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("request"),
		)
		.await
		.expect("Expected the router to respond.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_documents_requires_a_tenant_id() {
	let app = routes::router(test_state(), 1_048_576);
	let response = app
		.oneshot(Request::builder().uri("/v1/documents").body(Body::empty()).expect("request"))
		.await
		.expect("Expected the router to respond.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
