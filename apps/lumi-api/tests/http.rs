use axum::{
	body::{self, Body},
	http::{Request, StatusCode},
};
use tower::util::ServiceExt;

use lumi_api::{routes, state::AppState};
use lumi_config::{
	Collections, Config, EmbeddingProviderConfig, Generation, LlmProviderConfig, Postgres,
	Providers, Qdrant, Recommend, Search, Service, Storage,
};
use lumi_testkit::TestDatabase;

fn test_config(dsn: String) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
			city: "Seoul".to_string(),
		},
		storage: Storage {
			postgres: Postgres { dsn, pool_max_conns: 2 },
			qdrant: Qdrant {
				// Unreachable on purpose; searches degrade to "no match".
				url: "http://127.0.0.1:1".to_string(),
				vector_dim: 8,
				timeout_ms: 500,
				collections: Collections {
					festival: "festival_test".to_string(),
					attraction: "attraction_test".to_string(),
					restaurant: "restaurant_test".to_string(),
					kcontent: "kcontent_test".to_string(),
				},
			},
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: 8,
				timeout_ms: 1_000,
			},
			llm: LlmProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/chat/completions".to_string(),
				model: "test".to_string(),
				timeout_ms: 1_000,
			},
		},
		search: Search {
			vector_weight: 0.8,
			lexical_weight: 0.2,
			search_floor: 0.3,
			per_call_limit: 5,
			accept_threshold: 0.5,
			accept_threshold_kcontent: 0.4,
			multi_match_floor: 0.35,
			multi_match_limit: 20,
		},
		recommend: Recommend { default_count: 10, oversample: 5, max_scroll: 100, max_offset: 50 },
		generation: Generation {
			quick_max_tokens: 250,
			quick_temperature: 0.6,
			comparison_max_tokens: 300,
			advice_max_tokens: 350,
			direct_temperature: 0.7,
		},
	}
}

async fn test_env() -> Option<TestDatabase> {
	let base_dsn = match lumi_testkit::env_dsn() {
		Some(value) => value,
		None => {
			eprintln!("Skipping HTTP tests; set LUMI_PG_DSN to run this test.");

			return None;
		},
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");

	Some(test_db)
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMI_PG_DSN to run."]
async fn health_ok() {
	let Some(test_db) = test_env().await else {
		return;
	};
	let config = test_config(test_db.dsn().to_string());
	let state = AppState::new(config).await.expect("Failed to initialize app state.");
	let app = routes::router(state);
	let response = app
		.oneshot(
			Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMI_PG_DSN to run."]
async fn history_rejects_nonpositive_limit() {
	let Some(test_db) = test_env().await else {
		return;
	};
	let config = test_config(test_db.dsn().to_string());
	let state = AppState::new(config).await.expect("Failed to initialize app state.");
	let app = routes::router(state);
	let response = app
		.oneshot(
			Request::builder()
				.uri("/v1/chat/history?user_id=1&limit=0")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call history.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json: serde_json::Value = serde_json::from_slice(&bytes).expect("Failed to parse response.");

	assert_eq!(json["error_code"], "invalid_request");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set LUMI_PG_DSN to run."]
async fn unmatched_place_search_is_still_ok() {
	let Some(test_db) = test_env().await else {
		return;
	};
	let config = test_config(test_db.dsn().to_string());
	let state = AppState::new(config).await.expect("Failed to initialize app state.");
	let app = routes::router(state);
	let payload = serde_json::json!({
		"user_id": 21,
		"message": "introduce Namsan Tower",
		"mode": "travel"
	});
	// Both the vector index and the embedding endpoint are unreachable, so the
	// turn resolves to the canned "nothing found" reply with HTTP 200.
	let response = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri("/v1/chat/send")
				.header("content-type", "application/json")
				.body(Body::from(payload.to_string()))
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call send.");

	assert_eq!(response.status(), StatusCode::OK);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");
	let json: serde_json::Value = serde_json::from_slice(&bytes).expect("Failed to parse response.");

	assert!(json["results"].as_array().expect("results array").is_empty());
	assert!(json["response"].as_str().expect("response text").contains("Seoul"));
	assert!(json["convers_id"].as_i64().expect("convers_id") > 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
