use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use futures_util::{Stream, stream};
use serde::{Deserialize, Serialize};

use crate::state::AppState;
use lumi_service::{ChatRequest, ChatResponse, HistoryItem, ServiceError};

const DEFAULT_HISTORY_LIMIT: i64 = 50;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/chat/send", post(send))
		.route("/v1/chat/stream", post(stream_chat))
		.route("/v1/chat/history", get(history).delete(delete_turn))
		.with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn send(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
	let response = state.service.send_message(&payload).await?;

	Ok(Json(response))
}

// Events are relayed as they arrive; a turn that finds nothing still ends the
// stream normally with an error event rather than an HTTP failure.
async fn stream_chat(
	State(state): State<AppState>,
	Json(payload): Json<ChatRequest>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
	let rx = state.service.stream_message(payload);
	let events = stream::unfold(rx, |mut rx| async move {
		let event = rx.recv().await?;

		Some((Event::default().json_data(&event), rx))
	});

	Sse::new(events).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
	user_id: i64,
	limit: Option<i64>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
	items: Vec<HistoryItem>,
	total: i64,
}

async fn history(
	State(state): State<AppState>,
	Query(params): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ApiError> {
	let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
	let items = state.service.history(params.user_id, limit).await?;
	let total = state.service.history_count(params.user_id).await?;

	Ok(Json(HistoryResponse { items, total }))
}

#[derive(Debug, Deserialize)]
struct DeleteTurnRequest {
	convers_id: i64,
	user_id: i64,
}

#[derive(Debug, Serialize)]
struct DeleteTurnResponse {
	deleted: bool,
}

async fn delete_turn(
	State(state): State<AppState>,
	Json(payload): Json<DeleteTurnRequest>,
) -> Result<Json<DeleteTurnResponse>, ApiError> {
	let deleted = state.service.delete_turn(payload.convers_id, payload.user_id).await?;

	Ok(Json(DeleteTurnResponse { deleted }))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}

impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}

impl From<ServiceError> for ApiError {
	fn from(err: ServiceError) -> Self {
		match err {
			ServiceError::InvalidRequest { message } => {
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message)
			},
			ServiceError::Provider { message } => {
				ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", message)
			},
			ServiceError::Storage { message } => {
				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
			},
			ServiceError::Qdrant { message } => {
				ApiError::new(StatusCode::BAD_GATEWAY, "vector_index_error", message)
			},
		}
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
