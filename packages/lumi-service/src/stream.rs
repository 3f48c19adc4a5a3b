use std::sync::Arc;

use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::{
	ChatService, ServiceResult,
	compose::{self, ChatRequest, ChatResponse, GenerationKind},
	format::{self, NormalizedResult},
	prompt::{self, Prompt, PromptFamily},
	recommend,
};
use lumi_domain::{Category, Intent, classify};

const EVENT_BUFFER: usize = 32;

/// One streaming event. The sequence is linear: `searching → found →
/// generating → chunk* → done`, with `error` terminal at any point; canned and
/// direct paths skip `searching`/`found`.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
	Searching {
		message: String,
	},
	Found {
		title: String,
		result: NormalizedResult,
	},
	Generating {
		message: String,
	},
	Chunk {
		content: String,
	},
	Done {
		#[serde(flatten)]
		payload: ChatResponse,
	},
	Error {
		message: String,
	},
}

impl ChatService {
	/// Drives one streamed chat turn. Events arrive on the returned channel in
	/// emission order; the turn runs to `done` or `error` even if the consumer
	/// stops reading.
	pub fn stream_message(self: &Arc<Self>, req: ChatRequest) -> mpsc::Receiver<ChatEvent> {
		let (tx, rx) = mpsc::channel(EVENT_BUFFER);
		let service = self.clone();

		tokio::spawn(async move {
			if let Err(err) = service.drive_stream(&req, &tx).await {
				tracing::error!(user_id = req.user_id, error = %err, "Streamed turn failed.");

				let _ = tx.send(ChatEvent::Error { message: err.to_string() }).await;
			}
		});

		rx
	}

	async fn drive_stream(
		&self,
		req: &ChatRequest,
		tx: &mpsc::Sender<ChatEvent>,
	) -> ServiceResult<()> {
		let analysis = classify(&req.message, req.mode);

		match analysis.intent {
			Intent::Comparison => {
				self.stream_direct(req, tx, GenerationKind::Comparison, "Comparing options...")
					.await
			},
			Intent::GeneralAdvice => {
				self.stream_direct(req, tx, GenerationKind::Advice, "Preparing helpful tips...")
					.await
			},
			Intent::Recommendation => {
				emit(tx, ChatEvent::Generating { message: "Finding great places...".to_string() })
					.await;

				let count = analysis.count.unwrap_or(self.cfg.recommend.default_count);
				let category = Self::recommendation_category(req.mode);
				let sampled = self.sample_category(category, count).await;
				let text =
					recommend::recommendation_text(sampled.len(), &self.cfg.service.city, req.mode);
				let convers_id =
					self.db.insert_conversation(req.user_id, &req.message, &text).await?;

				emit(tx, ChatEvent::Done { payload: compose::build_response(text, convers_id, sampled) })
					.await;

				Ok(())
			},
			Intent::MultiLocation => {
				emit(tx, ChatEvent::Searching {
					message: "Searching for filming locations...".to_string(),
				})
				.await;

				let limit = analysis.count.unwrap_or(self.cfg.search.multi_match_limit) as usize;
				let matches =
					self.search_all_matches(&analysis.keyword, Category::Kcontent, limit).await?;
				let results: Vec<NormalizedResult> = matches.iter().map(format::format).collect();
				let text = compose::multi_location_text(results.len());
				let convers_id =
					self.db.insert_conversation(req.user_id, &req.message, &text).await?;

				emit(tx, ChatEvent::Done { payload: compose::build_response(text, convers_id, results) })
					.await;

				Ok(())
			},
			Intent::PlaceSearch => {
				emit(tx, ChatEvent::Searching {
					message: "Searching for information...".to_string(),
				})
				.await;

				let Some(winner) = self.search_fan_out(&analysis.keyword, req.mode).await else {
					// The soft miss stays conversational; nothing is persisted
					// for an aborted stream.
					emit(tx, ChatEvent::Error {
						message: compose::not_found_text(&self.cfg.service.city, req.mode),
					})
					.await;

					return Ok(());
				};
				let result = format::format(&winner);

				emit(tx, ChatEvent::Found { title: result.title.clone(), result: result.clone() })
					.await;
				emit(tx, ChatEvent::Generating { message: "Preparing response...".to_string() })
					.await;

				let messages = prompt::as_messages(prompt::quick_prompt(&result, &req.message));
				let text =
					self.relay_generation(tx, &messages, GenerationKind::Quick).await?;
				let convers_id =
					self.db.insert_conversation(req.user_id, &req.message, &text).await?;

				emit(tx, ChatEvent::Done {
					payload: compose::build_response(text, convers_id, vec![result]),
				})
				.await;

				Ok(())
			},
		}
	}

	async fn stream_direct(
		&self,
		req: &ChatRequest,
		tx: &mpsc::Sender<ChatEvent>,
		kind: GenerationKind,
		status: &str,
	) -> ServiceResult<()> {
		emit(tx, ChatEvent::Generating { message: status.to_string() }).await;

		let family = PromptFamily::for_message(req.mode, &req.message);
		let prompt = match kind {
			GenerationKind::Advice => Prompt::Advice { family, message: &req.message },
			_ => Prompt::Comparison { family, message: &req.message },
		};
		let messages = prompt::as_messages(prompt);
		let text = self.relay_generation(tx, &messages, kind).await?;
		let convers_id = self.db.insert_conversation(req.user_id, &req.message, &text).await?;

		emit(tx, ChatEvent::Done { payload: compose::build_response(text, convers_id, Vec::new()) })
			.await;

		Ok(())
	}

	/// Relays provider deltas as `chunk` events in arrival order and returns
	/// the accumulated text. A mid-stream provider error aborts the turn
	/// before anything is persisted.
	async fn relay_generation(
		&self,
		tx: &mpsc::Sender<ChatEvent>,
		messages: &[serde_json::Value],
		kind: GenerationKind,
	) -> ServiceResult<String> {
		let options = self.generation_options(kind);
		let mut deltas =
			self.providers.chat.stream(&self.cfg.providers.llm, messages, options).await?;
		let mut full = String::new();

		while let Some(delta) = deltas.next().await {
			let content = delta?;

			full.push_str(&content);

			emit(tx, ChatEvent::Chunk { content }).await;
		}

		Ok(full)
	}
}

/// A dropped receiver means the client went away; the turn still completes.
async fn emit(tx: &mpsc::Sender<ChatEvent>, event: ChatEvent) {
	if tx.send(event).await.is_err() {
		tracing::debug!("Stream consumer disconnected; continuing turn.");
	}
}
