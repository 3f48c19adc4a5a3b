use crate::{
	ChatService, ServiceResult,
	format::{self, MapMarker, NormalizedResult},
	prompt::{self, Prompt, PromptFamily},
	recommend,
};
use lumi_domain::{Analysis, Category, CategoryMode, Intent, classify};
use lumi_providers::GenerationOptions;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct ChatRequest {
	pub user_id: i64,
	pub message: String,
	pub mode: CategoryMode,
}

/// The blocking chat payload. `results` holds every surviving result; the
/// per-category lists and `has_*` flags exist for client-side branching.
#[derive(Clone, Debug, serde::Serialize)]
pub struct ChatResponse {
	pub response: String,
	pub convers_id: i64,
	pub results: Vec<NormalizedResult>,
	pub festivals: Vec<NormalizedResult>,
	pub attractions: Vec<NormalizedResult>,
	pub restaurants: Vec<NormalizedResult>,
	pub kcontents: Vec<NormalizedResult>,
	pub has_festivals: bool,
	pub has_attractions: bool,
	pub has_restaurants: bool,
	pub has_kcontents: bool,
	pub map_markers: Vec<MapMarker>,
}

pub(crate) enum GenerationKind {
	Quick,
	Comparison,
	Advice,
}

impl ChatService {
	/// Blocking chat turn. Every branch, including "nothing found", persists
	/// exactly one conversation row before returning.
	pub async fn send_message(&self, req: &ChatRequest) -> ServiceResult<ChatResponse> {
		let analysis = classify(&req.message, req.mode);

		tracing::info!(
			user_id = req.user_id,
			intent = ?analysis.intent,
			mode = ?req.mode,
			"Handling chat turn."
		);

		match analysis.intent {
			Intent::Comparison => self.direct_turn(req, GenerationKind::Comparison).await,
			Intent::GeneralAdvice => self.direct_turn(req, GenerationKind::Advice).await,
			Intent::MultiLocation => self.multi_location_turn(req, &analysis).await,
			Intent::Recommendation => self.recommendation_turn(req, &analysis).await,
			Intent::PlaceSearch => self.place_search_turn(req, &analysis).await,
		}
	}

	/// Comparison and advice questions skip retrieval entirely; the raw
	/// message goes straight into a family-specific prompt.
	async fn direct_turn(&self, req: &ChatRequest, kind: GenerationKind) -> ServiceResult<ChatResponse> {
		let family = PromptFamily::for_message(req.mode, &req.message);
		let prompt = match kind {
			GenerationKind::Advice => Prompt::Advice { family, message: &req.message },
			_ => Prompt::Comparison { family, message: &req.message },
		};
		let messages = prompt::as_messages(prompt);
		let text = self
			.providers
			.chat
			.complete(&self.cfg.providers.llm, &messages, self.generation_options(kind))
			.await?;
		let convers_id = self.db.insert_conversation(req.user_id, &req.message, &text).await?;

		Ok(build_response(text, convers_id, Vec::new()))
	}

	async fn recommendation_turn(
		&self,
		req: &ChatRequest,
		analysis: &Analysis,
	) -> ServiceResult<ChatResponse> {
		let count = analysis.count.unwrap_or(self.cfg.recommend.default_count);
		let category = Self::recommendation_category(req.mode);
		let sampled = self.sample_category(category, count).await;
		let text = recommend::recommendation_text(sampled.len(), &self.cfg.service.city, req.mode);
		let convers_id = self.db.insert_conversation(req.user_id, &req.message, &text).await?;

		Ok(build_response(text, convers_id, sampled))
	}

	async fn multi_location_turn(
		&self,
		req: &ChatRequest,
		analysis: &Analysis,
	) -> ServiceResult<ChatResponse> {
		let limit =
			analysis.count.unwrap_or(self.cfg.search.multi_match_limit) as usize;
		let matches =
			self.search_all_matches(&analysis.keyword, Category::Kcontent, limit).await?;
		let results: Vec<NormalizedResult> = matches.iter().map(format::format).collect();
		let text = multi_location_text(results.len());
		let convers_id = self.db.insert_conversation(req.user_id, &req.message, &text).await?;

		Ok(build_response(text, convers_id, results))
	}

	async fn place_search_turn(
		&self,
		req: &ChatRequest,
		analysis: &Analysis,
	) -> ServiceResult<ChatResponse> {
		let winner = self.search_fan_out(&analysis.keyword, req.mode).await;
		let Some(winner) = winner else {
			// "Nothing found" is a conversational outcome, not an error; the
			// turn still lands in the history.
			let text = not_found_text(&self.cfg.service.city, req.mode);
			let convers_id =
				self.db.insert_conversation(req.user_id, &req.message, &text).await?;

			return Ok(build_response(text, convers_id, Vec::new()));
		};
		let result = format::format(&winner);
		let messages = prompt::as_messages(prompt::quick_prompt(&result, &req.message));
		let text = self
			.providers
			.chat
			.complete(
				&self.cfg.providers.llm,
				&messages,
				self.generation_options(GenerationKind::Quick),
			)
			.await?;
		let convers_id = self.db.insert_conversation(req.user_id, &req.message, &text).await?;

		Ok(build_response(text, convers_id, vec![result]))
	}

	pub(crate) fn generation_options(&self, kind: GenerationKind) -> GenerationOptions {
		let generation = &self.cfg.generation;

		match kind {
			GenerationKind::Quick => GenerationOptions {
				max_tokens: generation.quick_max_tokens,
				temperature: generation.quick_temperature,
			},
			GenerationKind::Comparison => GenerationOptions {
				max_tokens: generation.comparison_max_tokens,
				temperature: generation.direct_temperature,
			},
			GenerationKind::Advice => GenerationOptions {
				max_tokens: generation.advice_max_tokens,
				temperature: generation.direct_temperature,
			},
		}
	}
}

pub(crate) fn not_found_text(city: &str, mode: CategoryMode) -> String {
	match mode {
		CategoryMode::Travel => format!(
			"Hello! I couldn't find that one. Feel free to ask me about {city}'s restaurants, festivals, or attractions!"
		),
		CategoryMode::Kcontent => format!(
			"Hey K-Drama fan! I couldn't find that filming location. Ask me about any drama shot in {city}!"
		),
	}
}

pub(crate) fn multi_location_text(count: usize) -> String {
	if count == 0 {
		"Sorry, I couldn't find any filming locations for that drama.".to_string()
	} else {
		format!("Found {count} filming locations! Pick any card to explore the spot.")
	}
}

/// Assembles the response payload: per-category partitions and flags derive
/// from the surviving results, never from separate bookkeeping.
pub(crate) fn build_response(
	response: String,
	convers_id: i64,
	results: Vec<NormalizedResult>,
) -> ChatResponse {
	let map_markers = format::project_markers(&results);
	let by_category = |category: Category| -> Vec<NormalizedResult> {
		results.iter().filter(|r| r.category == category).cloned().collect()
	};
	let festivals = by_category(Category::Festival);
	let attractions = by_category(Category::Attraction);
	let restaurants = by_category(Category::Restaurant);
	let kcontents = by_category(Category::Kcontent);

	ChatResponse {
		response,
		convers_id,
		has_festivals: !festivals.is_empty(),
		has_attractions: !attractions.is_empty(),
		has_restaurants: !restaurants.is_empty(),
		has_kcontents: !kcontents.is_empty(),
		festivals,
		attractions,
		restaurants,
		kcontents,
		results,
		map_markers,
	}
}
