use std::collections::HashSet;

use crate::{ChatService, ServiceError, ServiceResult};
use lumi_domain::{Category, CategoryMode, expand, lexical};

/// One scored hit from a single category. Ephemeral; consumed by the fan-out
/// coordinator within one request.
#[derive(Clone, Debug)]
pub struct CandidateMatch {
	pub category: Category,
	pub id: String,
	pub payload: serde_json::Value,
	pub vector_score: f32,
	pub lexical_score: f32,
	pub combined_score: f32,
}

impl ChatService {
	async fn embed_one(&self, text: &str) -> ServiceResult<Vec<f32>> {
		let vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &[text.to_string()]).await?;
		let Some(vector) = vectors.into_iter().next() else {
			return Err(ServiceError::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(ServiceError::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		Ok(vector)
	}

	/// Best-match search for one category. Expands the keyword, searches every
	/// variant with a permissive floor, and accepts the highest combined score
	/// only when it clears the category's acceptance threshold.
	///
	/// A failed variant (embedding or index call) is logged and skipped; the
	/// remaining variants still count.
	pub async fn search_best(
		&self,
		keyword: &str,
		category: Category,
	) -> ServiceResult<Option<CandidateMatch>> {
		let search = &self.cfg.search;
		let cleaned = expand::preprocess(keyword);
		let variants = expand::expand(keyword, category, &self.cfg.service.city);

		tracing::debug!(keyword, category = category.as_str(), ?variants, "Expanded search query.");

		let mut best: Option<CandidateMatch> = None;

		for variant in &variants {
			let vector = match self.embed_one(variant).await {
				Ok(vector) => vector,
				Err(err) => {
					tracing::warn!(variant, error = %err, "Variant embedding failed; skipping.");

					continue;
				},
			};
			let hits = match self
				.vectors
				.search_points(category, vector, search.per_call_limit as u64, search.search_floor)
				.await
			{
				Ok(hits) => hits,
				Err(err) => {
					tracing::warn!(variant, error = %err, "Variant search failed; skipping.");

					continue;
				},
			};

			for hit in hits {
				let candidate =
					score_candidate(search, category, &cleaned, hit.id, hit.payload, hit.score);

				best = better_of(best, candidate);
			}
		}

		let threshold = acceptance_threshold(search, category);
		let best_score = best.as_ref().map(|candidate| candidate.combined_score);

		match accept(best, threshold) {
			Some(candidate) => {
				tracing::debug!(
					category = category.as_str(),
					score = candidate.combined_score,
					"Accepted best match."
				);

				Ok(Some(candidate))
			},
			None => {
				if let Some(score) = best_score {
					tracing::debug!(
						category = category.as_str(),
						score,
						threshold,
						"Best match below acceptance threshold."
					);
				}

				Ok(None)
			},
		}
	}

	/// Enumeration search for the "all filming locations" path. Collects every
	/// match above the multi-match floor across all variants, deduplicated by
	/// id (first occurrence wins), sorted by descending combined score, and
	/// truncated to `limit`.
	pub async fn search_all_matches(
		&self,
		keyword: &str,
		category: Category,
		limit: usize,
	) -> ServiceResult<Vec<CandidateMatch>> {
		let search = &self.cfg.search;
		let cleaned = expand::preprocess(keyword);
		let variants = expand::expand(keyword, category, &self.cfg.service.city);
		let mut collected = Vec::new();
		let mut seen = HashSet::new();

		for variant in &variants {
			let vector = match self.embed_one(variant).await {
				Ok(vector) => vector,
				Err(err) => {
					tracing::warn!(variant, error = %err, "Variant embedding failed; skipping.");

					continue;
				},
			};
			let hits = match self
				.vectors
				.search_points(category, vector, search.multi_match_limit as u64, search.search_floor)
				.await
			{
				Ok(hits) => hits,
				Err(err) => {
					tracing::warn!(variant, error = %err, "Variant search failed; skipping.");

					continue;
				},
			};

			for hit in hits {
				let candidate =
					score_candidate(search, category, &cleaned, hit.id, hit.payload, hit.score);

				collect_match(&mut collected, &mut seen, candidate, search.multi_match_floor);
			}
		}

		Ok(rank_matches(collected, limit))
	}

	/// Runs `search_best` concurrently across the mode's categories and picks
	/// the winner. One category's failure degrades recall, not availability:
	/// it is logged and treated as "no match".
	pub async fn search_fan_out(&self, keyword: &str, mode: CategoryMode) -> Option<CandidateMatch> {
		let searches = mode.categories().iter().map(|&category| async move {
			match self.search_best(keyword, category).await {
				Ok(hit) => hit,
				Err(err) => {
					tracing::warn!(
						category = category.as_str(),
						error = %err,
						"Category search failed; degrading to no match."
					);

					None
				},
			}
		});
		let candidates =
			futures_util::future::join_all(searches).await.into_iter().flatten().collect();

		pick_winner(candidates)
	}
}

/// Selects the candidate with the highest combined score. Equal scores resolve
/// by the fixed category priority, never by task completion order.
pub fn pick_winner(candidates: Vec<CandidateMatch>) -> Option<CandidateMatch> {
	let mut winner: Option<CandidateMatch> = None;

	for candidate in candidates {
		let better = match &winner {
			None => true,
			Some(current) =>
				candidate.combined_score > current.combined_score
					|| (candidate.combined_score == current.combined_score
						&& candidate.category.priority() < current.category.priority()),
		};

		if better {
			winner = Some(candidate);
		}
	}

	winner
}

/// Scores one raw hit: lexical overlap against the cleaned query, then the
/// weighted combination with the vector score.
pub(crate) fn score_candidate(
	search: &lumi_config::Search,
	category: Category,
	cleaned: &str,
	id: String,
	payload: serde_json::Value,
	vector_score: f32,
) -> CandidateMatch {
	let title = payload_title(category, &payload);
	let lexical_score = lexical::keyword_overlap(cleaned, &title);
	let combined_score = lexical::combined_score(
		vector_score,
		lexical_score,
		search.vector_weight,
		search.lexical_weight,
	);

	CandidateMatch { category, id, payload, vector_score, lexical_score, combined_score }
}

/// Keeps the higher combined score; the incumbent wins ties so earlier
/// variants are stable under re-scoring.
pub(crate) fn better_of(
	best: Option<CandidateMatch>,
	candidate: CandidateMatch,
) -> Option<CandidateMatch> {
	match best {
		Some(best) if best.combined_score >= candidate.combined_score => Some(best),
		_ => Some(candidate),
	}
}

/// Acceptance is strictly greater than the threshold; a candidate exactly at
/// the threshold is rejected.
pub(crate) fn accept(best: Option<CandidateMatch>, threshold: f32) -> Option<CandidateMatch> {
	best.filter(|candidate| candidate.combined_score > threshold)
}

/// Admits a candidate into the multi-match set: above the floor and not a
/// duplicate id (the first occurrence wins).
pub(crate) fn collect_match(
	collected: &mut Vec<CandidateMatch>,
	seen: &mut HashSet<String>,
	candidate: CandidateMatch,
	floor: f32,
) {
	if candidate.combined_score <= floor || !seen.insert(candidate.id.clone()) {
		return;
	}

	collected.push(candidate);
}

/// Orders collected matches by descending combined score and truncates.
pub(crate) fn rank_matches(
	mut collected: Vec<CandidateMatch>,
	limit: usize,
) -> Vec<CandidateMatch> {
	collected.sort_by(|a, b| {
		b.combined_score.partial_cmp(&a.combined_score).unwrap_or(std::cmp::Ordering::Equal)
	});
	collected.truncate(limit);

	collected
}

pub(crate) fn acceptance_threshold(search: &lumi_config::Search, category: Category) -> f32 {
	match category {
		Category::Kcontent => search.accept_threshold_kcontent,
		_ => search.accept_threshold,
	}
}

/// Extracts the display title used for lexical overlap. Payloads nest their
/// fields under a `metadata` object.
pub(crate) fn payload_title(category: Category, payload: &serde_json::Value) -> String {
	let metadata = payload.get("metadata").unwrap_or(payload);
	let text = |key: &str| metadata.get(key).and_then(|v| v.as_str()).unwrap_or_default();

	match category {
		Category::Festival | Category::Attraction => text("title").to_string(),
		Category::Restaurant => text("name").to_string(),
		Category::Kcontent => {
			let drama = text("drama_name");
			let location = text("location_name");

			if drama.is_empty() {
				location.to_string()
			} else if location.is_empty() {
				drama.to_string()
			} else {
				format!("{drama} {location}")
			}
		},
	}
}
