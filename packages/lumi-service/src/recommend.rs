use rand::{Rng, seq::SliceRandom};

use crate::{
	ChatService,
	format::NormalizedResult,
	search::CandidateMatch,
};
use lumi_domain::{Category, CategoryMode};

impl ChatService {
	/// Samples `count` arbitrary items from one category's collection. This is
	/// the "show me variety" path: an oversampled scroll page from a random
	/// offset, shuffled, then truncated. Never similarity search.
	///
	/// A failed scroll degrades to an empty sample, mirroring per-category
	/// search failures.
	pub async fn sample_category(&self, category: Category, count: u32) -> Vec<NormalizedResult> {
		let recommend = &self.cfg.recommend;
		let fetch = (count.saturating_mul(recommend.oversample)).min(recommend.max_scroll);
		let offset = rand::rng().random_range(0..=recommend.max_offset as u64);
		let mut hits = match self.vectors.scroll_points(category, fetch, Some(offset)).await {
			Ok(hits) => hits,
			Err(err) => {
				tracing::warn!(
					category = category.as_str(),
					error = %err,
					"Recommendation scroll failed; returning empty sample."
				);

				return Vec::new();
			},
		};

		hits.shuffle(&mut rand::rng());
		hits.truncate(count as usize);

		hits.into_iter()
			.map(|hit| {
				crate::format::format(&CandidateMatch {
					category,
					id: hit.id,
					payload: hit.payload,
					vector_score: 0.0,
					lexical_score: 0.0,
					combined_score: 0.0,
				})
			})
			.collect()
	}

	/// The category sampled when the user just asks for "places to visit".
	pub(crate) fn recommendation_category(mode: CategoryMode) -> Category {
		match mode {
			CategoryMode::Travel => Category::Attraction,
			CategoryMode::Kcontent => Category::Kcontent,
		}
	}
}

/// Canned recommendation text; the count is its only data-dependent element.
pub(crate) fn recommendation_text(count: usize, city: &str, mode: CategoryMode) -> String {
	if count == 0 {
		return "Sorry, I couldn't find any recommendations at the moment.".to_string();
	}

	match mode {
		CategoryMode::Travel => format!(
			"Here are {count} recommended places in {city}! Ask me about any specific location for more details!"
		),
		CategoryMode::Kcontent => format!(
			"Here are {count} K-Drama filming locations in {city}! Ask me about any of them for the full story!"
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recommendation_text_embeds_count() {
		let text = recommendation_text(5, "Seoul", CategoryMode::Travel);

		assert!(text.contains('5'));
		assert!(text.contains("Seoul"));
	}

	#[test]
	fn empty_sample_has_apologetic_text() {
		let text = recommendation_text(0, "Seoul", CategoryMode::Kcontent);

		assert!(text.starts_with("Sorry"));
	}

	#[test]
	fn travel_mode_samples_attractions() {
		assert_eq!(ChatService::recommendation_category(CategoryMode::Travel), Category::Attraction);
		assert_eq!(
			ChatService::recommendation_category(CategoryMode::Kcontent),
			Category::Kcontent
		);
	}
}
