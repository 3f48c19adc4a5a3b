use std::collections::HashSet;

/// Jaccard overlap between the query's token set and a title's token set,
/// case-folded and whitespace-tokenized. Zero when the union is empty.
pub fn keyword_overlap(query: &str, title: &str) -> f32 {
	let query_tokens: HashSet<String> =
		query.to_lowercase().split_whitespace().map(str::to_string).collect();
	let title_tokens: HashSet<String> =
		title.to_lowercase().split_whitespace().map(str::to_string).collect();
	let overlap = query_tokens.intersection(&title_tokens).count();
	let total = query_tokens.union(&title_tokens).count();

	if total == 0 { 0.0 } else { overlap as f32 / total as f32 }
}

/// Weighted sum of vector similarity and lexical overlap. Recall is
/// vector-dominated; the lexical term breaks near-ties.
pub fn combined_score(vector_score: f32, lexical_score: f32, vector_weight: f32, lexical_weight: f32) -> f32 {
	vector_score * vector_weight + lexical_score * lexical_weight
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn overlap_is_case_folded_jaccard() {
		let score = keyword_overlap("namsan tower", "Namsan Seoul Tower");

		// Intersection {namsan, tower}, union {namsan, seoul, tower}.
		assert!((score - 2.0 / 3.0).abs() < 1e-6);
	}

	#[test]
	fn overlap_of_empty_strings_is_zero() {
		assert_eq!(keyword_overlap("", ""), 0.0);
	}

	#[test]
	fn disjoint_titles_score_zero() {
		assert_eq!(keyword_overlap("namsan tower", "gwangjang market"), 0.0);
	}

	#[test]
	fn combined_score_weights_vector_heavier() {
		let high_vector = combined_score(0.9, 0.0, 0.8, 0.2);
		let high_lexical = combined_score(0.0, 0.9, 0.8, 0.2);

		assert!(high_vector > high_lexical);
	}
}
