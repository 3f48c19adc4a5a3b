use tracing::debug;

use crate::category::Category;

/// Stopwords stripped before searching. Deliberately small; over-stripping
/// destroys named-entity queries.
const SEARCH_STOPWORDS: [&str; 13] = [
	"a", "an", "the", "in", "at", "on", "me", "to", "introduce", "tell", "show", "explain",
	"describe",
];

/// Alternate spellings, romanizations, and English/local-script synonyms for
/// the travel categories, mapped to the canonical form the index was built
/// with. Longest match is applied first so "hongdae food scene" is not
/// half-rewritten by "hongdae food".
const TRAVEL_CORRECTIONS: [(&str, &str); 26] = [
	("namsan tower", "namsan seoul tower"),
	("n tower", "namsan seoul tower"),
	("seoul tower", "namsan seoul tower"),
	("63 building", "63빌딩"),
	("lotte tower", "lotte world tower"),
	("dongdaemun", "dongdaemun design plaza"),
	("myeongdong", "myeongdong shopping street"),
	("gangnam", "gangnam district"),
	("hongdae", "hongik university area"),
	("bukchon", "bukchon hanok village"),
	("insadong", "insadong cultural street"),
	("itaewon", "itaewon global village"),
	("korean bbq", "korean barbecue"),
	("korean food", "korean restaurant"),
	("chinese food", "chinese restaurant"),
	("japanese food", "japanese restaurant"),
	("italian food", "italian restaurant"),
	("hongdae food", "hongik university restaurant"),
	("hongdae food scene", "hongik university dining"),
	("gangnam food", "gangnam district restaurant"),
	("gangnam korean bbq", "gangnam barbecue"),
	("myeongdong food", "myeongdong restaurant"),
	("itaewon food", "itaewon international restaurant"),
	("itaewon restaurants", "itaewon global dining"),
	("insadong food", "insadong traditional restaurant"),
	("yeouido food", "yeouido business district restaurant"),
];

/// K-drama specific corrections: English drama titles to the local-script
/// titles the k-content collection was embedded with.
const KCONTENT_CORRECTIONS: [(&str, &str); 10] = [
	("crash landing on you", "사랑의 불시착"),
	("itaewon class", "이태원 클라쓰"),
	("kingdom", "킹덤"),
	("goblin", "도깨비"),
	("descendants of the sun", "태양의 후예"),
	("my love from the star", "별에서 온 그대"),
	("filming location", "촬영지"),
	("drama location", "드라마 촬영지"),
	("kdrama", "한국 드라마"),
	("k-drama", "한국 드라마"),
];

/// English category nouns swapped for their local-script equivalents when
/// generating travel variants.
const TRAVEL_NOUN_SWAPS: [(&str, &str); 7] = [
	("tower", "타워"),
	("palace", "궁"),
	("temple", "사"),
	("market", "시장"),
	("park", "공원"),
	("restaurant", "맛집"),
	("food", "음식"),
];

const KCONTENT_NOUN_SWAPS: [(&str, &str); 3] =
	[("filming location", "촬영지"), ("location", "장소"), ("drama", "드라마")];

/// Upper bound on the searched variant set: the base query plus at most four
/// rewrites. Every variant costs one embedding call.
const MAX_VARIANTS: usize = 5;

/// Strips the search stopword set and collapses whitespace. Returns the
/// original text when stripping would empty the query.
pub fn preprocess(query: &str) -> String {
	let cleaned = query
		.to_lowercase()
		.split_whitespace()
		.filter(|word| !SEARCH_STOPWORDS.contains(word))
		.collect::<Vec<_>>()
		.join(" ");

	if cleaned.is_empty() { query.to_string() } else { cleaned }
}

/// Applies the category's correction table, longest match first. Each
/// substitution is logged for observability.
pub fn normalize(query: &str, category: Category) -> String {
	let corrections: &[(&str, &str)] = match category {
		Category::Kcontent => &KCONTENT_CORRECTIONS,
		_ => &TRAVEL_CORRECTIONS,
	};
	let mut ordered = corrections.to_vec();

	ordered.sort_by_key(|(wrong, _)| std::cmp::Reverse(wrong.len()));

	let mut normalized = query.to_string();

	for (wrong, correct) in ordered {
		if normalized.to_lowercase().contains(wrong) {
			normalized = replace_case_insensitive(&normalized, wrong, correct);

			debug!(from = wrong, to = correct, "Applied query correction.");
		}
	}

	normalized
}

/// Expands a raw keyword into the ordered, deduplicated set of query variants
/// searched against the embedding index. Never fails; the worst case is a
/// singleton set holding the preprocessed input.
pub fn expand(raw: &str, category: Category, city: &str) -> Vec<String> {
	let cleaned = preprocess(raw);
	let normalized = normalize(&cleaned, category);
	let mut variants = vec![normalized.clone()];
	let lowered = normalized.to_lowercase();

	match category {
		Category::Kcontent =>
			for (from, to) in KCONTENT_NOUN_SWAPS {
				if lowered.contains(from) {
					variants.push(replace_case_insensitive(&normalized, from, to));
				}
			},
		_ => {
			// Widen short queries with the city name when it is absent.
			if !lowered.contains(&city.to_lowercase())
				&& normalized.split_whitespace().count() <= 2
			{
				variants.push(format!("{normalized} {city}"));
				variants.push(format!("{city} {normalized}"));
			}

			for (from, to) in TRAVEL_NOUN_SWAPS {
				if lowered.contains(from) {
					variants.push(replace_case_insensitive(&normalized, from, to));
				}
			}
		},
	}

	let mut variants = dedup_preserving_order(variants);

	variants.truncate(MAX_VARIANTS);

	variants
}

fn replace_case_insensitive(text: &str, from: &str, to: &str) -> String {
	let lowered = text.to_lowercase();
	let mut out = String::with_capacity(text.len());
	let mut cursor = 0;

	while let Some(found) = lowered[cursor..].find(from) {
		let start = cursor + found;

		out.push_str(&text[cursor..start]);
		out.push_str(to);

		cursor = start + from.len();
	}

	out.push_str(&text[cursor..]);

	out
}

fn dedup_preserving_order(variants: Vec<String>) -> Vec<String> {
	let mut seen = std::collections::HashSet::new();
	let mut out = Vec::with_capacity(variants.len());

	for variant in variants {
		if seen.insert(variant.clone()) {
			out.push(variant);
		}
	}

	out
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn preprocess_strips_stopwords() {
		assert_eq!(preprocess("introduce me to the Namsan Tower"), "namsan tower");
	}

	#[test]
	fn preprocess_falls_back_on_empty() {
		assert_eq!(preprocess("the"), "the");
	}

	#[test]
	fn normalize_applies_longest_match_first() {
		let normalized = normalize("hongdae food scene", Category::Restaurant);

		assert_eq!(normalized, "hongik university dining");
	}

	#[test]
	fn expand_adds_city_for_short_queries() {
		let variants = expand("Namsan Tower", Category::Attraction, "seoul");

		// The correction table already injects "seoul" into the canonical
		// form, so the base variant carries it.
		assert!(variants.iter().any(|variant| variant.contains("seoul")));
	}

	#[test]
	fn expand_swaps_english_nouns() {
		let variants = expand("gwangjang market", Category::Attraction, "seoul");

		assert!(variants.iter().any(|variant| variant.contains("시장")));
	}

	#[test]
	fn expand_translates_drama_terms() {
		let variants = expand("Goblin filming location", Category::Kcontent, "seoul");

		assert!(variants.iter().any(|variant| variant.contains("도깨비")));
	}

	#[test]
	fn expand_is_idempotent_on_clean_single_token() {
		let variants = expand("Gwanghwamun-Plaza-Unique", Category::Kcontent, "seoul");

		assert_eq!(variants, vec!["gwanghwamun-plaza-unique".to_string()]);
	}

	#[test]
	fn expand_caps_the_variant_set() {
		// Seven swap candidates would yield eight variants uncapped.
		let variants =
			expand("tower palace temple market park restaurant food", Category::Attraction, "seoul");

		assert_eq!(variants.len(), MAX_VARIANTS);
		assert_eq!(variants[0], "tower palace temple market park restaurant food");
	}

	#[test]
	fn expand_deduplicates_variants() {
		let variants = expand("seoul tower", Category::Attraction, "seoul");
		let mut unique = variants.clone();

		unique.sort();
		unique.dedup();

		assert_eq!(variants.len(), unique.len());
	}
}
