use regex::Regex;

use crate::category::CategoryMode;

/// Closed intent set. Checked in declaration order; the first match wins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
	Comparison,
	GeneralAdvice,
	MultiLocation,
	Recommendation,
	PlaceSearch,
}

/// Outcome of message analysis. `keyword` is the search keyword for retrieval
/// intents and the raw message otherwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
	pub intent: Intent,
	pub keyword: String,
	pub count: Option<u32>,
	pub is_comparison: bool,
}

const COMPARISON_MARKERS: [&str; 6] =
	[" vs ", "vs.", " versus ", "which one", "which is better", "compare"];

const ADVICE_MARKERS: [&str; 15] = [
	"tip", "tips", "advice", "팁", "조언", "how to", "어떻게", "방법", "what should i know",
	"알아야", "준비", "culture", "문화", "etiquette", "에티켓",
];

/// The k-content surface treats visit-planning questions as advice too, and
/// has no culture markers of its own.
const KCONTENT_ADVICE_MARKERS: [&str; 15] = [
	"tip", "tips", "advice", "팁", "조언", "how to", "어떻게", "방법", "what should i know",
	"알아야", "준비", "etiquette", "에티켓", "visit", "방문",
];

const TRAVEL_PLACE_MARKERS: [&str; 15] = [
	"palace", "temple", "tower", "museum", "park", "궁", "사찰", "타워", "박물관", "공원",
	"restaurant", "food", "레스토랑", "음식", "맛집",
];

const DRAMA_MARKERS: [&str; 8] =
	["drama", "filming", "location", "scene", "드라마", "촬영지", "장면", "장소"];

const RECOMMENDATION_MARKERS: [&str; 10] = [
	"recommend", "suggestion", "suggest", "추천", "places to visit", "where to go", "가볼",
	"best places", "top places", "명소",
];

const KCONTENT_RECOMMENDATION_MARKERS: [&str; 8] =
	["recommend", "suggestion", "suggest", "추천", "best", "top", "popular", "인기"];

const MULTI_LOCATION_MARKERS: [&str; 4] = ["all", "every", "모든", "전부"];

const COUNT_PATTERNS: [&str; 6] = [
	r"(\d+)곳",
	r"(\d+)개",
	r"(\d+)가지",
	r"(\d+)\s*places?",
	r"(\d+)\s*spots?",
	r"(\d+)\s*locations?",
];

const KEYWORD_PHRASE_FILLERS: [&str; 3] = ["tell me about", "what is", "where is"];

const KEYWORD_WORD_FILLERS: [&str; 6] = ["introduce", "about", "the", "a", "an", "me"];

const KCONTENT_KEYWORD_WORD_FILLERS: [&str; 3] = ["filming", "location", "locations"];

/// Classifies a user message into an intent plus extracted parameters. Never
/// fails; the worst case is a `PlaceSearch` over the raw message.
pub fn classify(message: &str, mode: CategoryMode) -> Analysis {
	let lowered = message.to_lowercase();
	let lowered = lowered.trim();
	let count = extract_count(lowered);

	if COMPARISON_MARKERS.iter().any(|marker| lowered.contains(marker)) {
		return Analysis {
			intent: Intent::Comparison,
			keyword: message.to_string(),
			count,
			is_comparison: true,
		};
	}

	let advice_markers: &[&str] = match mode {
		CategoryMode::Travel => &ADVICE_MARKERS,
		CategoryMode::Kcontent => &KCONTENT_ADVICE_MARKERS,
	};
	let has_advice = advice_markers.iter().any(|marker| lowered.contains(marker));
	// Place/category markers veto the advice intent so "tips for visiting the
	// palace" still reaches retrieval.
	let exclusions: &[&str] = match mode {
		CategoryMode::Travel => &TRAVEL_PLACE_MARKERS,
		CategoryMode::Kcontent => &DRAMA_MARKERS,
	};
	let has_concrete_subject = exclusions.iter().any(|marker| lowered.contains(marker));

	if has_advice && !has_concrete_subject {
		return Analysis {
			intent: Intent::GeneralAdvice,
			keyword: message.to_string(),
			count,
			is_comparison: false,
		};
	}

	if mode == CategoryMode::Kcontent
		&& MULTI_LOCATION_MARKERS.iter().any(|marker| lowered.contains(marker))
		&& DRAMA_MARKERS.iter().any(|marker| lowered.contains(marker))
	{
		return Analysis {
			intent: Intent::MultiLocation,
			keyword: clean_keyword(message, mode),
			count,
			is_comparison: false,
		};
	}

	let recommendation_markers: &[&str] = match mode {
		CategoryMode::Travel => &RECOMMENDATION_MARKERS,
		CategoryMode::Kcontent => &KCONTENT_RECOMMENDATION_MARKERS,
	};

	if recommendation_markers.iter().any(|marker| lowered.contains(marker)) || count.is_some() {
		return Analysis {
			intent: Intent::Recommendation,
			keyword: message.to_string(),
			count: Some(count.unwrap_or(10)),
			is_comparison: false,
		};
	}

	Analysis {
		intent: Intent::PlaceSearch,
		keyword: clean_keyword(message, mode),
		count,
		is_comparison: false,
	}
}

/// Scans for an explicit quantity ("5 places", "3곳") anywhere in the message.
/// The first matching pattern wins.
pub fn extract_count(lowered: &str) -> Option<u32> {
	for pattern in COUNT_PATTERNS {
		let Ok(re) = Regex::new(pattern) else { continue };

		if let Some(captures) = re.captures(lowered)
			&& let Some(digits) = captures.get(1)
			&& let Ok(count) = digits.as_str().parse::<u32>()
		{
			return Some(count);
		}
	}

	None
}

/// Strips filler words and collapses whitespace. Falls back to the original
/// message when stripping leaves nothing usable.
pub fn clean_keyword(message: &str, mode: CategoryMode) -> String {
	let mut keyword = message.to_lowercase();

	for phrase in KEYWORD_PHRASE_FILLERS {
		keyword = keyword.replace(phrase, " ");
	}

	let is_filler = |word: &str| {
		KEYWORD_WORD_FILLERS.contains(&word)
			|| (mode == CategoryMode::Kcontent && KCONTENT_KEYWORD_WORD_FILLERS.contains(&word))
	};
	let keyword =
		keyword.split_whitespace().filter(|word| !is_filler(word)).collect::<Vec<_>>().join(" ");

	if keyword.trim().chars().count() < 2 {
		return message.trim().to_string();
	}

	keyword
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn comparison_beats_advice() {
		let analysis =
			classify("N Seoul Tower vs Lotte Tower, any tips?", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::Comparison);
		assert!(analysis.is_comparison);
	}

	#[test]
	fn advice_without_place_marker() {
		let analysis = classify("any etiquette tips for visitors?", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::GeneralAdvice);
	}

	#[test]
	fn korean_etiquette_question_is_advice() {
		let analysis = classify("관람 에티켓 팁 알려줘", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::GeneralAdvice);
	}

	#[test]
	fn myeongso_marks_a_recommendation() {
		let analysis = classify("서울 명소 알려줘", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::Recommendation);
	}

	#[test]
	fn visit_is_an_advice_marker_only_for_kcontent() {
		let kcontent = classify("planning a visit, anything to prepare?", CategoryMode::Kcontent);
		let travel = classify("planning a visit somewhere quiet", CategoryMode::Travel);

		assert_eq!(kcontent.intent, Intent::GeneralAdvice);
		assert_ne!(travel.intent, Intent::GeneralAdvice);
	}

	#[test]
	fn advice_with_place_marker_falls_through_to_search() {
		let analysis = classify("tips for visiting the palace", CategoryMode::Travel);

		assert_ne!(analysis.intent, Intent::GeneralAdvice);
	}

	#[test]
	fn recommendation_with_count() {
		let analysis = classify("best places to visit, recommend 5 places", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::Recommendation);
		assert_eq!(analysis.count, Some(5));
	}

	#[test]
	fn bare_count_implies_recommendation_with_default_kept() {
		let analysis = classify("show 3곳", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::Recommendation);
		assert_eq!(analysis.count, Some(3));
	}

	#[test]
	fn recommendation_marker_without_count_defaults_to_ten() {
		let analysis = classify("recommend somewhere nice", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::Recommendation);
		assert_eq!(analysis.count, Some(10));
	}

	#[test]
	fn multi_location_requires_drama_co_occurrence() {
		let all_locations =
			classify("show me all filming locations from Goblin", CategoryMode::Kcontent);
		let all_cafes = classify("show me all cafes", CategoryMode::Kcontent);

		assert_eq!(all_locations.intent, Intent::MultiLocation);
		assert_ne!(all_cafes.intent, Intent::MultiLocation);
	}

	#[test]
	fn multi_location_never_fires_in_travel_mode() {
		let analysis =
			classify("show me all filming locations from Goblin", CategoryMode::Travel);

		assert_ne!(analysis.intent, Intent::MultiLocation);
	}

	#[test]
	fn place_search_strips_fillers() {
		let analysis = classify("introduce Namsan Tower", CategoryMode::Travel);

		assert_eq!(analysis.intent, Intent::PlaceSearch);
		assert_eq!(analysis.keyword, "namsan tower");
	}

	#[test]
	fn keyword_falls_back_when_stripping_empties() {
		let analysis = classify("the", CategoryMode::Travel);

		assert_eq!(analysis.keyword, "the");
	}
}
