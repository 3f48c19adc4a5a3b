use crate::format::{NormalizedResult, ResultDetails, truncate_chars};
use lumi_domain::CategoryMode;

/// Free text embedded into a prompt is capped before insertion; uncapped
/// catalog descriptions are a latency and cost risk at generation time.
const MAX_SNIPPET_CHARS: usize = 500;

const RESTAURANT_QUERY_MARKERS: [&str; 14] = [
	"restaurant", "food", "eat", "dining", "meal", "cuisine", "dish", "레스토랑", "음식", "먹",
	"식당", "맛집", "요리", "음식점",
];

/// Which voice answers direct (non-retrieval) questions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptFamily {
	General,
	Restaurant,
	Kcontent,
}

impl PromptFamily {
	/// The k-content surface always answers in its own voice; the travel
	/// surface switches to the restaurant expert when the message is about
	/// food.
	pub fn for_message(mode: CategoryMode, message: &str) -> Self {
		match mode {
			CategoryMode::Kcontent => Self::Kcontent,
			CategoryMode::Travel => {
				let lowered = message.to_lowercase();

				if RESTAURANT_QUERY_MARKERS.iter().any(|marker| lowered.contains(marker)) {
					Self::Restaurant
				} else {
					Self::General
				}
			},
		}
	}
}

/// One fully-typed prompt. Every variant carries exactly the fields its
/// template needs, so a missing placeholder cannot happen at render time.
#[derive(Debug)]
pub enum Prompt<'a> {
	FestivalQuick {
		title: &'a str,
		start_date: &'a str,
		end_date: &'a str,
		description: &'a str,
		message: &'a str,
	},
	AttractionQuick {
		title: &'a str,
		address: &'a str,
		hours_of_operation: &'a str,
		description: &'a str,
		message: &'a str,
	},
	RestaurantQuick {
		name: &'a str,
		place: &'a str,
		description: &'a str,
		message: &'a str,
	},
	KcontentQuick {
		drama_name: &'a str,
		location_name: &'a str,
		address: &'a str,
		trip_tip: &'a str,
		keyword: &'a str,
		message: &'a str,
	},
	Comparison {
		family: PromptFamily,
		message: &'a str,
	},
	Advice {
		family: PromptFamily,
		message: &'a str,
	},
}

/// Builds the retrieval-grounded prompt for a winning result.
pub fn quick_prompt<'a>(result: &'a NormalizedResult, message: &'a str) -> Prompt<'a> {
	match &result.details {
		ResultDetails::Festival { start_date, end_date, description, .. } => Prompt::FestivalQuick {
			title: &result.title,
			start_date,
			end_date,
			description,
			message,
		},
		ResultDetails::Attraction { address, hours_of_operation, description, .. } =>
			Prompt::AttractionQuick {
				title: &result.title,
				address,
				hours_of_operation,
				description,
				message,
			},
		ResultDetails::Restaurant { place, description, .. } => Prompt::RestaurantQuick {
			name: &result.title,
			place,
			description,
			message,
		},
		ResultDetails::Kcontent { drama_name, location_name, address, trip_tip, keyword, .. } =>
			Prompt::KcontentQuick {
				drama_name,
				location_name,
				address,
				trip_tip,
				keyword,
				message,
			},
	}
}

pub fn render(prompt: Prompt<'_>) -> String {
	match prompt {
		Prompt::FestivalQuick { title, start_date, end_date, description, message } => format!(
			"You are a friendly travel guide providing festival information.\n\n\
			Festival information:\n\
			- Title: {title}\n\
			- Period: {start_date} ~ {end_date}\n\
			- Description: {description}\n\n\
			User question: {message}\n\n\
			Guidelines:\n\
			1. Use a warm and enthusiastic tone\n\
			2. Highlight what makes this festival special\n\
			3. Mention the dates and location clearly\n\
			4. Include visitor tips if relevant\n\
			5. Keep it concise, around 150-250 characters",
			description = truncate_chars(description, MAX_SNIPPET_CHARS),
		),
		Prompt::AttractionQuick { title, address, hours_of_operation, description, message } =>
			format!(
				"You are a friendly travel guide providing attraction information.\n\n\
				Attraction information:\n\
				- Title: {title}\n\
				- Address: {address}\n\
				- Operating Hours: {hours_of_operation}\n\
				- Description: {description}\n\n\
				User question: {message}\n\n\
				Guidelines:\n\
				1. Use a warm and welcoming tone\n\
				2. Highlight the main features and what visitors can experience\n\
				3. Include practical information like location and hours\n\
				4. Mention transportation tips if relevant\n\
				5. Keep it concise, around 150-250 characters",
				description = truncate_chars(description, MAX_SNIPPET_CHARS),
			),
		Prompt::RestaurantQuick { name, place, description, message } => format!(
			"You are a professional guide providing restaurant information.\n\n\
			Restaurant information:\n\
			- Name: {name}\n\
			- Location: {place}\n\
			- Description: {description}\n\n\
			User question: {message}\n\n\
			Guidelines:\n\
			1. Use a friendly and informative tone\n\
			2. Highlight the restaurant's features and popular menu items\n\
			3. Include location and accessibility information\n\
			4. Keep it concise, around 150-250 characters",
			description = truncate_chars(description, MAX_SNIPPET_CHARS),
		),
		Prompt::KcontentQuick { drama_name, location_name, address, trip_tip, keyword, message } =>
			format!(
				"You are an enthusiastic K-Drama fan guide helping visitors discover filming locations.\n\n\
				K-Drama information:\n\
				- Drama/Show: {drama_name}\n\
				- Filming Location: {location_name}\n\
				- Address: {address}\n\
				- Travel Tip: {trip_tip}\n\
				- Keywords: {keyword}\n\n\
				User question: {message}\n\n\
				Guidelines:\n\
				1. Share genuine fan excitement about the location\n\
				2. Mention the drama name and what makes this spot special\n\
				3. Include practical info (location, access) naturally\n\
				4. Write 4-6 energetic sentences",
				trip_tip = truncate_chars(trip_tip, MAX_SNIPPET_CHARS),
			),
		Prompt::Comparison { family, message } => {
			let (role, focus) = match family {
				PromptFamily::General =>
					("a helpful travel guide", "location, experience, timing, cost"),
				PromptFamily::Restaurant =>
					("a restaurant expert", "food types, price range, atmosphere, location"),
				PromptFamily::Kcontent =>
					("a K-Drama location guide", "dramas, scenes, atmosphere, accessibility"),
			};

			format!(
				"You are {role}. Please answer the user's comparison question.\n\n\
				User question: {message}\n\n\
				Guidelines:\n\
				1. Provide a balanced comparison of the options mentioned\n\
				2. Consider relevant factors like {focus}\n\
				3. Mention the unique features of each option\n\
				4. Suggest which might be better for different preferences\n\
				5. Write in detail, around 250-300 characters\n\n\
				Provide your comparison in a natural, conversational way.",
			)
		},
		Prompt::Advice { family, message } => {
			let (role, focus) = match family {
				PromptFamily::General =>
					("a knowledgeable travel guide", "travel, culture, transportation"),
				PromptFamily::Restaurant => (
					"an expert advisor on local food culture",
					"food culture, dining etiquette, ordering methods",
				),
				PromptFamily::Kcontent =>
					("a K-Drama location guide", "filming locations, fan etiquette, visit timing"),
			};

			format!(
				"You are {role} helping visitors.\n\n\
				User question: {message}\n\n\
				Guidelines:\n\
				1. Provide practical and useful advice\n\
				2. Include tips about {focus}\n\
				3. Explain in a clear and helpful way\n\
				4. Include specific examples when possible\n\
				5. Write in detail, around 300-350 characters\n\n\
				Share your advice in a friendly and supportive way.",
			)
		},
	}
}

/// Wraps a rendered prompt into the single-user-message shape the completion
/// endpoint expects.
pub fn as_messages(prompt: Prompt<'_>) -> Vec<serde_json::Value> {
	vec![serde_json::json!({ "role": "user", "content": render(prompt) })]
}

#[cfg(test)]
mod tests {
	use super::*;
	use lumi_domain::Category;

	#[test]
	fn travel_mode_switches_to_restaurant_family_on_food_queries() {
		assert_eq!(
			PromptFamily::for_message(CategoryMode::Travel, "Where should I eat tonight?"),
			PromptFamily::Restaurant
		);
		assert_eq!(
			PromptFamily::for_message(CategoryMode::Travel, "Gyeongbokgung vs Changdeokgung"),
			PromptFamily::General
		);
	}

	#[test]
	fn kcontent_mode_always_uses_its_own_family() {
		assert_eq!(
			PromptFamily::for_message(CategoryMode::Kcontent, "best food near the set"),
			PromptFamily::Kcontent
		);
	}

	#[test]
	fn quick_prompt_embeds_result_fields() {
		let result = NormalizedResult {
			category: Category::Festival,
			id: "315".to_string(),
			title: "Seoul Lantern Festival".to_string(),
			latitude: 37.57,
			longitude: 126.98,
			similarity_score: 0.8,
			details: ResultDetails::Festival {
				start_date: "2025-11-01".to_string(),
				end_date: "2025-11-16".to_string(),
				image_url: String::new(),
				description: "Lanterns along the stream.".to_string(),
			},
		};
		let rendered = render(quick_prompt(&result, "tell me about the lantern festival"));

		assert!(rendered.contains("Seoul Lantern Festival"));
		assert!(rendered.contains("2025-11-01 ~ 2025-11-16"));
		assert!(rendered.contains("tell me about the lantern festival"));
	}

	#[test]
	fn long_description_is_truncated_before_insertion() {
		let long = "y".repeat(2000);
		let result = NormalizedResult {
			category: Category::Attraction,
			id: "A-1".to_string(),
			title: "Palace".to_string(),
			latitude: 0.0,
			longitude: 0.0,
			similarity_score: 0.6,
			details: ResultDetails::Attraction {
				address: String::new(),
				hours_of_operation: String::new(),
				phone: String::new(),
				transportation: String::new(),
				description: long,
			},
		};
		let rendered = render(quick_prompt(&result, "hours?"));

		assert!(!rendered.contains(&"y".repeat(MAX_SNIPPET_CHARS + 1)));
		assert!(rendered.contains(&"y".repeat(MAX_SNIPPET_CHARS)));
	}

	#[test]
	fn comparison_prompt_carries_raw_message() {
		let rendered = render(Prompt::Comparison {
			family: PromptFamily::General,
			message: "Gyeongbokgung vs Changdeokgung, which is better?",
		});

		assert!(rendered.contains("Gyeongbokgung vs Changdeokgung, which is better?"));
		assert!(rendered.contains("comparison"));
	}
}
