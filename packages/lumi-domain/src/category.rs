/// Content categories, each backed by its own vector-index collection and
/// reference catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
	Festival,
	Attraction,
	Restaurant,
	Kcontent,
}
impl Category {
	/// Fixed tie-break order for fan-out winners. Equal combined scores must
	/// resolve the same way on every run, so ties never fall back to task
	/// completion order.
	pub const TIE_BREAK: [Self; 4] = [Self::Festival, Self::Attraction, Self::Restaurant, Self::Kcontent];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Festival => "festival",
			Self::Attraction => "attraction",
			Self::Restaurant => "restaurant",
			Self::Kcontent => "kcontent",
		}
	}

	/// Position in the tie-break order. Lower wins on equal combined scores.
	pub fn priority(self) -> usize {
		Self::TIE_BREAK.iter().position(|category| *category == self).unwrap_or(Self::TIE_BREAK.len())
	}
}

/// Which chat surface invoked the engine. Controls the category set searched
/// by the fan-out and the prompt family used for generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryMode {
	/// Festival + attraction + restaurant fan-out.
	Travel,
	/// K-drama filming locations only.
	Kcontent,
}
impl CategoryMode {
	pub fn categories(self) -> &'static [Category] {
		match self {
			Self::Travel => &[Category::Festival, Category::Attraction, Category::Restaurant],
			Self::Kcontent => &[Category::Kcontent],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn tie_break_prefers_festival_over_kcontent() {
		assert!(Category::Festival.priority() < Category::Kcontent.priority());
	}

	#[test]
	fn serializes_snake_case() {
		let json = serde_json::to_string(&Category::Kcontent).expect("serialize failed");

		assert_eq!(json, "\"kcontent\"");
	}
}
