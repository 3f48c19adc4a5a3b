use serde_json::Value;

use crate::search::CandidateMatch;
use lumi_domain::Category;

const MARKER_SNIPPET_CHARS: usize = 100;

/// Category-agnostic result shape returned to callers and embedded in response
/// payloads. Constructed once per surviving candidate; never mutated.
#[derive(Clone, Debug, serde::Serialize)]
pub struct NormalizedResult {
	pub category: Category,
	pub id: String,
	pub title: String,
	pub latitude: f64,
	pub longitude: f64,
	pub similarity_score: f32,
	#[serde(flatten)]
	pub details: ResultDetails,
}

/// Per-category field sets. A tagged variant instead of a loose key/value map
/// so a missing field is a compile error, not a runtime formatting surprise.
#[derive(Clone, Debug, serde::Serialize)]
#[serde(untagged)]
pub enum ResultDetails {
	Festival {
		start_date: String,
		end_date: String,
		image_url: String,
		description: String,
	},
	Attraction {
		address: String,
		hours_of_operation: String,
		phone: String,
		transportation: String,
		description: String,
	},
	Restaurant {
		place: String,
		subway: String,
		description: String,
	},
	Kcontent {
		drama_name: String,
		location_name: String,
		address: String,
		trip_tip: String,
		keyword: String,
		thumbnail: String,
	},
}

/// Map-marker projection of a result with known coordinates.
#[derive(Clone, Debug, serde::Serialize)]
pub struct MapMarker {
	pub id: String,
	pub title: String,
	pub latitude: f64,
	pub longitude: f64,
	pub category: Category,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub description: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub start_date: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub end_date: String,
	#[serde(skip_serializing_if = "String::is_empty")]
	pub thumbnail: String,
}

/// Maps a raw index payload into the category's normalized shape. Optional
/// fields default to empty strings and absent coordinates to zero, so
/// serialization never meets a null sentinel.
pub fn format(candidate: &CandidateMatch) -> NormalizedResult {
	let metadata = candidate.payload.get("metadata").unwrap_or(&candidate.payload);
	let text = |key: &str| field_text(metadata, key);
	let details = match candidate.category {
		Category::Festival => ResultDetails::Festival {
			start_date: text("start_date"),
			end_date: text("end_date"),
			image_url: text("image_url"),
			description: text("description"),
		},
		Category::Attraction => ResultDetails::Attraction {
			address: text("address"),
			hours_of_operation: text("hours_of_operation"),
			phone: text("phone"),
			transportation: text("transportation"),
			description: text("description"),
		},
		Category::Restaurant => ResultDetails::Restaurant {
			place: text("place"),
			subway: text("subway"),
			description: field_text(&candidate.payload, "page_content"),
		},
		Category::Kcontent => ResultDetails::Kcontent {
			drama_name: text("drama_name"),
			location_name: text("location_name"),
			address: text("address"),
			trip_tip: text("trip_tip"),
			keyword: text("keyword"),
			thumbnail: text("thumbnail"),
		},
	};

	NormalizedResult {
		category: candidate.category,
		id: stable_id(candidate.category, metadata, &candidate.id),
		title: crate::search::payload_title(candidate.category, &candidate.payload),
		latitude: field_number(metadata, "latitude"),
		longitude: field_number(metadata, "longitude"),
		similarity_score: candidate.combined_score,
		details,
	}
}

/// Projects map markers from formatted results. A zero or absent coordinate
/// means "unknown location", never "0,0", so those items are excluded.
pub fn project_markers(results: &[NormalizedResult]) -> Vec<MapMarker> {
	results
		.iter()
		.filter(|result| has_coordinates(result))
		.map(|result| {
			let (description, start_date, end_date, thumbnail) = match &result.details {
				ResultDetails::Festival { start_date, end_date, description, .. } => (
					truncate_chars(description, MARKER_SNIPPET_CHARS),
					start_date.clone(),
					end_date.clone(),
					String::new(),
				),
				ResultDetails::Attraction { description, .. } =>
					(truncate_chars(description, MARKER_SNIPPET_CHARS), String::new(), String::new(), String::new()),
				ResultDetails::Restaurant { description, .. } =>
					(truncate_chars(description, MARKER_SNIPPET_CHARS), String::new(), String::new(), String::new()),
				ResultDetails::Kcontent { trip_tip, thumbnail, .. } => (
					truncate_chars(trip_tip, MARKER_SNIPPET_CHARS),
					String::new(),
					String::new(),
					thumbnail.clone(),
				),
			};

			MapMarker {
				id: result.id.clone(),
				title: result.title.clone(),
				latitude: result.latitude,
				longitude: result.longitude,
				category: result.category,
				description,
				start_date,
				end_date,
				thumbnail,
			}
		})
		.collect()
}

fn has_coordinates(result: &NormalizedResult) -> bool {
	result.latitude != 0.0
		&& result.longitude != 0.0
		&& result.latitude.is_finite()
		&& result.longitude.is_finite()
}

/// Char-boundary-safe truncation.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
	text.chars().take(max_chars).collect()
}

fn field_text(metadata: &Value, key: &str) -> String {
	match metadata.get(key) {
		Some(Value::String(text)) => text.clone(),
		Some(Value::Number(number)) => number.to_string(),
		_ => String::new(),
	}
}

/// Coordinates arrive as numbers or numeric strings depending on the ingest
/// path. Anything else reads as zero, the payload's absence sentinel.
fn field_number(metadata: &Value, key: &str) -> f64 {
	match metadata.get(key) {
		Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
		Some(Value::String(text)) => text.trim().parse().unwrap_or(0.0),
		_ => 0.0,
	}
}

/// Each catalog carries its own id column; fall back to the point id when the
/// payload lacks one.
fn stable_id(category: Category, metadata: &Value, point_id: &str) -> String {
	let key = match category {
		Category::Festival => "festival_id",
		Category::Attraction => "attr_id",
		Category::Restaurant => "restaurant_id",
		Category::Kcontent => "content_id",
	};
	let id = field_text(metadata, key);

	if id.is_empty() { point_id.to_string() } else { id }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(category: Category, payload: Value) -> CandidateMatch {
		CandidateMatch {
			category,
			id: "42".to_string(),
			payload,
			vector_score: 0.7,
			lexical_score: 0.5,
			combined_score: 0.66,
		}
	}

	fn attraction(latitude: f64, longitude: f64) -> NormalizedResult {
		format(&candidate(
			Category::Attraction,
			serde_json::json!({
				"metadata": {
					"attr_id": "A-7",
					"title": "Namsan Seoul Tower",
					"address": "105 Namsangongwon-gil",
					"latitude": latitude,
					"longitude": longitude,
				}
			}),
		))
	}

	#[test]
	fn festival_payload_maps_with_empty_defaults() {
		let result = format(&candidate(
			Category::Festival,
			serde_json::json!({
				"metadata": {
					"festival_id": 315,
					"title": "Seoul Lantern Festival",
					"start_date": "2025-11-01",
				}
			}),
		));

		assert_eq!(result.id, "315");
		assert_eq!(result.title, "Seoul Lantern Festival");
		assert_eq!(result.latitude, 0.0);

		let ResultDetails::Festival { start_date, end_date, .. } = result.details else {
			panic!("expected festival details");
		};

		assert_eq!(start_date, "2025-11-01");
		assert_eq!(end_date, "");
	}

	#[test]
	fn restaurant_description_comes_from_page_content() {
		let result = format(&candidate(
			Category::Restaurant,
			serde_json::json!({
				"metadata": { "restaurant_id": "R-3", "name": "Myeongdong Kyoja", "place": "Myeongdong" },
				"page_content": "Handmade noodle soup since 1966.",
			}),
		));

		let ResultDetails::Restaurant { description, .. } = result.details else {
			panic!("expected restaurant details");
		};

		assert_eq!(description, "Handmade noodle soup since 1966.");
	}

	#[test]
	fn string_coordinates_parse() {
		let result = format(&candidate(
			Category::Kcontent,
			serde_json::json!({
				"metadata": {
					"content_id": "K-1",
					"drama_name": "Goblin",
					"location_name": "Deoksugung Stonewall",
					"latitude": "37.5658",
					"longitude": "126.9752",
				}
			}),
		));

		assert!((result.latitude - 37.5658).abs() < 1e-9);
	}

	#[test]
	fn missing_catalog_id_falls_back_to_point_id() {
		let result = format(&candidate(
			Category::Attraction,
			serde_json::json!({ "metadata": { "title": "Secret Garden" } }),
		));

		assert_eq!(result.id, "42");
	}

	#[test]
	fn markers_exclude_zero_or_absent_coordinates() {
		let results = vec![
			attraction(37.5512, 126.9882),
			attraction(0.0, 126.9882),
			attraction(37.5512, 0.0),
			attraction(0.0, 0.0),
		];
		let markers = project_markers(&results);

		assert_eq!(markers.len(), 1);
		assert_eq!(markers[0].title, "Namsan Seoul Tower");
	}

	#[test]
	fn markers_include_each_located_result_once() {
		let results = vec![attraction(37.1, 127.1), attraction(37.2, 127.2)];

		assert_eq!(project_markers(&results).len(), 2);
	}

	#[test]
	fn marker_snippet_is_truncated() {
		let long = "x".repeat(500);
		let result = format(&candidate(
			Category::Attraction,
			serde_json::json!({
				"metadata": {
					"attr_id": "A-9",
					"title": "Palace",
					"description": long,
					"latitude": 37.0,
					"longitude": 127.0,
				}
			}),
		));
		let markers = project_markers(&[result]);

		assert_eq!(markers[0].description.chars().count(), MARKER_SNIPPET_CHARS);
	}
}
