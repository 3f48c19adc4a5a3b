use std::{collections::HashMap, time::Duration};

use qdrant_client::qdrant::{
	CountPointsBuilder, PointId, ScrollPointsBuilder, SearchPointsBuilder, point_id::PointIdOptions,
	value::Kind,
};

use crate::Result;
use lumi_domain::Category;

/// One nearest-neighbor hit with its payload already converted to JSON so the
/// callers never touch protobuf value types.
#[derive(Clone, Debug)]
pub struct ScoredHit {
	pub id: String,
	pub score: f32,
	pub payload: serde_json::Value,
}

#[derive(Clone, Debug)]
pub struct ScrollHit {
	pub id: String,
	pub payload: serde_json::Value,
}

pub struct VectorStore {
	pub client: qdrant_client::Qdrant,
	pub vector_dim: u32,
	festival: String,
	attraction: String,
	restaurant: String,
	kcontent: String,
}
impl VectorStore {
	pub fn new(cfg: &lumi_config::Qdrant) -> Result<Self> {
		let client = qdrant_client::Qdrant::from_url(&cfg.url)
			.timeout(Duration::from_millis(cfg.timeout_ms))
			.build()?;

		Ok(Self {
			client,
			vector_dim: cfg.vector_dim,
			festival: cfg.collections.festival.clone(),
			attraction: cfg.collections.attraction.clone(),
			restaurant: cfg.collections.restaurant.clone(),
			kcontent: cfg.collections.kcontent.clone(),
		})
	}

	pub fn collection_for(&self, category: Category) -> &str {
		match category {
			Category::Festival => &self.festival,
			Category::Attraction => &self.attraction,
			Category::Restaurant => &self.restaurant,
			Category::Kcontent => &self.kcontent,
		}
	}

	/// Nearest-neighbor search against one category's collection. `floor` is
	/// the raw vector-score threshold applied inside the index.
	pub async fn search_points(
		&self,
		category: Category,
		vector: Vec<f32>,
		limit: u64,
		floor: f32,
	) -> Result<Vec<ScoredHit>> {
		let collection = self.collection_for(category).to_owned();
		let search = SearchPointsBuilder::new(collection, vector, limit)
			.score_threshold(floor)
			.with_payload(true);
		let response = self.client.search_points(search).await?;
		let hits = response
			.result
			.into_iter()
			.map(|point| ScoredHit {
				id: point_id_string(point.id),
				score: point.score,
				payload: payload_to_json(point.payload),
			})
			.collect();

		Ok(hits)
	}

	/// Reads up to `limit` points starting at the numeric point id `offset`,
	/// without any similarity ranking.
	pub async fn scroll_points(
		&self,
		category: Category,
		limit: u32,
		offset: Option<u64>,
	) -> Result<Vec<ScrollHit>> {
		let collection = self.collection_for(category).to_owned();
		let mut scroll = ScrollPointsBuilder::new(collection).limit(limit).with_payload(true);

		if let Some(offset) = offset {
			scroll = scroll.offset(PointId::from(offset));
		}

		let response = self.client.scroll(scroll).await?;
		let hits = response
			.result
			.into_iter()
			.map(|point| ScrollHit {
				id: point_id_string(point.id),
				payload: payload_to_json(point.payload),
			})
			.collect();

		Ok(hits)
	}

	pub async fn count_points(&self, category: Category) -> Result<u64> {
		let collection = self.collection_for(category).to_owned();
		let response = self.client.count(CountPointsBuilder::new(collection).exact(false)).await?;

		Ok(response.result.map(|result| result.count).unwrap_or(0))
	}
}

fn point_id_string(id: Option<PointId>) -> String {
	match id.and_then(|id| id.point_id_options) {
		Some(PointIdOptions::Num(num)) => num.to_string(),
		Some(PointIdOptions::Uuid(uuid)) => uuid,
		None => String::new(),
	}
}

fn payload_to_json(payload: HashMap<String, qdrant_client::qdrant::Value>) -> serde_json::Value {
	serde_json::Value::Object(
		payload.into_iter().map(|(key, value)| (key, value_to_json(value))).collect(),
	)
}

fn value_to_json(value: qdrant_client::qdrant::Value) -> serde_json::Value {
	match value.kind {
		None | Some(Kind::NullValue(_)) => serde_json::Value::Null,
		Some(Kind::BoolValue(value)) => serde_json::Value::Bool(value),
		Some(Kind::IntegerValue(value)) => serde_json::Value::from(value),
		Some(Kind::DoubleValue(value)) => serde_json::Number::from_f64(value)
			.map(serde_json::Value::Number)
			.unwrap_or(serde_json::Value::Null),
		Some(Kind::StringValue(value)) => serde_json::Value::String(value),
		Some(Kind::ListValue(values)) =>
			serde_json::Value::Array(values.values.into_iter().map(value_to_json).collect()),
		Some(Kind::StructValue(fields)) => serde_json::Value::Object(
			fields.fields.into_iter().map(|(key, value)| (key, value_to_json(value))).collect(),
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn string_value(text: &str) -> qdrant_client::qdrant::Value {
		qdrant_client::qdrant::Value { kind: Some(Kind::StringValue(text.to_owned())) }
	}

	#[test]
	fn payload_conversion_preserves_scalars() {
		let mut payload = HashMap::new();

		payload.insert("title".to_owned(), string_value("Gwangalli Drone Show"));
		payload.insert(
			"lat".to_owned(),
			qdrant_client::qdrant::Value { kind: Some(Kind::DoubleValue(35.153)) },
		);
		payload.insert(
			"visitors".to_owned(),
			qdrant_client::qdrant::Value { kind: Some(Kind::IntegerValue(120_000)) },
		);

		let json = payload_to_json(payload);

		assert_eq!(json["title"], "Gwangalli Drone Show");
		assert_eq!(json["lat"], 35.153);
		assert_eq!(json["visitors"], 120_000);
	}

	#[test]
	fn non_finite_double_becomes_null() {
		let value = qdrant_client::qdrant::Value { kind: Some(Kind::DoubleValue(f64::NAN)) };

		assert_eq!(value_to_json(value), serde_json::Value::Null);
	}

	#[test]
	fn nested_structs_and_lists_convert() {
		let inner = qdrant_client::qdrant::Value {
			kind: Some(Kind::ListValue(qdrant_client::qdrant::ListValue {
				values: vec![string_value("drama"), string_value("movie")],
			})),
		};
		let mut fields = HashMap::new();

		fields.insert("kinds".to_owned(), inner);

		let value = qdrant_client::qdrant::Value {
			kind: Some(Kind::StructValue(qdrant_client::qdrant::Struct { fields })),
		};

		assert_eq!(value_to_json(value), serde_json::json!({ "kinds": ["drama", "movie"] }));
	}

	#[test]
	fn missing_point_id_maps_to_empty_string() {
		assert_eq!(point_id_string(None), "");
		assert_eq!(point_id_string(Some(PointId::from(7))), "7");
	}
}
