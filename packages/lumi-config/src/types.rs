use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub search: Search,
	pub recommend: Recommend,
	pub generation: Generation,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
	/// Display name of the city the reference catalogs cover. Used by query
	/// expansion to widen short queries.
	pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
	pub qdrant: Qdrant,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub vector_dim: u32,
	pub timeout_ms: u64,
	pub collections: Collections,
}

/// One collection per content category.
#[derive(Debug, Deserialize)]
pub struct Collections {
	pub festival: String,
	pub attraction: String,
	pub restaurant: String,
	pub kcontent: String,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct LlmProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct Search {
	/// Weight of the vector-similarity term in the combined score.
	pub vector_weight: f32,
	/// Weight of the lexical-overlap term in the combined score.
	pub lexical_weight: f32,
	/// Per-call score floor passed to the vector index. Intentionally
	/// permissive; acceptance is decided on the combined score.
	pub search_floor: f32,
	/// Nearest-neighbor result limit per query variant.
	pub per_call_limit: u32,
	/// Combined-score acceptance threshold for festival/attraction/restaurant.
	pub accept_threshold: f32,
	/// Combined-score acceptance threshold for k-content, whose payloads are
	/// sparser and noisier.
	pub accept_threshold_kcontent: f32,
	/// Combined-score floor for the multi-match (drama "all locations") path.
	pub multi_match_floor: f32,
	/// Default truncation for multi-match enumeration.
	pub multi_match_limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct Recommend {
	pub default_count: u32,
	pub oversample: u32,
	pub max_scroll: u32,
	pub max_offset: u32,
}

#[derive(Debug, Deserialize)]
pub struct Generation {
	pub quick_max_tokens: u32,
	pub quick_temperature: f32,
	pub comparison_max_tokens: u32,
	pub advice_max_tokens: u32,
	pub direct_temperature: f32,
}
