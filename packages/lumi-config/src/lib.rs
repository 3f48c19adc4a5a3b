mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Collections, Config, EmbeddingProviderConfig, Generation, LlmProviderConfig, Postgres,
	Providers, Qdrant, Recommend, Search, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.city.trim().is_empty() {
		return Err(Error::Validation { message: "service.city must be non-empty.".to_string() });
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.qdrant.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "storage.qdrant.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}

	let collections = &cfg.storage.qdrant.collections;

	for (name, value) in [
		("festival", &collections.festival),
		("attraction", &collections.attraction),
		("restaurant", &collections.restaurant),
		("kcontent", &collections.kcontent),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("storage.qdrant.collections.{name} must be non-empty."),
			});
		}
	}

	let search = &cfg.search;

	if (search.vector_weight + search.lexical_weight - 1.0).abs() > 1e-6 {
		return Err(Error::Validation {
			message: "search.vector_weight and search.lexical_weight must sum to 1.".to_string(),
		});
	}
	if search.vector_weight < 0.0 || search.lexical_weight < 0.0 {
		return Err(Error::Validation {
			message: "search weights must be zero or greater.".to_string(),
		});
	}
	for (name, value) in [
		("search.search_floor", search.search_floor),
		("search.accept_threshold", search.accept_threshold),
		("search.accept_threshold_kcontent", search.accept_threshold_kcontent),
		("search.multi_match_floor", search.multi_match_floor),
	] {
		if !(0.0..=1.0).contains(&value) || !value.is_finite() {
			return Err(Error::Validation {
				message: format!("{name} must be within [0, 1]."),
			});
		}
	}
	if search.per_call_limit == 0 {
		return Err(Error::Validation {
			message: "search.per_call_limit must be greater than zero.".to_string(),
		});
	}
	if search.multi_match_limit == 0 {
		return Err(Error::Validation {
			message: "search.multi_match_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.recommend.default_count == 0 || cfg.recommend.oversample == 0 {
		return Err(Error::Validation {
			message: "recommend.default_count and recommend.oversample must be greater than zero."
				.to_string(),
		});
	}
	if cfg.recommend.max_scroll == 0 {
		return Err(Error::Validation {
			message: "recommend.max_scroll must be greater than zero.".to_string(),
		});
	}
	for (name, value) in [
		("generation.quick_temperature", cfg.generation.quick_temperature),
		("generation.direct_temperature", cfg.generation.direct_temperature),
	] {
		if !(0.0..=2.0).contains(&value) || !value.is_finite() {
			return Err(Error::Validation {
				message: format!("{name} must be within [0, 2]."),
			});
		}
	}
	if cfg.generation.quick_max_tokens == 0
		|| cfg.generation.comparison_max_tokens == 0
		|| cfg.generation.advice_max_tokens == 0
	{
		return Err(Error::Validation {
			message: "generation token limits must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	for value in [
		&mut cfg.service.http_bind,
		&mut cfg.service.city,
		&mut cfg.storage.qdrant.url,
		&mut cfg.storage.qdrant.collections.festival,
		&mut cfg.storage.qdrant.collections.attraction,
		&mut cfg.storage.qdrant.collections.restaurant,
		&mut cfg.storage.qdrant.collections.kcontent,
		&mut cfg.providers.embedding.api_base,
		&mut cfg.providers.llm.api_base,
	] {
		let trimmed = value.trim().to_string();

		*value = trimmed;
	}
}
