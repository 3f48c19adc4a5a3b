pub mod embedding;
pub mod llm;

pub use llm::{GenerationOptions, TextStream};

/// Shared HTTP transport for the embedding and LLM providers. Built once at
/// startup; every provider call reuses its connection pool and TLS state, with
/// per-request timeouts taken from the provider config.
pub struct HttpProviders {
	client: reqwest::Client,
}
impl HttpProviders {
	pub fn new() -> Self {
		Self { client: reqwest::Client::new() }
	}

	pub async fn embed(
		&self,
		cfg: &lumi_config::EmbeddingProviderConfig,
		texts: &[String],
	) -> color_eyre::Result<Vec<Vec<f32>>> {
		embedding::embed(&self.client, cfg, texts).await
	}

	pub async fn complete(
		&self,
		cfg: &lumi_config::LlmProviderConfig,
		messages: &[serde_json::Value],
		options: GenerationOptions,
	) -> color_eyre::Result<String> {
		llm::complete(&self.client, cfg, messages, options).await
	}

	pub async fn stream(
		&self,
		cfg: &lumi_config::LlmProviderConfig,
		messages: &[serde_json::Value],
		options: GenerationOptions,
	) -> color_eyre::Result<TextStream> {
		llm::stream(&self.client, cfg, messages, options).await
	}
}
impl Default for HttpProviders {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn transport_builds_without_provider_config() {
		// The transport must be constructible at startup, before any provider
		// call and without network access.
		let _ = HttpProviders::new();
		let _ = HttpProviders::default();
	}
}
