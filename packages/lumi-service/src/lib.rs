pub mod compose;
pub mod format;
pub mod history;
pub mod prompt;
pub mod recommend;
pub mod search;
pub mod stream;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use compose::{ChatRequest, ChatResponse};
pub use format::{MapMarker, NormalizedResult, ResultDetails};
pub use history::HistoryItem;
pub use search::CandidateMatch;
pub use stream::ChatEvent;

use lumi_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use lumi_providers::{GenerationOptions, HttpProviders, TextStream};
use lumi_storage::{db::Db, qdrant::VectorStore};

pub type ServiceResult<T> = Result<T, ServiceError>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		options: GenerationOptions,
	) -> BoxFuture<'a, color_eyre::Result<String>>;

	fn stream<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		options: GenerationOptions,
	) -> BoxFuture<'a, color_eyre::Result<TextStream>>;
}

#[derive(Debug)]
pub enum ServiceError {
	InvalidRequest { message: String },
	Provider { message: String },
	Storage { message: String },
	Qdrant { message: String },
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
}

pub struct ChatService {
	pub cfg: Config,
	pub db: Db,
	pub vectors: VectorStore,
	pub providers: Providers,
}

/// Production providers over one shared HTTP transport. The transport is built
/// once with the service and reused by every embed and completion call.
struct DefaultProviders {
	http: HttpProviders,
}

impl std::fmt::Display for ServiceError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::InvalidRequest { message } => write!(f, "Invalid request: {message}"),
			Self::Provider { message } => write!(f, "Provider error: {message}"),
			Self::Storage { message } => write!(f, "Storage error: {message}"),
			Self::Qdrant { message } => write!(f, "Qdrant error: {message}"),
		}
	}
}

impl std::error::Error for ServiceError {}

impl From<sqlx::Error> for ServiceError {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<color_eyre::Report> for ServiceError {
	fn from(err: color_eyre::Report) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<lumi_storage::Error> for ServiceError {
	fn from(err: lumi_storage::Error) -> Self {
		match err {
			lumi_storage::Error::Sqlx(err) => Self::Storage { message: err.to_string() },
			lumi_storage::Error::Qdrant(err) => Self::Qdrant { message: err.to_string() },
			lumi_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(self.http.embed(cfg, texts))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		options: GenerationOptions,
	) -> BoxFuture<'a, color_eyre::Result<String>> {
		Box::pin(self.http.complete(cfg, messages, options))
	}

	fn stream<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		messages: &'a [Value],
		options: GenerationOptions,
	) -> BoxFuture<'a, color_eyre::Result<TextStream>> {
		Box::pin(self.http.stream(cfg, messages, options))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, chat: Arc<dyn ChatProvider>) -> Self {
		Self { embedding, chat }
	}
}

impl Default for Providers {
	fn default() -> Self {
		// One transport for both provider roles, shared for the process
		// lifetime.
		let provider = Arc::new(DefaultProviders { http: HttpProviders::new() });

		Self { embedding: provider.clone(), chat: provider }
	}
}


impl ChatService {
	pub fn new(cfg: Config, db: Db, vectors: VectorStore) -> Self {
		Self { cfg, db, vectors, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, vectors: VectorStore, providers: Providers) -> Self {
		Self { cfg, db, vectors, providers }
	}
}
