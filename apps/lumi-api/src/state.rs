use std::sync::Arc;

use lumi_service::ChatService;
use lumi_storage::{db::Db, qdrant::VectorStore};

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<ChatService>,
}
impl AppState {
	pub async fn new(config: lumi_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema().await?;

		let vectors = VectorStore::new(&config.storage.qdrant)?;
		let service = ChatService::new(config, db, vectors);

		Ok(Self { service: Arc::new(service) })
	}
}
