use std::sync::Arc;

use folio_service::FolioService;
use folio_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<FolioService>,
}
impl AppState {
	pub async fn new(config: folio_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		let service = FolioService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}
}
