//! Provider-seam tests that need no database: validation failures must be
//! rejected before any provider call is issued.

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use folio_config::{ChatProviderConfig, Config, ConverterProviderConfig, EmbeddingProviderConfig};
use folio_providers::{
	chat::{ChatCompletion, ChatMessage},
	converter::ConvertedDocument,
};
use folio_service::{
	AskRequest, BoxFuture, ChatProvider, ConvertProvider, EmbeddingProvider, Error, FolioService,
	Providers, UploadRequest,
};
use folio_storage::db::Db;

const SAMPLE_CONFIG_TOML: &str =
	include_str!("../../folio-config/tests/fixtures/sample_config.template.toml");

struct SpyEmbedding {
	calls: Arc<AtomicUsize>,
}
impl EmbeddingProvider for SpyEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, folio_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let dim = (cfg.dimensions as usize).max(1);
		let count = texts.len();

		Box::pin(async move { Ok(vec![vec![0.0; dim]; count]) })
	}
}

struct SpyChat {
	calls: Arc<AtomicUsize>,
}
impl ChatProvider for SpyChat {
	fn complete<'a>(
		&'a self,
		_cfg: &'a ChatProviderConfig,
		_messages: &'a [ChatMessage],
	) -> BoxFuture<'a, folio_providers::Result<ChatCompletion>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Ok(ChatCompletion { answer: "stub".to_string(), raw: serde_json::json!({}) })
		})
	}
}

struct SpyConverter {
	calls: Arc<AtomicUsize>,
}
impl ConvertProvider for SpyConverter {
	fn convert<'a>(
		&'a self,
		_cfg: &'a ConverterProviderConfig,
		_content: &'a [u8],
		_declared_format: &'a str,
		_password: Option<&'a str>,
	) -> BoxFuture<'a, folio_providers::Result<ConvertedDocument>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			Ok(ConvertedDocument { text: "stub".to_string(), pages: Vec::new() })
		})
	}
}

struct Spies {
	embedding: Arc<AtomicUsize>,
	chat: Arc<AtomicUsize>,
	converter: Arc<AtomicUsize>,
}

fn test_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

fn service_with_spies() -> (FolioService, Spies) {
	let cfg = test_config();
	let pool = PgPoolOptions::new()
		.connect_lazy(&cfg.storage.postgres.dsn)
		.expect("Failed to create lazy pool.");
	let spies = Spies {
		embedding: Arc::new(AtomicUsize::new(0)),
		chat: Arc::new(AtomicUsize::new(0)),
		converter: Arc::new(AtomicUsize::new(0)),
	};
	let providers = Providers::new(
		Arc::new(SpyEmbedding { calls: spies.embedding.clone() }),
		Arc::new(SpyChat { calls: spies.chat.clone() }),
		Arc::new(SpyConverter { calls: spies.converter.clone() }),
	);
	let service = FolioService::with_providers(cfg, Db { pool }, providers);

	(service, spies)
}

#[tokio::test]
async fn empty_query_is_rejected_before_any_provider_call() {
	let (service, spies) = service_with_spies();
	let result = service
		.ask(AskRequest {
			tenant_id: "t1".to_string(),
			session_id: Uuid::new_v4(),
			query: "   ".to_string(),
			top_k: None,
			min_similarity: None,
		})
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));
	assert_eq!(spies.embedding.load(Ordering::SeqCst), 0);
	assert_eq!(spies.chat.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn out_of_range_overrides_are_rejected_before_any_provider_call() {
	let (service, spies) = service_with_spies();
	let result = service
		.ask(AskRequest {
			tenant_id: "t1".to_string(),
			session_id: Uuid::new_v4(),
			query: "What was Q1 revenue?".to_string(),
			top_k: Some(0),
			min_similarity: None,
		})
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));

	let result = service
		.ask(AskRequest {
			tenant_id: "t1".to_string(),
			session_id: Uuid::new_v4(),
			query: "What was Q1 revenue?".to_string(),
			top_k: None,
			min_similarity: Some(1.5),
		})
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));
	assert_eq!(spies.embedding.load(Ordering::SeqCst), 0);
	assert_eq!(spies.chat.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unsupported_upload_format_is_rejected_before_conversion() {
	let (service, spies) = service_with_spies();
	let result = service
		.upload(UploadRequest {
			tenant_id: "t1".to_string(),
			filename: "notes.txt".to_string(),
			declared_format: None,
			password: None,
			content: vec![1, 2, 3],
		})
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));
	assert_eq!(spies.converter.load(Ordering::SeqCst), 0);
	assert_eq!(spies.embedding.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_upload_is_rejected_before_conversion() {
	let (service, spies) = service_with_spies();
	let result = service
		.upload(UploadRequest {
			tenant_id: "t1".to_string(),
			filename: "report.pdf".to_string(),
			declared_format: None,
			password: None,
			content: Vec::new(),
		})
		.await;

	assert!(matches!(result, Err(Error::InvalidRequest { .. })));
	assert_eq!(spies.converter.load(Ordering::SeqCst), 0);
}
