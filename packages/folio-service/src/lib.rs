pub mod admin;
pub mod ask;
pub mod compose;
pub mod documents;
pub mod rank;
pub mod reindex;
pub mod time_serde;
pub mod upload;

mod error;

pub use error::{Error, Result};

use std::{future::Future, pin::Pin, sync::Arc};

pub use admin::PurgeReport;
pub use ask::{AskRequest, AskResponse, Citation};
pub use documents::{DocumentDetail, DocumentListResponse, SessionTurn};
pub use reindex::{ReindexRequest, ReindexResponse};
pub use upload::{UploadRequest, UploadResponse};

use folio_config::{
	ChatProviderConfig, Config, ConverterProviderConfig, EmbeddingProviderConfig,
};
use folio_providers::{
	chat::{self, ChatCompletion, ChatMessage},
	converter::{self, ConvertedDocument},
	embedding,
};
use folio_storage::db::Db;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, folio_providers::Result<Vec<Vec<f32>>>>;
}

pub trait ChatProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, folio_providers::Result<ChatCompletion>>;
}

pub trait ConvertProvider
where
	Self: Send + Sync,
{
	fn convert<'a>(
		&'a self,
		cfg: &'a ConverterProviderConfig,
		content: &'a [u8],
		declared_format: &'a str,
		password: Option<&'a str>,
	) -> BoxFuture<'a, folio_providers::Result<ConvertedDocument>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub chat: Arc<dyn ChatProvider>,
	pub converter: Arc<dyn ConvertProvider>,
}

pub struct FolioService {
	pub cfg: Config,
	pub db: Db,
	pub providers: Providers,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, folio_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ChatProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a ChatProviderConfig,
		messages: &'a [ChatMessage],
	) -> BoxFuture<'a, folio_providers::Result<ChatCompletion>> {
		Box::pin(chat::complete(cfg, messages))
	}
}

impl ConvertProvider for DefaultProviders {
	fn convert<'a>(
		&'a self,
		cfg: &'a ConverterProviderConfig,
		content: &'a [u8],
		declared_format: &'a str,
		password: Option<&'a str>,
	) -> BoxFuture<'a, folio_providers::Result<ConvertedDocument>> {
		Box::pin(converter::convert(cfg, content, declared_format, password))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		chat: Arc<dyn ChatProvider>,
		converter: Arc<dyn ConvertProvider>,
	) -> Self {
		Self { embedding, chat, converter }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), chat: provider.clone(), converter: provider }
	}
}

impl FolioService {
	pub fn new(cfg: Config, db: Db) -> Self {
		Self { cfg, db, providers: Providers::default() }
	}

	pub fn with_providers(cfg: Config, db: Db, providers: Providers) -> Self {
		Self { cfg, db, providers }
	}
}

/// Tag recorded next to every stored vector, so vectors from different
/// providers or models are never compared against each other.
pub(crate) fn embedding_version(cfg: &Config) -> String {
	format!(
		"{}:{}:{}",
		cfg.providers.embedding.provider_id,
		cfg.providers.embedding.model,
		cfg.providers.embedding.dimensions
	)
}

pub(crate) fn vector_to_pg(vec: &[f32]) -> String {
	let mut out = String::with_capacity(vec.len() * 8);

	out.push('[');

	for (i, value) in vec.iter().enumerate() {
		if i > 0 {
			out.push(',');
		}

		out.push_str(&value.to_string());
	}

	out.push(']');

	out
}

pub(crate) fn validate_vector_dim(vec: &[f32], expected_dim: u32) -> Result<()> {
	if vec.len() != expected_dim as usize {
		return Err(Error::Provider {
			message: format!(
				"Embedding dimension {} does not match configured dimensions {}.",
				vec.len(),
				expected_dim
			),
		});
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pg_vector_text_is_bracketed_and_comma_separated() {
		assert_eq!(vector_to_pg(&[0.5, -1.0, 2.25]), "[0.5,-1,2.25]");
		assert_eq!(vector_to_pg(&[]), "[]");
	}

	#[test]
	fn vector_dim_mismatch_is_a_provider_error() {
		assert!(validate_vector_dim(&[0.0; 8], 8).is_ok());
		assert!(matches!(
			validate_vector_dim(&[0.0; 7], 8),
			Err(Error::Provider { .. })
		));
	}
}
