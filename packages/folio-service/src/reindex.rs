use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, FolioService, Result};
use folio_domain::DocumentStatus;
use folio_storage::{chunks, documents};

#[derive(Clone, Debug, Deserialize)]
pub struct ReindexRequest {
	pub tenant_id: String,
	pub doc_id: Uuid,
}

#[derive(Clone, Debug, Serialize)]
pub struct ReindexResponse {
	pub doc_id: Uuid,
	pub chunk_count: u32,
	pub embedding_version: String,
	pub replaced_embeddings: u64,
}

impl FolioService {
	/// Re-embed every chunk of a document with the currently configured
	/// provider. Old vectors are dropped and new ones inserted in ONE
	/// transaction, so a concurrent search sees the document entirely under
	/// the old version or entirely under the new one, never a mix.
	pub async fn reindex(&self, req: ReindexRequest) -> Result<ReindexResponse> {
		if req.tenant_id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "tenant_id is required.".to_string() });
		}

		let doc = documents::get_document(&self.db.pool, req.tenant_id.as_str(), req.doc_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Document not found.".to_string() })?;

		if DocumentStatus::parse(&doc.status) != Some(DocumentStatus::Ready) {
			return Err(Error::InvalidRequest {
				message: format!("Document is {}; only ready documents can be reindexed.", doc.status),
			});
		}

		let chunk_rows = chunks::list_document_chunks(&self.db.pool, req.doc_id).await?;
		let texts: Vec<String> = chunk_rows.iter().map(|chunk| chunk.chunk_text.clone()).collect();
		let vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

		if vectors.len() != chunk_rows.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} chunks.",
					vectors.len(),
					chunk_rows.len()
				),
			});
		}
		for vec in &vectors {
			crate::validate_vector_dim(vec, self.cfg.providers.embedding.dimensions)?;
		}

		let embed_version = crate::embedding_version(&self.cfg);
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;
		let replaced = chunks::delete_document_embeddings(&mut *tx, req.doc_id).await?;

		for (chunk, vec) in chunk_rows.iter().zip(&vectors) {
			chunks::insert_chunk_embedding(
				&mut *tx,
				chunk.chunk_id,
				&embed_version,
				vec.len() as i32,
				&crate::vector_to_pg(vec),
			)
			.await?;
		}

		documents::set_document_embedding_version(&mut *tx, req.doc_id, &embed_version, now)
			.await?;

		tx.commit().await?;

		tracing::info!(
			doc_id = %req.doc_id,
			%embed_version,
			chunk_count = chunk_rows.len(),
			"Document reindexed."
		);

		Ok(ReindexResponse {
			doc_id: req.doc_id,
			chunk_count: chunk_rows.len() as u32,
			embedding_version: embed_version,
			replaced_embeddings: replaced,
		})
	}
}
