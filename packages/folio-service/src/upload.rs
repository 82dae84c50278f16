use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, FolioService, Result};
use folio_chunking::{Chunk, ChunkingConfig, PageBoundary};
use folio_domain::{DeclaredFormat, DocumentStatus};
use folio_storage::{
	chunks, documents,
	models::{Document, DocumentChunk},
};

#[derive(Clone, Debug, Deserialize)]
pub struct UploadRequest {
	pub tenant_id: String,
	pub filename: String,
	/// Explicit format override; inferred from the filename extension when
	/// absent.
	pub declared_format: Option<String>,
	pub password: Option<String>,
	pub content: Vec<u8>,
}

#[derive(Clone, Debug, Serialize)]
pub struct UploadResponse {
	pub doc_id: Uuid,
	pub status: String,
	pub chunk_count: u32,
	pub embedding_version: String,
}

struct ProcessedDocument {
	chunks: Vec<Chunk>,
	vectors: Vec<Vec<f32>>,
}

impl FolioService {
	/// Ingest pipeline: convert -> chunk -> embed -> store, all
	/// request-scoped. The document row is created first so every failure
	/// leaves an audited `failed` status behind, and the chunk/embedding
	/// writes share one transaction with the `ready` flip.
	pub async fn upload(&self, req: UploadRequest) -> Result<UploadResponse> {
		let format = validate_upload(&req, self.cfg.service.max_upload_bytes)?;
		let now = OffsetDateTime::now_utc();
		let doc_id = Uuid::new_v4();
		let content_hash = blake3::hash(&req.content);
		let doc_row = Document {
			doc_id,
			tenant_id: req.tenant_id.clone(),
			filename: req.filename.clone(),
			declared_format: format.as_str().to_string(),
			content_bytes: req.content.len() as i64,
			content_hash: content_hash.to_hex().to_string(),
			status: DocumentStatus::Pending.as_str().to_string(),
			failure_reason: None,
			chunk_count: 0,
			embedding_version: None,
			uploaded_at: now,
			updated_at: now,
		};

		documents::insert_document(&self.db.pool, &doc_row).await?;
		documents::set_document_status(
			&self.db.pool,
			doc_id,
			DocumentStatus::Processing.as_str(),
			None,
			OffsetDateTime::now_utc(),
		)
		.await?;

		let processed = match self.process_document(&req, format).await {
			Ok(processed) => processed,
			Err(err) => {
				self.mark_upload_failed(doc_id, &err).await;

				return Err(err);
			},
		};
		let embed_version = crate::embedding_version(&self.cfg);
		let stored = self.store_processed(doc_id, &processed, &embed_version).await;

		if let Err(err) = stored {
			self.mark_upload_failed(doc_id, &err).await;

			return Err(err);
		}

		tracing::info!(
			%doc_id,
			chunk_count = processed.chunks.len(),
			filename = %req.filename,
			"Document ingested."
		);

		Ok(UploadResponse {
			doc_id,
			status: DocumentStatus::Ready.as_str().to_string(),
			chunk_count: processed.chunks.len() as u32,
			embedding_version: embed_version,
		})
	}

	async fn process_document(
		&self,
		req: &UploadRequest,
		format: DeclaredFormat,
	) -> Result<ProcessedDocument> {
		let converted = self
			.providers
			.converter
			.convert(
				&self.cfg.providers.converter,
				&req.content,
				format.as_str(),
				req.password.as_deref(),
			)
			.await?;

		if converted.text.trim().is_empty() {
			return Err(Error::InvalidRequest {
				message: "Document contained no extractable text.".to_string(),
			});
		}

		let pages: Vec<PageBoundary> = converted
			.pages
			.iter()
			.map(|page| PageBoundary { label: page.label.clone(), start_offset: page.start_offset })
			.collect();
		let chunking = ChunkingConfig {
			window_chars: self.cfg.chunking.window_chars,
			overlap_chars: self.cfg.chunking.overlap_chars,
		};
		let chunks: Vec<Chunk> = folio_chunking::split_text(&converted.text, &chunking, &pages)?
			.collect();
		let texts: Vec<String> = chunks.iter().map(|chunk| chunk.text.clone()).collect();
		let vectors =
			self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await?;

		if vectors.len() != chunks.len() {
			return Err(Error::Provider {
				message: format!(
					"Embedding provider returned {} vectors for {} chunks.",
					vectors.len(),
					chunks.len()
				),
			});
		}
		for vec in &vectors {
			crate::validate_vector_dim(vec, self.cfg.providers.embedding.dimensions)?;
		}

		Ok(ProcessedDocument { chunks, vectors })
	}

	async fn store_processed(
		&self,
		doc_id: Uuid,
		processed: &ProcessedDocument,
		embed_version: &str,
	) -> Result<()> {
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;

		for (chunk, vec) in processed.chunks.iter().zip(&processed.vectors) {
			let chunk_row = DocumentChunk {
				chunk_id: chunk_id_for(doc_id, chunk.chunk_index),
				doc_id,
				chunk_index: chunk.chunk_index,
				start_offset: to_i32(chunk.start_offset)?,
				end_offset: to_i32(chunk.end_offset)?,
				chunk_text: chunk.text.clone(),
				page_label: chunk.page_label.clone(),
				created_at: now,
			};

			chunks::insert_chunk(&mut *tx, &chunk_row).await?;
			chunks::insert_chunk_embedding(
				&mut *tx,
				chunk_row.chunk_id,
				embed_version,
				vec.len() as i32,
				&crate::vector_to_pg(vec),
			)
			.await?;
		}

		documents::set_document_ready(
			&mut *tx,
			doc_id,
			processed.chunks.len() as i32,
			embed_version,
			now,
		)
		.await?;

		tx.commit().await?;

		Ok(())
	}

	/// Record the failure before surfacing it, so the audit trail survives
	/// even when the caller only sees an error message.
	async fn mark_upload_failed(&self, doc_id: Uuid, err: &Error) {
		let result = documents::set_document_status(
			&self.db.pool,
			doc_id,
			DocumentStatus::Failed.as_str(),
			Some(err.audit_code()),
			OffsetDateTime::now_utc(),
		)
		.await;

		if let Err(status_err) = result {
			tracing::error!(%doc_id, error = %status_err, "Failed to record document failure.");
		}
	}
}

fn validate_upload(req: &UploadRequest, max_upload_bytes: u64) -> Result<DeclaredFormat> {
	if req.tenant_id.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "tenant_id is required.".to_string() });
	}
	if req.filename.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "filename is required.".to_string() });
	}
	if req.content.is_empty() {
		return Err(Error::InvalidRequest { message: "Uploaded file is empty.".to_string() });
	}
	if req.content.len() as u64 > max_upload_bytes {
		return Err(Error::InvalidRequest {
			message: format!("Uploaded file exceeds the {max_upload_bytes} byte limit."),
		});
	}

	let format = match req.declared_format.as_deref() {
		Some(raw) => DeclaredFormat::parse(raw),
		None => DeclaredFormat::from_filename(&req.filename),
	};

	format.ok_or_else(|| Error::InvalidRequest {
		message: "Unsupported format; accepted formats are pdf, xlsx, csv, and docx.".to_string(),
	})
}

/// Deterministic chunk id, stable across re-uploads of the same document id.
fn chunk_id_for(doc_id: Uuid, chunk_index: i32) -> Uuid {
	let name = format!("{doc_id}:{chunk_index}");

	Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes())
}

fn to_i32(value: usize) -> Result<i32> {
	i32::try_from(value).map_err(|_| Error::InvalidRequest {
		message: format!("Chunk offset {value} exceeds the supported range."),
	})
}
