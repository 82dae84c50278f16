use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, FolioService, Result};
use folio_storage::{conversation, documents, models::ConversationTurn};

#[derive(Clone, Debug, Serialize)]
pub struct DocumentDetail {
	pub doc_id: Uuid,
	pub filename: String,
	pub declared_format: String,
	pub content_bytes: i64,
	pub status: String,
	pub failure_reason: Option<String>,
	pub chunk_count: i32,
	pub embedding_version: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub uploaded_at: OffsetDateTime,
	#[serde(with = "crate::time_serde")]
	pub updated_at: OffsetDateTime,
}

#[derive(Clone, Debug, Serialize)]
pub struct DocumentListResponse {
	pub documents: Vec<DocumentDetail>,
	pub total: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionTurn {
	pub turn_index: i32,
	pub role: String,
	pub content: String,
	pub provider_id: Option<String>,
	#[serde(with = "crate::time_serde")]
	pub created_at: OffsetDateTime,
}

impl FolioService {
	pub async fn list_documents(&self, tenant_id: &str) -> Result<DocumentListResponse> {
		require_tenant(tenant_id)?;

		let rows = documents::list_documents(&self.db.pool, tenant_id).await?;
		let documents: Vec<DocumentDetail> = rows.into_iter().map(detail_from_row).collect();
		let total = documents.len();

		Ok(DocumentListResponse { documents, total })
	}

	pub async fn get_document(&self, tenant_id: &str, doc_id: Uuid) -> Result<DocumentDetail> {
		require_tenant(tenant_id)?;

		let row = documents::get_document(&self.db.pool, tenant_id, doc_id)
			.await?
			.ok_or_else(|| Error::NotFound { message: "Document not found.".to_string() })?;

		Ok(detail_from_row(row))
	}

	/// Explicit user deletion; chunks and embeddings cascade with the row.
	pub async fn delete_document(&self, tenant_id: &str, doc_id: Uuid) -> Result<()> {
		require_tenant(tenant_id)?;

		let deleted = documents::delete_document(&self.db.pool, tenant_id, doc_id).await?;

		if deleted == 0 {
			return Err(Error::NotFound { message: "Document not found.".to_string() });
		}

		tracing::info!(%doc_id, %tenant_id, "Document deleted.");

		Ok(())
	}

	pub async fn session_history(&self, session_id: Uuid) -> Result<Vec<SessionTurn>> {
		let turns = conversation::list_turns(&self.db.pool, session_id).await?;

		Ok(turns.into_iter().map(session_turn_from_row).collect())
	}
}

fn require_tenant(tenant_id: &str) -> Result<()> {
	if tenant_id.trim().is_empty() {
		return Err(Error::InvalidRequest { message: "tenant_id is required.".to_string() });
	}

	Ok(())
}

fn detail_from_row(row: folio_storage::models::Document) -> DocumentDetail {
	DocumentDetail {
		doc_id: row.doc_id,
		filename: row.filename,
		declared_format: row.declared_format,
		content_bytes: row.content_bytes,
		status: row.status,
		failure_reason: row.failure_reason,
		chunk_count: row.chunk_count,
		embedding_version: row.embedding_version,
		uploaded_at: row.uploaded_at,
		updated_at: row.updated_at,
	}
}

fn session_turn_from_row(row: ConversationTurn) -> SessionTurn {
	SessionTurn {
		turn_index: row.turn_index,
		role: row.role,
		content: row.content,
		provider_id: row.provider_id,
		created_at: row.created_at,
	}
}
