use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub struct Document {
	pub doc_id: Uuid,
	pub tenant_id: String,
	pub filename: String,
	pub declared_format: String,
	pub content_bytes: i64,
	pub content_hash: String,
	pub status: String,
	pub failure_reason: Option<String>,
	pub chunk_count: i32,
	pub embedding_version: Option<String>,
	pub uploaded_at: OffsetDateTime,
	pub updated_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct DocumentChunk {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub chunk_index: i32,
	pub start_offset: i32,
	pub end_offset: i32,
	pub chunk_text: String,
	pub page_label: Option<String>,
	pub created_at: OffsetDateTime,
}

/// One row of the cosine-similarity search, joined with its document.
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct ChunkMatch {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub chunk_index: i32,
	pub chunk_text: String,
	pub page_label: Option<String>,
	pub filename: String,
	pub similarity: f32,
}

#[derive(Debug)]
pub struct QueryLogEntry {
	pub query_id: Uuid,
	pub tenant_id: String,
	pub session_id: Uuid,
	pub query_text: String,
	pub intent: String,
	pub provider_id: String,
	pub model: String,
	pub latency_ms: i64,
	pub success: bool,
	pub failure_reason: Option<String>,
	pub chunk_ids: Vec<Uuid>,
	pub created_at: OffsetDateTime,
}

#[derive(Debug, sqlx::FromRow)]
pub struct ConversationTurn {
	pub turn_id: Uuid,
	pub session_id: Uuid,
	pub turn_index: i32,
	pub role: String,
	pub content: String,
	pub provider_id: Option<String>,
	pub created_at: OffsetDateTime,
}
