use sqlx::PgExecutor;
use uuid::Uuid;

use crate::{
	Result,
	models::{ChunkMatch, DocumentChunk},
};

pub async fn insert_chunk<'e, E>(executor: E, chunk: &DocumentChunk) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO document_chunks (
\tchunk_id,
\tdoc_id,
\tchunk_index,
\tstart_offset,
\tend_offset,
\tchunk_text,
\tpage_label,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8)",
	)
	.bind(chunk.chunk_id)
	.bind(chunk.doc_id)
	.bind(chunk.chunk_index)
	.bind(chunk.start_offset)
	.bind(chunk.end_offset)
	.bind(chunk.chunk_text.as_str())
	.bind(chunk.page_label.as_deref())
	.bind(chunk.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn list_document_chunks<'e, E>(executor: E, doc_id: Uuid) -> Result<Vec<DocumentChunk>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, DocumentChunk>(
		"\
SELECT
\tchunk_id,
\tdoc_id,
\tchunk_index,
\tstart_offset,
\tend_offset,
\tchunk_text,
\tpage_label,
\tcreated_at
FROM document_chunks
WHERE doc_id = $1
ORDER BY chunk_index ASC",
	)
	.bind(doc_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn insert_chunk_embedding<'e, E>(
	executor: E,
	chunk_id: Uuid,
	embedding_version: &str,
	embedding_dim: i32,
	vec_text: &str,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO chunk_embeddings (chunk_id, embedding_version, embedding_dim, vec)
VALUES ($1, $2, $3, $4::text::vector)
ON CONFLICT (chunk_id, embedding_version) DO UPDATE
SET
\tembedding_dim = EXCLUDED.embedding_dim,
\tvec = EXCLUDED.vec,
\tcreated_at = now()",
	)
	.bind(chunk_id)
	.bind(embedding_version)
	.bind(embedding_dim)
	.bind(vec_text)
	.execute(executor)
	.await?;

	Ok(())
}

/// Drop every embedding row for a document's chunks, regardless of version.
/// Used inside the reindex transaction so old and new vectors are never
/// visible together.
pub async fn delete_document_embeddings<'e, E>(executor: E, doc_id: Uuid) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query(
		"\
DELETE FROM chunk_embeddings
WHERE chunk_id IN (SELECT chunk_id FROM document_chunks WHERE doc_id = $1)",
	)
	.bind(doc_id)
	.execute(executor)
	.await?;

	Ok(result.rows_affected())
}

/// Nearest chunks by cosine similarity, restricted to one tenant, one
/// embedding version, and ready documents.
///
/// Ordering is total: similarity descending, then chunk ordinal, then
/// chunk id, so identical searches against unchanged storage return
/// identical results.
pub async fn search_chunks<'e, E>(
	executor: E,
	tenant_id: &str,
	query_vec_text: &str,
	embedding_version: &str,
	min_similarity: f64,
	limit: i64,
) -> Result<Vec<ChunkMatch>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, ChunkMatch>(
		"\
SELECT
\tc.chunk_id,
\tc.doc_id,
\tc.chunk_index,
\tc.chunk_text,
\tc.page_label,
\td.filename,
\t(1 - (e.vec <=> $1::text::vector))::real AS similarity
FROM document_chunks c
JOIN chunk_embeddings e ON e.chunk_id = c.chunk_id
JOIN documents d ON d.doc_id = c.doc_id
WHERE d.tenant_id = $2
\tAND d.status = 'ready'
\tAND e.embedding_version = $3
\tAND (1 - (e.vec <=> $1::text::vector)) >= $4
ORDER BY similarity DESC, c.chunk_index ASC, c.chunk_id ASC
LIMIT $5",
	)
	.bind(query_vec_text)
	.bind(tenant_id)
	.bind(embedding_version)
	.bind(min_similarity)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Keyword candidate fetch for the optional second retrieval source.
/// Rows come back unscored; the ranker assigns the lexical score.
pub async fn keyword_candidates<'e, E>(
	executor: E,
	tenant_id: &str,
	patterns: &[String],
	limit: i64,
) -> Result<Vec<ChunkMatch>>
where
	E: PgExecutor<'e>,
{
	if patterns.is_empty() {
		return Ok(Vec::new());
	}

	let rows = sqlx::query_as::<_, ChunkMatch>(
		"\
SELECT
\tc.chunk_id,
\tc.doc_id,
\tc.chunk_index,
\tc.chunk_text,
\tc.page_label,
\td.filename,
\t0.0::real AS similarity
FROM document_chunks c
JOIN documents d ON d.doc_id = c.doc_id
WHERE d.tenant_id = $1
\tAND d.status = 'ready'
\tAND c.chunk_text ILIKE ANY($2)
ORDER BY c.doc_id, c.chunk_index
LIMIT $3",
	)
	.bind(tenant_id)
	.bind(patterns)
	.bind(limit)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}
