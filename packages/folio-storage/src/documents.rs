use sqlx::PgExecutor;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Result, models::Document};

const DOCUMENT_COLUMNS: &str = "\
doc_id,
\ttenant_id,
\tfilename,
\tdeclared_format,
\tcontent_bytes,
\tcontent_hash,
\tstatus,
\tfailure_reason,
\tchunk_count,
\tembedding_version,
\tuploaded_at,
\tupdated_at";

pub async fn insert_document<'e, E>(executor: E, doc: &Document) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO documents (
\tdoc_id,
\ttenant_id,
\tfilename,
\tdeclared_format,
\tcontent_bytes,
\tcontent_hash,
\tstatus,
\tfailure_reason,
\tchunk_count,
\tembedding_version,
\tuploaded_at,
\tupdated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
	)
	.bind(doc.doc_id)
	.bind(doc.tenant_id.as_str())
	.bind(doc.filename.as_str())
	.bind(doc.declared_format.as_str())
	.bind(doc.content_bytes)
	.bind(doc.content_hash.as_str())
	.bind(doc.status.as_str())
	.bind(doc.failure_reason.as_deref())
	.bind(doc.chunk_count)
	.bind(doc.embedding_version.as_deref())
	.bind(doc.uploaded_at)
	.bind(doc.updated_at)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn set_document_status<'e, E>(
	executor: E,
	doc_id: Uuid,
	status: &str,
	failure_reason: Option<&str>,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE documents
SET status = $1, failure_reason = $2, updated_at = $3
WHERE doc_id = $4",
	)
	.bind(status)
	.bind(failure_reason)
	.bind(now)
	.bind(doc_id)
	.execute(executor)
	.await?;

	Ok(())
}

/// Final transition of a successful ingest; recorded inside the same
/// transaction as the chunk and embedding rows.
pub async fn set_document_ready<'e, E>(
	executor: E,
	doc_id: Uuid,
	chunk_count: i32,
	embedding_version: &str,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE documents
SET
\tstatus = 'ready',
\tfailure_reason = NULL,
\tchunk_count = $1,
\tembedding_version = $2,
\tupdated_at = $3
WHERE doc_id = $4",
	)
	.bind(chunk_count)
	.bind(embedding_version)
	.bind(now)
	.bind(doc_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn set_document_embedding_version<'e, E>(
	executor: E,
	doc_id: Uuid,
	embedding_version: &str,
	now: OffsetDateTime,
) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
UPDATE documents
SET embedding_version = $1, updated_at = $2
WHERE doc_id = $3",
	)
	.bind(embedding_version)
	.bind(now)
	.bind(doc_id)
	.execute(executor)
	.await?;

	Ok(())
}

pub async fn get_document<'e, E>(
	executor: E,
	tenant_id: &str,
	doc_id: Uuid,
) -> Result<Option<Document>>
where
	E: PgExecutor<'e>,
{
	let row = sqlx::query_as::<_, Document>(&format!(
		"\
SELECT
\t{DOCUMENT_COLUMNS}
FROM documents
WHERE tenant_id = $1 AND doc_id = $2
LIMIT 1",
	))
	.bind(tenant_id)
	.bind(doc_id)
	.fetch_optional(executor)
	.await?;

	Ok(row)
}

pub async fn list_documents<'e, E>(executor: E, tenant_id: &str) -> Result<Vec<Document>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, Document>(&format!(
		"\
SELECT
\t{DOCUMENT_COLUMNS}
FROM documents
WHERE tenant_id = $1
ORDER BY uploaded_at DESC",
	))
	.bind(tenant_id)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

/// Hard delete; chunk and embedding rows go with it via ON DELETE CASCADE.
pub async fn delete_document<'e, E>(executor: E, tenant_id: &str, doc_id: Uuid) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM documents WHERE tenant_id = $1 AND doc_id = $2")
		.bind(tenant_id)
		.bind(doc_id)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}
