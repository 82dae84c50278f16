use sqlx::PgExecutor;
use time::OffsetDateTime;

use crate::{Result, models::QueryLogEntry};

/// Append-only audit row; written for successful and failed questions alike.
pub async fn insert_query_log<'e, E>(executor: E, entry: &QueryLogEntry) -> Result<()>
where
	E: PgExecutor<'e>,
{
	sqlx::query(
		"\
INSERT INTO query_log (
\tquery_id,
\ttenant_id,
\tsession_id,
\tquery_text,
\tintent,
\tprovider_id,
\tmodel,
\tlatency_ms,
\tsuccess,
\tfailure_reason,
\tchunk_ids,
\tcreated_at
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12)",
	)
	.bind(entry.query_id)
	.bind(entry.tenant_id.as_str())
	.bind(entry.session_id)
	.bind(entry.query_text.as_str())
	.bind(entry.intent.as_str())
	.bind(entry.provider_id.as_str())
	.bind(entry.model.as_str())
	.bind(entry.latency_ms)
	.bind(entry.success)
	.bind(entry.failure_reason.as_deref())
	.bind(entry.chunk_ids.as_slice())
	.bind(entry.created_at)
	.execute(executor)
	.await?;

	Ok(())
}

/// Age-based retention purge; the only path that ever removes log rows.
pub async fn purge_query_log_before<'e, E>(executor: E, cutoff: OffsetDateTime) -> Result<u64>
where
	E: PgExecutor<'e>,
{
	let result = sqlx::query("DELETE FROM query_log WHERE created_at < $1")
		.bind(cutoff)
		.execute(executor)
		.await?;

	Ok(result.rows_affected())
}
