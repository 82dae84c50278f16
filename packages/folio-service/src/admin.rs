use serde::Serialize;
use time::{Duration, OffsetDateTime};

use crate::{FolioService, Result};
use folio_storage::query_log;

#[derive(Clone, Debug, Serialize)]
pub struct PurgeReport {
	pub purged_queries: u64,
	#[serde(with = "crate::time_serde")]
	pub cutoff: OffsetDateTime,
}

impl FolioService {
	/// Age-based query-log retention purge, driven by
	/// `lifecycle.query_log_retention_days`. The only code path that deletes
	/// audit rows.
	pub async fn purge_query_log(&self) -> Result<PurgeReport> {
		let cutoff = OffsetDateTime::now_utc()
			- Duration::days(self.cfg.lifecycle.query_log_retention_days);
		let purged_queries = query_log::purge_query_log_before(&self.db.pool, cutoff).await?;

		tracing::info!(purged_queries, %cutoff, "Query log purged.");

		Ok(PurgeReport { purged_queries, cutoff })
	}
}
