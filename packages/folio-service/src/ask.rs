use std::time::Instant;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
	Error, FolioService, Result,
	compose::{self, ContextWindow},
	rank::{self, Candidate},
};
use folio_domain::{QueryIntent, Role};
use folio_providers::chat::ChatMessage;
use folio_storage::{chunks, conversation, models::QueryLogEntry, query_log};

const MAX_TOP_K: u32 = 100;
const MAX_KEYWORD_TERMS: usize = 8;

#[derive(Clone, Debug, Deserialize)]
pub struct AskRequest {
	pub tenant_id: String,
	pub session_id: Uuid,
	pub query: String,
	/// Per-request overrides for the configured retrieval defaults.
	pub top_k: Option<u32>,
	pub min_similarity: Option<f32>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Citation {
	pub doc_id: Uuid,
	pub filename: String,
	pub page_label: String,
	pub similarity: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct AskResponse {
	pub answer: String,
	pub citations: Vec<Citation>,
	pub intent: String,
	pub latency_ms: i64,
	/// False when the fixed no-documents answer was returned.
	pub context_found: bool,
}

impl FolioService {
	/// Query pipeline: embed -> vector search -> merge/rank -> compose ->
	/// chat completion, with the query audited whether it succeeds or
	/// fails. An empty retrieval short-circuits before any chat call.
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let started = Instant::now();
		let (top_k, min_similarity) = self.resolve_retrieval_overrides(&req)?;

		if req.tenant_id.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "tenant_id is required.".to_string() });
		}
		if req.query.trim().is_empty() {
			return Err(Error::InvalidRequest { message: "query is required.".to_string() });
		}

		let intent = QueryIntent::classify(&req.query);

		match self.answer_query(&req, intent, top_k, min_similarity, started).await {
			Ok((response, used_ids)) => {
				self.record_query(&req, intent, &used_ids, response.latency_ms, true, None).await;

				Ok(response)
			},
			Err(err) => {
				let latency_ms = started.elapsed().as_millis() as i64;

				self.record_query(&req, intent, &[], latency_ms, false, Some(err.audit_code()))
					.await;

				Err(err)
			},
		}
	}

	async fn answer_query(
		&self,
		req: &AskRequest,
		intent: QueryIntent,
		top_k: u32,
		min_similarity: f32,
		started: Instant,
	) -> Result<(AskResponse, Vec<Uuid>)> {
		let embedded = self
			.providers
			.embedding
			.embed(&self.cfg.providers.embedding, std::slice::from_ref(&req.query))
			.await?;
		let Some(query_vec) = embedded.first() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		crate::validate_vector_dim(query_vec, self.cfg.providers.embedding.dimensions)?;

		let candidates = self.gather_candidates(req, query_vec, top_k, min_similarity).await?;
		let ranked = rank::merge_candidates(candidates, top_k as usize);
		let window =
			compose::build_context(&ranked, self.cfg.compose.max_context_chars as usize);

		if window.used.is_empty() {
			tracing::info!(session_id = %req.session_id, "No relevant chunks; skipping chat call.");

			let response = self
				.finish_answer(req, intent, compose::NO_CONTEXT_ANSWER.to_string(), &window, None, started)
				.await?;

			return Ok((response, Vec::new()));
		}

		let history = self.session_history_messages(req.session_id).await?;
		let messages = compose::build_messages(intent, &req.query, &window.text, &history);
		let completion =
			self.providers.chat.complete(&self.cfg.providers.chat, &messages).await?;
		let used_ids: Vec<Uuid> = window.used.iter().map(|candidate| candidate.chunk_id).collect();
		let response = self
			.finish_answer(
				req,
				intent,
				completion.answer,
				&window,
				Some(self.cfg.providers.chat.provider_id.as_str()),
				started,
			)
			.await?;

		Ok((response, used_ids))
	}

	async fn gather_candidates(
		&self,
		req: &AskRequest,
		query_vec: &[f32],
		top_k: u32,
		min_similarity: f32,
	) -> Result<Vec<Vec<Candidate>>> {
		let vec_text = crate::vector_to_pg(query_vec);
		let embed_version = crate::embedding_version(&self.cfg);
		let candidate_k = self.cfg.retrieval.candidate_k.max(top_k);
		let matches = chunks::search_chunks(
			&self.db.pool,
			req.tenant_id.as_str(),
			&vec_text,
			&embed_version,
			min_similarity as f64,
			candidate_k as i64,
		)
		.await?;
		let vector_candidates: Vec<Candidate> =
			matches.into_iter().map(candidate_from_match).collect();
		let mut lists = vec![vector_candidates];

		if self.cfg.retrieval.keyword_filter {
			lists.push(self.keyword_candidates(req, candidate_k).await?);
		}

		Ok(lists)
	}

	/// Optional second retrieval source: ILIKE-filtered chunks scored by
	/// weighted query-term overlap.
	async fn keyword_candidates(
		&self,
		req: &AskRequest,
		candidate_k: u32,
	) -> Result<Vec<Candidate>> {
		let terms = rank::query_terms(&req.query);
		let patterns: Vec<String> = terms
			.iter()
			.take(MAX_KEYWORD_TERMS)
			.map(|term| format!("%{term}%"))
			.collect();
		let rows = chunks::keyword_candidates(
			&self.db.pool,
			req.tenant_id.as_str(),
			&patterns,
			candidate_k as i64,
		)
		.await?;
		let weight = self.cfg.retrieval.keyword_weight;

		Ok(rows
			.into_iter()
			.map(|row| {
				let mut candidate = candidate_from_match(row);

				candidate.similarity = weight * rank::lexical_score(&req.query, &candidate.text);

				candidate
			})
			.collect())
	}

	/// Append the exchange to the session history and shape the response.
	async fn finish_answer(
		&self,
		req: &AskRequest,
		intent: QueryIntent,
		answer: String,
		window: &ContextWindow,
		answer_provider: Option<&str>,
		started: Instant,
	) -> Result<AskResponse> {
		let now = OffsetDateTime::now_utc();
		let mut tx = self.db.pool.begin().await?;

		conversation::append_turn(
			&mut *tx,
			req.session_id,
			Role::User.as_str(),
			&req.query,
			None,
			now,
		)
		.await?;
		conversation::append_turn(
			&mut *tx,
			req.session_id,
			Role::Assistant.as_str(),
			&answer,
			answer_provider,
			now,
		)
		.await?;

		tx.commit().await?;

		let citations = citations_from_window(window);
		let context_found = !window.used.is_empty();

		Ok(AskResponse {
			answer,
			citations,
			intent: intent.as_str().to_string(),
			latency_ms: started.elapsed().as_millis() as i64,
			context_found,
		})
	}

	async fn session_history_messages(&self, session_id: Uuid) -> Result<Vec<ChatMessage>> {
		let turns = conversation::list_turns(&self.db.pool, session_id).await?;
		let max_turns = self.cfg.compose.history_max_turns as usize;
		let skip = turns.len().saturating_sub(max_turns);

		Ok(turns
			.into_iter()
			.skip(skip)
			.map(|turn| ChatMessage::new(turn.role, turn.content))
			.collect())
	}

	fn resolve_retrieval_overrides(&self, req: &AskRequest) -> Result<(u32, f32)> {
		let top_k = match req.top_k {
			Some(0) =>
				return Err(Error::InvalidRequest {
					message: "top_k must be greater than zero.".to_string(),
				}),
			Some(top_k) if top_k > MAX_TOP_K =>
				return Err(Error::InvalidRequest {
					message: format!("top_k must be {MAX_TOP_K} or less."),
				}),
			Some(top_k) => top_k,
			None => self.cfg.retrieval.top_k,
		};
		let min_similarity = match req.min_similarity {
			Some(value) if !value.is_finite() || !(0.0..=1.0).contains(&value) =>
				return Err(Error::InvalidRequest {
					message: "min_similarity must be in the range 0.0-1.0.".to_string(),
				}),
			Some(value) => value,
			None => self.cfg.retrieval.min_similarity,
		};

		Ok((top_k, min_similarity))
	}

	/// Audit the question whether it succeeded or failed; a logging failure
	/// is traced, never allowed to mask the real outcome.
	async fn record_query(
		&self,
		req: &AskRequest,
		intent: QueryIntent,
		used_ids: &[Uuid],
		latency_ms: i64,
		success: bool,
		failure_reason: Option<&str>,
	) {
		let entry = QueryLogEntry {
			query_id: Uuid::new_v4(),
			tenant_id: req.tenant_id.clone(),
			session_id: req.session_id,
			query_text: req.query.clone(),
			intent: intent.as_str().to_string(),
			provider_id: self.cfg.providers.chat.provider_id.clone(),
			model: self.cfg.providers.chat.model.clone(),
			latency_ms,
			success,
			failure_reason: failure_reason.map(|reason| reason.to_string()),
			chunk_ids: used_ids.to_vec(),
			created_at: OffsetDateTime::now_utc(),
		};

		if let Err(err) = query_log::insert_query_log(&self.db.pool, &entry).await {
			tracing::error!(
				session_id = %req.session_id,
				error = %err,
				"Failed to record query log entry."
			);
		}
	}
}

fn candidate_from_match(row: folio_storage::models::ChunkMatch) -> Candidate {
	Candidate {
		chunk_id: row.chunk_id,
		doc_id: row.doc_id,
		chunk_index: row.chunk_index,
		filename: row.filename,
		page_label: row.page_label,
		text: row.chunk_text,
		similarity: row.similarity,
	}
}

/// One citation per (document, page) pair actually included in the context,
/// keeping the highest similarity, in context order.
fn citations_from_window(window: &ContextWindow) -> Vec<Citation> {
	let mut citations: Vec<Citation> = Vec::new();

	for candidate in &window.used {
		let page_label =
			candidate.page_label.clone().unwrap_or_else(|| "unknown".to_string());

		if let Some(existing) = citations
			.iter_mut()
			.find(|c| c.doc_id == candidate.doc_id && c.page_label == page_label)
		{
			if candidate.similarity > existing.similarity {
				existing.similarity = candidate.similarity;
			}

			continue;
		}

		citations.push(Citation {
			doc_id: candidate.doc_id,
			filename: candidate.filename.clone(),
			page_label,
			similarity: candidate.similarity,
		});
	}

	citations
}

#[cfg(test)]
mod tests {
	use super::*;

	fn used(doc: u128, page: Option<&str>, similarity: f32) -> Candidate {
		Candidate {
			chunk_id: Uuid::new_v4(),
			doc_id: Uuid::from_u128(doc),
			chunk_index: 0,
			filename: format!("doc{doc}.pdf"),
			page_label: page.map(|p| p.to_string()),
			text: "text".to_string(),
			similarity,
		}
	}

	#[test]
	fn citations_collapse_same_document_page_pairs() {
		let window = ContextWindow {
			text: String::new(),
			used: vec![
				used(1, Some("page_1"), 0.9),
				used(1, Some("page_1"), 0.95),
				used(1, Some("page_2"), 0.8),
				used(2, Some("page_1"), 0.7),
			],
		};
		let citations = citations_from_window(&window);

		assert_eq!(citations.len(), 3);
		assert_eq!(citations[0].similarity, 0.95);
		assert_eq!(citations[0].page_label, "page_1");
		assert_eq!(citations[1].page_label, "page_2");
		assert_eq!(citations[2].doc_id, Uuid::from_u128(2));
	}

	#[test]
	fn missing_page_labels_cite_as_unknown() {
		let window = ContextWindow { text: String::new(), used: vec![used(1, None, 0.9)] };
		let citations = citations_from_window(&window);

		assert_eq!(citations[0].page_label, "unknown");
	}

	#[test]
	fn empty_window_yields_no_citations() {
		let window = ContextWindow { text: String::new(), used: vec![] };

		assert!(citations_from_window(&window).is_empty());
	}
}
