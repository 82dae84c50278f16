use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use folio_config::EmbeddingProviderConfig;

/// Embed a batch of texts, returning one vector per input in input order.
///
/// Credentials arrive via `cfg` on every call and are not retained. Inputs
/// over the provider ceiling are rejected before any network traffic, and
/// oversized batches are split to `cfg.max_batch_size` sub-batches.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	ensure_text_limits(texts, cfg.max_text_chars as usize)?;

	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let mut vectors = Vec::with_capacity(texts.len());

	for batch in texts.chunks(cfg.max_batch_size.max(1) as usize) {
		let body = serde_json::json!({
			"model": cfg.model,
			"input": batch,
			"dimensions": cfg.dimensions,
		});
		let json = crate::request_json(
			&client,
			&url,
			Some(cfg.api_key.as_str()),
			&cfg.default_headers,
			&body,
			cfg.max_attempts,
			cfg.provider_id.as_str(),
		)
		.await?;
		let parsed = parse_embedding_response(json)?;

		if parsed.len() != batch.len() {
			return Err(Error::InvalidResponse {
				message: format!(
					"Embedding provider returned {} vectors for {} inputs.",
					parsed.len(),
					batch.len()
				),
			});
		}

		vectors.extend(parsed);
	}

	Ok(vectors)
}

/// Pre-call ceiling check, so oversized inputs fail here rather than as an
/// opaque provider error.
fn ensure_text_limits(texts: &[String], limit: usize) -> Result<()> {
	for (index, text) in texts.iter().enumerate() {
		let chars = text.chars().count();

		if chars > limit {
			return Err(Error::TextTooLong { index, chars, limit });
		}
	}

	Ok(())
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;

	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse { message: "Embedding item missing embedding array.".to_string() }
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn missing_data_array_is_an_invalid_response() {
		let json = serde_json::json!({ "object": "list" });

		assert!(matches!(
			parse_embedding_response(json),
			Err(Error::InvalidResponse { .. })
		));
	}

	#[test]
	fn oversized_inputs_fail_before_any_call() {
		let texts = vec!["ok".to_string(), "x".repeat(11)];
		let err = ensure_text_limits(&texts, 10).expect_err("Expected a ceiling violation.");

		match err {
			Error::TextTooLong { index, chars, limit } => {
				assert_eq!(index, 1);
				assert_eq!(chars, 11);
				assert_eq!(limit, 10);
			},
			other => panic!("Expected TextTooLong, got {other:?}"),
		}
	}

	#[test]
	fn inputs_at_the_ceiling_pass() {
		let texts = vec!["x".repeat(10)];

		assert!(ensure_text_limits(&texts, 10).is_ok());
	}
}
