use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};
use folio_config::ChatProviderConfig;

#[derive(Clone, Debug, Serialize)]
pub struct ChatMessage {
	pub role: String,
	pub content: String,
}
impl ChatMessage {
	pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
		Self { role: role.into(), content: content.into() }
	}
}

/// Answer text plus the provider's raw response, kept for attribution.
#[derive(Clone, Debug)]
pub struct ChatCompletion {
	pub answer: String,
	pub raw: Value,
}

pub async fn complete(cfg: &ChatProviderConfig, messages: &[ChatMessage]) -> Result<ChatCompletion> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"max_tokens": cfg.max_tokens,
		"messages": messages,
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

	parse_chat_response(json)
}

fn parse_chat_response(json: Value) -> Result<ChatCompletion> {
	let answer = json
		.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|message| message.get("content"))
		.and_then(|content| content.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing choices[0].message.content.".to_string(),
		})?
		.to_string();

	Ok(ChatCompletion { answer, raw: json })
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_first_choice_content() {
		let json = serde_json::json!({
			"choices": [
				{ "message": { "role": "assistant", "content": "Net revenue was $1.2M." } }
			],
			"usage": { "total_tokens": 321 }
		});
		let completion = parse_chat_response(json).expect("parse failed");

		assert_eq!(completion.answer, "Net revenue was $1.2M.");
		assert_eq!(completion.raw["usage"]["total_tokens"], 321);
	}

	#[test]
	fn missing_content_is_an_invalid_response() {
		let json = serde_json::json!({ "choices": [] });

		assert!(matches!(parse_chat_response(json), Err(Error::InvalidResponse { .. })));
	}
}
