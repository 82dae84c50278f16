use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};
use folio_config::ConverterProviderConfig;

const CONVERTER_PROVIDER_ID: &str = "converter";

/// Extracted text plus the page/sheet boundaries the converter reported.
#[derive(Clone, Debug)]
pub struct ConvertedDocument {
	pub text: String,
	pub pages: Vec<ConvertedPage>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConvertedPage {
	pub label: String,
	pub start_offset: usize,
}

/// Convert raw file bytes to text through the external conversion service.
///
/// A password-required or wrong-password rejection maps to
/// `EncryptedDocument` so the caller can re-prompt rather than treating it
/// as an outage.
pub async fn convert(
	cfg: &ConverterProviderConfig,
	content: &[u8],
	declared_format: &str,
	password: Option<&str>,
) -> Result<ConvertedDocument> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"format": declared_format,
		"password": password,
		"content_base64": BASE64.encode(content),
	});
	let json = crate::request_json(
		&client,
		&url,
		cfg.api_key.as_deref(),
		&cfg.default_headers,
		&body,
		cfg.max_attempts,
		CONVERTER_PROVIDER_ID,
	)
	.await
	.map_err(map_converter_error)?;

	parse_convert_response(json)
}

/// Encrypted-document rejections come back as a terminal client error with
/// an `encrypted`/`password` code in the body.
fn map_converter_error(err: Error) -> Error {
	if let Error::UnexpectedStatus { status, body, .. } = &err {
		let lowered = body.to_lowercase();

		if (400..500).contains(status)
			&& (lowered.contains("encrypted") || lowered.contains("password"))
		{
			return Error::EncryptedDocument;
		}
	}

	err
}

fn parse_convert_response(json: Value) -> Result<ConvertedDocument> {
	let text = json
		.get("text")
		.and_then(|v| v.as_str())
		.ok_or_else(|| Error::InvalidResponse {
			message: "Converter response is missing text.".to_string(),
		})?
		.to_string();
	let mut pages = Vec::new();

	if let Some(raw_pages) = json.get("pages").and_then(|v| v.as_array()) {
		for (fallback_index, item) in raw_pages.iter().enumerate() {
			let label = item
				.get("label")
				.and_then(|v| v.as_str())
				.map(|label| label.to_string())
				.unwrap_or_else(|| format!("page_{}", fallback_index + 1));
			let start_offset = item
				.get("start_offset")
				.and_then(|v| v.as_u64())
				.ok_or_else(|| Error::InvalidResponse {
					message: "Converter page is missing start_offset.".to_string(),
				})? as usize;

			pages.push(ConvertedPage { label, start_offset });
		}
	}

	pages.sort_by_key(|page| page.start_offset);

	Ok(ConvertedDocument { text, pages })
}
