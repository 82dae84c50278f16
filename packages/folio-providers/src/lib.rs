pub mod chat;
pub mod converter;
pub mod embedding;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, StatusCode,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

const BASE_BACKOFF_MS: u64 = 500;
const MAX_BACKOFF_MS: u64 = 30_000;

pub fn auth_headers(api_key: Option<&str>, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}
	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

fn backoff_delay(completed_attempts: u32) -> Duration {
	let shift = completed_attempts.min(16);
	let ms = BASE_BACKOFF_MS.saturating_mul(1_u64 << shift).min(MAX_BACKOFF_MS);

	Duration::from_millis(ms)
}

fn is_retryable_status(status: StatusCode) -> bool {
	status == StatusCode::REQUEST_TIMEOUT
		|| status == StatusCode::TOO_MANY_REQUESTS
		|| status.is_server_error()
}

/// POST `body` to `url`, retrying transient failures (408/429/5xx, request
/// timeouts, connect errors) with exponential backoff. Non-retryable
/// statuses surface immediately as `UnexpectedStatus`; exhausting the
/// attempt budget surfaces `ProviderUnavailable`.
pub(crate) async fn request_json(
	client: &Client,
	url: &str,
	api_key: Option<&str>,
	default_headers: &Map<String, Value>,
	body: &Value,
	max_attempts: u32,
	provider: &str,
) -> Result<Value> {
	let headers = auth_headers(api_key, default_headers)?;
	let attempts = max_attempts.max(1);
	let mut last_error = String::new();

	for attempt in 0..attempts {
		if attempt > 0 {
			tracing::warn!(provider, attempt, error = %last_error, "Retrying provider call.");
			tokio::time::sleep(backoff_delay(attempt - 1)).await;
		}

		match client.post(url).headers(headers.clone()).json(body).send().await {
			Ok(response) => {
				let status = response.status();

				if status.is_success() {
					return Ok(response.json().await?);
				}

				let body_text = response.text().await.unwrap_or_default();

				if !is_retryable_status(status) {
					return Err(Error::UnexpectedStatus {
						provider: provider.to_string(),
						status: status.as_u16(),
						body: body_text,
					});
				}

				last_error = format!("HTTP {status}: {body_text}");
			},
			Err(err) if err.is_timeout() || err.is_connect() => {
				last_error = err.to_string();
			},
			Err(err) => return Err(err.into()),
		}
	}

	Err(Error::ProviderUnavailable { provider: provider.to_string(), attempts, message: last_error })
}
