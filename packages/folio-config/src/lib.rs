mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	ChatProviderConfig, Chunking, Compose, Config, ConverterProviderConfig,
	EmbeddingProviderConfig, Lifecycle, Postgres, Providers, Retrieval, Service, Storage,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.admin_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.admin_bind must be non-empty.".to_string(),
		});
	}
	if cfg.service.max_upload_bytes == 0 {
		return Err(Error::Validation {
			message: "service.max_upload_bytes must be greater than zero.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.max_batch_size == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.max_batch_size must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.max_text_chars == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.max_text_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.max_text_chars < cfg.chunking.window_chars {
		return Err(Error::Validation {
			message: "providers.embedding.max_text_chars must be at least chunking.window_chars."
				.to_string(),
		});
	}
	for (label, attempts) in [
		("providers.embedding.max_attempts", cfg.providers.embedding.max_attempts),
		("providers.chat.max_attempts", cfg.providers.chat.max_attempts),
		("providers.converter.max_attempts", cfg.providers.converter.max_attempts),
	] {
		if attempts == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}
	if !cfg.providers.chat.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.providers.chat.temperature) {
		return Err(Error::Validation {
			message: "providers.chat.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.providers.chat.max_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.chat.max_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.window_chars == 0 {
		return Err(Error::Validation {
			message: "chunking.window_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.chunking.overlap_chars >= cfg.chunking.window_chars {
		return Err(Error::Validation {
			message: "chunking.overlap_chars must be less than chunking.window_chars.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.candidate_k < cfg.retrieval.top_k {
		return Err(Error::Validation {
			message: "retrieval.candidate_k must be at least retrieval.top_k.".to_string(),
		});
	}
	if !cfg.retrieval.min_similarity.is_finite() {
		return Err(Error::Validation {
			message: "retrieval.min_similarity must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.retrieval.min_similarity) {
		return Err(Error::Validation {
			message: "retrieval.min_similarity must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !cfg.retrieval.keyword_weight.is_finite() {
		return Err(Error::Validation {
			message: "retrieval.keyword_weight must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.retrieval.keyword_weight) {
		return Err(Error::Validation {
			message: "retrieval.keyword_weight must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.compose.max_context_chars == 0 {
		return Err(Error::Validation {
			message: "compose.max_context_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.lifecycle.query_log_retention_days <= 0 {
		return Err(Error::Validation {
			message: "lifecycle.query_log_retention_days must be greater than zero.".to_string(),
		});
	}

	for (label, key) in [
		("embedding", &cfg.providers.embedding.api_key),
		("chat", &cfg.providers.chat.api_key),
	] {
		if key.trim().is_empty() {
			return Err(Error::Validation {
				message: format!("Provider {label} api_key must be non-empty."),
			});
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg
		.providers
		.converter
		.api_key
		.as_deref()
		.map(|key| key.trim().is_empty())
		.unwrap_or(false)
	{
		cfg.providers.converter.api_key = None;
	}
}
