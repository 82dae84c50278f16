use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	pub chunking: Chunking,
	pub retrieval: Retrieval,
	pub compose: Compose,
	pub lifecycle: Lifecycle,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
	pub max_upload_bytes: u64,
}

#[derive(Debug, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub chat: ChatProviderConfig,
	pub converter: ConverterProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub max_batch_size: u32,
	/// Pre-call ceiling for a single input text, in characters. Inputs over
	/// this limit are rejected before any provider traffic.
	pub max_text_chars: u32,
	pub max_attempts: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ChatProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	pub max_tokens: u32,
	pub max_attempts: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ConverterProviderConfig {
	pub api_base: String,
	pub api_key: Option<String>,
	pub path: String,
	pub max_attempts: u32,
	pub timeout_ms: u64,
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Chunking {
	pub window_chars: u32,
	pub overlap_chars: u32,
}

#[derive(Debug, Deserialize)]
pub struct Retrieval {
	pub top_k: u32,
	pub candidate_k: u32,
	pub min_similarity: f32,
	#[serde(default)]
	pub keyword_filter: bool,
	#[serde(default = "default_keyword_weight")]
	pub keyword_weight: f32,
}

#[derive(Debug, Deserialize)]
pub struct Compose {
	pub max_context_chars: u32,
	pub history_max_turns: u32,
}

#[derive(Debug, Deserialize)]
pub struct Lifecycle {
	pub query_log_retention_days: i64,
}

fn default_keyword_weight() -> f32 {
	0.3
}
