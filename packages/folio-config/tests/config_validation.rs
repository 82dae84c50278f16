use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use folio_config::Config;

const SAMPLE_CONFIG_TEMPLATE_TOML: &str = include_str!("fixtures/sample_config.template.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value =
		toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse template config.");
	let mut table = root.as_table_mut().expect("Template config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Template config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render template config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("folio_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn load_and_remove(payload: String) -> folio_config::Result<Config> {
	let path = write_temp_config(payload);
	let result = folio_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	result
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TEMPLATE_TOML).expect("Failed to parse test config.")
}

#[test]
fn template_config_is_valid() {
	let cfg = load_and_remove(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Expected template config to be valid.");

	assert_eq!(cfg.chunking.window_chars, 50);
	assert_eq!(cfg.chunking.overlap_chars, 10);
}

#[test]
fn folio_example_toml_is_valid() {
	let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

	path.push("../../folio.example.toml");

	folio_config::load(&path).expect("Expected folio.example.toml to be a valid config.");
}

#[test]
fn chunking_window_must_be_positive() {
	let payload = sample_toml_with("chunking", "window_chars", Value::Integer(0));
	let err = load_and_remove(payload).expect_err("Expected window_chars validation error.");

	assert!(
		err.to_string().contains("chunking.window_chars must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn chunking_overlap_must_be_less_than_window() {
	let payload = sample_toml_with("chunking", "overlap_chars", Value::Integer(50));
	let err = load_and_remove(payload).expect_err("Expected overlap validation error.");

	assert!(
		err.to_string().contains("chunking.overlap_chars must be less than chunking.window_chars."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_dimensions_must_be_positive() {
	let payload = sample_toml_with("providers.embedding", "dimensions", Value::Integer(0));
	let err = load_and_remove(payload).expect_err("Expected dimensions validation error.");

	assert!(
		err.to_string().contains("providers.embedding.dimensions must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn embedding_text_ceiling_must_cover_chunk_window() {
	let payload = sample_toml_with("providers.embedding", "max_text_chars", Value::Integer(10));
	let err = load_and_remove(payload).expect_err("Expected max_text_chars validation error.");

	assert!(
		err.to_string().contains(
			"providers.embedding.max_text_chars must be at least chunking.window_chars."
		),
		"Unexpected error: {err}"
	);
}

#[test]
fn retrieval_top_k_must_be_positive() {
	let payload = sample_toml_with("retrieval", "top_k", Value::Integer(0));
	let err = load_and_remove(payload).expect_err("Expected top_k validation error.");

	assert!(
		err.to_string().contains("retrieval.top_k must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn retrieval_candidate_k_must_cover_top_k() {
	let payload = sample_toml_with("retrieval", "candidate_k", Value::Integer(3));
	let err = load_and_remove(payload).expect_err("Expected candidate_k validation error.");

	assert!(
		err.to_string().contains("retrieval.candidate_k must be at least retrieval.top_k."),
		"Unexpected error: {err}"
	);
}

#[test]
fn retrieval_min_similarity_must_be_in_range() {
	let payload = sample_toml_with("retrieval", "min_similarity", Value::Float(1.5));
	let err = load_and_remove(payload).expect_err("Expected min_similarity validation error.");

	assert!(
		err.to_string().contains("retrieval.min_similarity must be in the range 0.0-1.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn retrieval_min_similarity_must_be_finite() {
	let mut cfg = base_config();

	cfg.retrieval.min_similarity = f32::NAN;

	let err =
		folio_config::validate(&cfg).expect_err("Expected min_similarity finiteness error.");

	assert!(
		err.to_string().contains("retrieval.min_similarity must be a finite number."),
		"Unexpected error: {err}"
	);
}

#[test]
fn chat_temperature_must_be_in_range() {
	let mut cfg = base_config();

	cfg.providers.chat.temperature = 2.5;

	let err = folio_config::validate(&cfg).expect_err("Expected temperature validation error.");

	assert!(
		err.to_string().contains("providers.chat.temperature must be in the range 0.0-2.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn provider_api_keys_must_be_non_empty() {
	let payload =
		sample_toml_with("providers.embedding", "api_key", Value::String("   ".to_string()));
	let err = load_and_remove(payload).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider embedding api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn blank_converter_api_key_normalizes_to_none() {
	let cfg = load_and_remove(SAMPLE_CONFIG_TEMPLATE_TOML.to_string())
		.expect("Expected template config to be valid.");

	assert!(cfg.providers.converter.api_key.is_none());
}

#[test]
fn query_log_retention_must_be_positive() {
	let payload = sample_toml_with("lifecycle", "query_log_retention_days", Value::Integer(0));
	let err = load_and_remove(payload).expect_err("Expected retention validation error.");

	assert!(
		err.to_string().contains("lifecycle.query_log_retention_days must be greater than zero."),
		"Unexpected error: {err}"
	);
}

#[test]
fn compose_context_budget_must_be_positive() {
	let payload = sample_toml_with("compose", "max_context_chars", Value::Integer(0));
	let err = load_and_remove(payload).expect_err("Expected context budget validation error.");

	assert!(
		err.to_string().contains("compose.max_context_chars must be greater than zero."),
		"Unexpected error: {err}"
	);
}
