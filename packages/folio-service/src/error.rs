pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid configuration: {message}")]
	InvalidConfiguration { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Not found: {message}")]
	NotFound { message: String },
	#[error("Document is encrypted; a valid password is required.")]
	EncryptedDocument,
	#[error("Text too long for the embedding provider: {message}")]
	TextTooLong { message: String },
	#[error("Provider unavailable: {message}")]
	ProviderUnavailable { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	/// Short, stable code recorded in audit rows (document failure_reason,
	/// query_log.failure_reason).
	pub fn audit_code(&self) -> &'static str {
		match self {
			Error::InvalidConfiguration { .. } => "invalid_configuration",
			Error::InvalidRequest { .. } => "invalid_request",
			Error::NotFound { .. } => "not_found",
			Error::EncryptedDocument => "password_required",
			Error::TextTooLong { .. } => "text_too_long",
			Error::ProviderUnavailable { .. } => "provider_unavailable",
			Error::Provider { .. } => "provider_error",
			Error::Storage { .. } => "storage_failure",
		}
	}
}

impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		Self::Storage { message: err.to_string() }
	}
}

impl From<folio_storage::Error> for Error {
	fn from(err: folio_storage::Error) -> Self {
		match err {
			folio_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			folio_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
			folio_storage::Error::NotFound(message) => Self::NotFound { message },
		}
	}
}

impl From<folio_chunking::Error> for Error {
	fn from(err: folio_chunking::Error) -> Self {
		match err {
			folio_chunking::Error::InvalidConfiguration { message } =>
				Self::InvalidConfiguration { message },
		}
	}
}

impl From<folio_providers::Error> for Error {
	fn from(err: folio_providers::Error) -> Self {
		match err {
			folio_providers::Error::TextTooLong { .. } =>
				Self::TextTooLong { message: err.to_string() },
			folio_providers::Error::EncryptedDocument => Self::EncryptedDocument,
			folio_providers::Error::ProviderUnavailable { .. } =>
				Self::ProviderUnavailable { message: err.to_string() },
			other => Self::Provider { message: other.to_string() },
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn provider_errors_map_onto_the_service_taxonomy() {
		let too_long = Error::from(folio_providers::Error::TextTooLong {
			index: 0,
			chars: 9_000,
			limit: 8_000,
		});

		assert!(matches!(too_long, Error::TextTooLong { .. }));
		assert_eq!(too_long.audit_code(), "text_too_long");

		let encrypted = Error::from(folio_providers::Error::EncryptedDocument);

		assert!(matches!(encrypted, Error::EncryptedDocument));

		let unavailable = Error::from(folio_providers::Error::ProviderUnavailable {
			provider: "openai".to_string(),
			attempts: 3,
			message: "HTTP 429".to_string(),
		});

		assert!(matches!(unavailable, Error::ProviderUnavailable { .. }));
		assert_eq!(unavailable.audit_code(), "provider_unavailable");
	}
}
