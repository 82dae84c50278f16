pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Input {index} is {chars} characters; the provider ceiling is {limit}.")]
	TextTooLong { index: usize, chars: usize, limit: usize },
	#[error("Document is encrypted; a valid password is required.")]
	EncryptedDocument,
	#[error("Provider {provider} unavailable after {attempts} attempts: {message}")]
	ProviderUnavailable { provider: String, attempts: u32, message: String },
	#[error("Provider {provider} returned HTTP {status}: {body}")]
	UnexpectedStatus { provider: String, status: u16, body: String },
	#[error("{message}")]
	InvalidResponse { message: String },
	#[error(transparent)]
	Reqwest(#[from] reqwest::Error),
	#[error(transparent)]
	InvalidHeaderName(#[from] reqwest::header::InvalidHeaderName),
	#[error(transparent)]
	InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),
	#[error("{message}")]
	InvalidConfig { message: String },
}
