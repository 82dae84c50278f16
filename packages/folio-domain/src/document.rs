use serde::{Deserialize, Serialize};

/// Processing lifecycle of an uploaded document.
///
/// Status is mutated only by the upload pipeline; query-time code reads it
/// and never writes it.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
	Pending,
	Processing,
	Ready,
	Failed,
}
impl DocumentStatus {
	pub fn as_str(self) -> &'static str {
		match self {
			DocumentStatus::Pending => "pending",
			DocumentStatus::Processing => "processing",
			DocumentStatus::Ready => "ready",
			DocumentStatus::Failed => "failed",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"pending" => Some(DocumentStatus::Pending),
			"processing" => Some(DocumentStatus::Processing),
			"ready" => Some(DocumentStatus::Ready),
			"failed" => Some(DocumentStatus::Failed),
			_ => None,
		}
	}

	/// Valid forward transitions: pending -> processing -> ready | failed.
	pub fn can_transition_to(self, next: Self) -> bool {
		matches!(
			(self, next),
			(DocumentStatus::Pending, DocumentStatus::Processing)
				| (DocumentStatus::Processing, DocumentStatus::Ready)
				| (DocumentStatus::Processing, DocumentStatus::Failed)
		)
	}
}

/// Accepted upload formats, matching what the conversion service handles.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredFormat {
	Pdf,
	Xlsx,
	Csv,
	Docx,
}
impl DeclaredFormat {
	pub fn as_str(self) -> &'static str {
		match self {
			DeclaredFormat::Pdf => "pdf",
			DeclaredFormat::Xlsx => "xlsx",
			DeclaredFormat::Csv => "csv",
			DeclaredFormat::Docx => "docx",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw.to_ascii_lowercase().as_str() {
			"pdf" => Some(DeclaredFormat::Pdf),
			"xlsx" | "xls" => Some(DeclaredFormat::Xlsx),
			"csv" => Some(DeclaredFormat::Csv),
			"docx" => Some(DeclaredFormat::Docx),
			_ => None,
		}
	}

	/// Best-effort format from a filename extension.
	pub fn from_filename(filename: &str) -> Option<Self> {
		let extension = filename.rsplit('.').next()?;

		if extension == filename {
			return None;
		}

		Self::parse(extension)
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
	User,
	Assistant,
}
impl Role {
	pub fn as_str(self) -> &'static str {
		match self {
			Role::User => "user",
			Role::Assistant => "assistant",
		}
	}

	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"user" => Some(Role::User),
			"assistant" => Some(Role::Assistant),
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn status_transitions_follow_the_pipeline() {
		assert!(DocumentStatus::Pending.can_transition_to(DocumentStatus::Processing));
		assert!(DocumentStatus::Processing.can_transition_to(DocumentStatus::Ready));
		assert!(DocumentStatus::Processing.can_transition_to(DocumentStatus::Failed));
		assert!(!DocumentStatus::Ready.can_transition_to(DocumentStatus::Processing));
		assert!(!DocumentStatus::Failed.can_transition_to(DocumentStatus::Ready));
	}

	#[test]
	fn formats_parse_from_filenames() {
		assert_eq!(DeclaredFormat::from_filename("q1_report.PDF"), Some(DeclaredFormat::Pdf));
		assert_eq!(DeclaredFormat::from_filename("ledger.xls"), Some(DeclaredFormat::Xlsx));
		assert_eq!(DeclaredFormat::from_filename("no_extension"), None);
		assert_eq!(DeclaredFormat::from_filename("archive.zip"), None);
	}
}
