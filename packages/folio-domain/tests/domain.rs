use folio_domain::{DeclaredFormat, DocumentStatus, QueryIntent, Role};

#[test]
fn status_round_trips_through_storage_text() {
	for status in [
		DocumentStatus::Pending,
		DocumentStatus::Processing,
		DocumentStatus::Ready,
		DocumentStatus::Failed,
	] {
		assert_eq!(DocumentStatus::parse(status.as_str()), Some(status));
	}

	assert_eq!(DocumentStatus::parse("deleted"), None);
}

#[test]
fn declared_formats_cover_the_accepted_upload_types() {
	for (raw, format) in [
		("pdf", DeclaredFormat::Pdf),
		("xlsx", DeclaredFormat::Xlsx),
		("csv", DeclaredFormat::Csv),
		("docx", DeclaredFormat::Docx),
	] {
		assert_eq!(DeclaredFormat::parse(raw), Some(format));
		assert_eq!(format.as_str(), raw);
	}

	assert_eq!(DeclaredFormat::parse("txt"), None);
}

#[test]
fn roles_round_trip() {
	assert_eq!(Role::parse(Role::User.as_str()), Some(Role::User));
	assert_eq!(Role::parse(Role::Assistant.as_str()), Some(Role::Assistant));
	assert_eq!(Role::parse("system"), None);
}

#[test]
fn intent_labels_are_stable() {
	assert_eq!(QueryIntent::DocumentLookup.as_str(), "document_lookup");
	assert_eq!(QueryIntent::RatioCalculation.as_str(), "ratio_calculation");
	assert_eq!(QueryIntent::TrendAnalysis.as_str(), "trend_analysis");
}

#[test]
fn mixed_queries_pick_the_strongest_table() {
	// "compare" and "change" outscore the single lookup hit on "report".
	assert_eq!(
		QueryIntent::classify("Compare the change in the annual report"),
		QueryIntent::TrendAnalysis
	);
}
