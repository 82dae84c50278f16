use serde::{Deserialize, Serialize};

/// Closed set of query intents the answer pipeline dispatches over.
///
/// Classification is a keyword-table score; the intent only selects the
/// system instruction flavor, so a misclassification degrades tone, not
/// correctness.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
	DocumentLookup,
	RatioCalculation,
	TrendAnalysis,
}

const DOCUMENT_LOOKUP_KEYWORDS: &[&str] = &[
	"find",
	"search",
	"locate",
	"extract",
	"show",
	"display",
	"document",
	"report",
	"statement",
	"balance sheet",
	"income",
];

const RATIO_CALCULATION_KEYWORDS: &[&str] = &[
	"calculate",
	"ratio",
	"metric",
	"roa",
	"roe",
	"liquidity",
	"profitability",
	"leverage",
	"debt",
	"equity",
	"margin",
];

const TREND_ANALYSIS_KEYWORDS: &[&str] = &[
	"trend",
	"growth",
	"change",
	"compare",
	"variance",
	"increase",
	"decrease",
	"over time",
	"yoy",
	"qoq",
	"seasonal",
];

impl QueryIntent {
	pub fn as_str(self) -> &'static str {
		match self {
			QueryIntent::DocumentLookup => "document_lookup",
			QueryIntent::RatioCalculation => "ratio_calculation",
			QueryIntent::TrendAnalysis => "trend_analysis",
		}
	}

	/// Pick the intent whose keyword table matches the query most often.
	///
	/// Ties and zero hits fall back to `DocumentLookup`, so lookup wins for
	/// generic questions.
	pub fn classify(query: &str) -> Self {
		let lowered = query.to_lowercase();
		let table: [(QueryIntent, &[&str]); 3] = [
			(QueryIntent::DocumentLookup, DOCUMENT_LOOKUP_KEYWORDS),
			(QueryIntent::RatioCalculation, RATIO_CALCULATION_KEYWORDS),
			(QueryIntent::TrendAnalysis, TREND_ANALYSIS_KEYWORDS),
		];
		let mut best = QueryIntent::DocumentLookup;
		let mut best_score = 0_usize;

		for (intent, keywords) in table {
			let score = keywords.iter().filter(|keyword| lowered.contains(*keyword)).count();

			if score > best_score {
				best = intent;
				best_score = score;
			}
		}

		best
	}
}
