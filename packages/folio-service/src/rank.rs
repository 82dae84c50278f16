use std::collections::{HashMap, HashSet, hash_map::Entry};

use uuid::Uuid;

/// A retrieval candidate, from the vector search or the optional keyword
/// filter, ready for merging.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate {
	pub chunk_id: Uuid,
	pub doc_id: Uuid,
	pub chunk_index: i32,
	pub filename: String,
	pub page_label: Option<String>,
	pub text: String,
	pub similarity: f32,
}

/// Merge candidate lists: collapse duplicate chunk ids keeping the highest
/// similarity, order by similarity descending (ties by chunk ordinal, then
/// chunk id), and cap at `top_k`. Pure; deterministic for identical inputs.
pub fn merge_candidates(lists: Vec<Vec<Candidate>>, top_k: usize) -> Vec<Candidate> {
	let mut best: HashMap<Uuid, Candidate> = HashMap::new();

	for candidate in lists.into_iter().flatten() {
		match best.entry(candidate.chunk_id) {
			Entry::Occupied(mut occupied) =>
				if candidate.similarity > occupied.get().similarity {
					occupied.insert(candidate);
				},
			Entry::Vacant(vacant) => {
				vacant.insert(candidate);
			},
		}
	}

	let mut merged: Vec<Candidate> = best.into_values().collect();

	merged.sort_by(|a, b| {
		b.similarity
			.total_cmp(&a.similarity)
			.then_with(|| a.chunk_index.cmp(&b.chunk_index))
			.then_with(|| a.chunk_id.cmp(&b.chunk_id))
	});
	merged.truncate(top_k);

	merged
}

/// Fraction of distinct query terms (3+ characters) present in `text`,
/// case-insensitively. Scores the keyword candidate source.
pub fn lexical_score(query: &str, text: &str) -> f32 {
	let terms = query_terms(query);

	if terms.is_empty() {
		return 0.0;
	}

	let lowered = text.to_lowercase();
	let matched = terms.iter().filter(|term| lowered.contains(term.as_str())).count();

	matched as f32 / terms.len() as f32
}

/// Distinct lowercased query terms worth matching on; short connectives are
/// skipped.
pub fn query_terms(query: &str) -> Vec<String> {
	let mut seen = HashSet::new();
	let mut terms = Vec::new();

	for raw in query.split_whitespace() {
		let term: String = raw
			.chars()
			.filter(|c| c.is_alphanumeric())
			.collect::<String>()
			.to_lowercase();

		if term.len() < 3 {
			continue;
		}
		if seen.insert(term.clone()) {
			terms.push(term);
		}
	}

	terms
}
