use folio_domain::QueryIntent;
use folio_providers::chat::ChatMessage;

use crate::rank::Candidate;

/// Returned verbatim, with an empty citation list, when retrieval produced
/// nothing usable. A success result, not an error.
pub const NO_CONTEXT_ANSWER: &str = "I couldn't find any relevant information in your uploaded \
documents. Please upload financial documents first, or rephrase the question.";

const SOURCE_SEPARATOR: &str = "\n\n---\n\n";
const UNKNOWN_PAGE: &str = "unknown";

const BASE_INSTRUCTION: &str = "You are a financial analyst assistant answering questions about \
a user's uploaded financial documents.

Rules:
1. Answer ONLY from the provided context; if the answer is not in the context, say so instead of \
guessing.
2. Cite the concrete numbers, dates, and line items the context provides.
3. Use professional but plain language, and flag uncertainty when the context is ambiguous.
4. The documents are personal financial records; keep the tone confidential and factual.";

const RATIO_INSTRUCTION: &str = "\n\nThe user is asking for a financial ratio or metric. Show \
the formula and each input value taken from the context before stating the result.";

const TREND_INSTRUCTION: &str = "\n\nThe user is asking about a trend. Compare the relevant \
figures across the periods present in the context and state the direction and size of the \
change.";

/// The chunks that fit the budget, in ranked order, plus the rendered
/// context string.
#[derive(Clone, Debug)]
pub struct ContextWindow {
	pub text: String,
	pub used: Vec<Candidate>,
}

/// Concatenate source blocks in ranked order up to `max_context_chars`,
/// stopping before the first block that would overflow. Chunks are never
/// truncated mid-text, so a cited passage is always intact.
pub fn build_context(ranked: &[Candidate], max_context_chars: usize) -> ContextWindow {
	let mut text = String::new();
	let mut used = Vec::new();
	let mut total_chars = 0_usize;

	for (position, candidate) in ranked.iter().enumerate() {
		let block = format_source_block(position + 1, candidate);
		let block_chars = block.chars().count();
		let added_chars = if text.is_empty() {
			block_chars
		} else {
			block_chars + SOURCE_SEPARATOR.chars().count()
		};

		if total_chars + added_chars > max_context_chars {
			break;
		}
		if !text.is_empty() {
			text.push_str(SOURCE_SEPARATOR);
		}

		text.push_str(&block);

		total_chars += added_chars;

		used.push(candidate.clone());
	}

	ContextWindow { text, used }
}

pub fn system_instruction(intent: QueryIntent) -> String {
	match intent {
		QueryIntent::DocumentLookup => BASE_INSTRUCTION.to_string(),
		QueryIntent::RatioCalculation => format!("{BASE_INSTRUCTION}{RATIO_INSTRUCTION}"),
		QueryIntent::TrendAnalysis => format!("{BASE_INSTRUCTION}{TREND_INSTRUCTION}"),
	}
}

/// System instruction, prior turns for the session, then context + question
/// as the final user message.
pub fn build_messages(
	intent: QueryIntent,
	query: &str,
	context: &str,
	history: &[ChatMessage],
) -> Vec<ChatMessage> {
	let mut messages = Vec::with_capacity(history.len() + 2);

	messages.push(ChatMessage::new("system", system_instruction(intent)));
	messages.extend(history.iter().cloned());
	messages.push(ChatMessage::new(
		"user",
		format!(
			"Context from your documents:\n\n{context}\n\n---\n\nQuestion: {query}\n\nAnswer \
based on the context above."
		),
	));

	messages
}

fn format_source_block(position: usize, candidate: &Candidate) -> String {
	let page = candidate.page_label.as_deref().unwrap_or(UNKNOWN_PAGE);

	format!(
		"[Source {position}] (Relevance: {:.2}, Page: {page})\n{}",
		candidate.similarity, candidate.text
	)
}
