pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid chunking configuration: {message}")]
	InvalidConfiguration { message: String },
}

#[derive(Clone, Copy, Debug)]
pub struct ChunkingConfig {
	pub window_chars: u32,
	pub overlap_chars: u32,
}

/// A page (or sheet/section) boundary reported by the document converter.
/// `start_offset` is a byte offset into the extracted text.
#[derive(Clone, Debug)]
pub struct PageBoundary {
	pub label: String,
	pub start_offset: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
	pub chunk_index: i32,
	pub start_offset: usize,
	pub end_offset: usize,
	pub text: String,
	pub page_label: Option<String>,
}

/// Lazy window walk over the text. Cloning restarts iteration from the
/// beginning, so one `split_text` call can feed several passes.
#[derive(Clone, Debug)]
pub struct Chunks<'a> {
	text: &'a str,
	pages: &'a [PageBoundary],
	window_chars: usize,
	stride_chars: usize,
	next_start: usize,
	next_index: i32,
	done: bool,
}

/// Split `text` into overlapping windows of `cfg.window_chars` characters,
/// stepping by `window_chars - overlap_chars`.
///
/// Windows cover the text with no gaps, consecutive windows share an
/// overlap-sized tail/head, and the final window may be shorter. Text
/// shorter than one window yields exactly one chunk; empty text yields no
/// chunks. Chunk text is taken verbatim, so stitching the unique spans back
/// together reproduces the input exactly.
pub fn split_text<'a>(
	text: &'a str,
	cfg: &ChunkingConfig,
	pages: &'a [PageBoundary],
) -> Result<Chunks<'a>> {
	if cfg.window_chars == 0 {
		return Err(Error::InvalidConfiguration {
			message: "window_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.overlap_chars >= cfg.window_chars {
		return Err(Error::InvalidConfiguration {
			message: "overlap_chars must be less than window_chars.".to_string(),
		});
	}

	Ok(Chunks {
		text,
		pages,
		window_chars: cfg.window_chars as usize,
		stride_chars: (cfg.window_chars - cfg.overlap_chars) as usize,
		next_start: 0,
		next_index: 0,
		done: text.is_empty(),
	})
}

impl Iterator for Chunks<'_> {
	type Item = Chunk;

	fn next(&mut self) -> Option<Chunk> {
		if self.done {
			return None;
		}

		let start = self.next_start;
		let end = advance_chars(self.text, start, self.window_chars);
		let chunk = Chunk {
			chunk_index: self.next_index,
			start_offset: start,
			end_offset: end,
			text: self.text[start..end].to_string(),
			page_label: page_label_at(self.pages, start),
		};

		self.next_index += 1;

		if end >= self.text.len() {
			self.done = true;
		} else {
			self.next_start = advance_chars(self.text, start, self.stride_chars);
		}

		Some(chunk)
	}
}

/// Byte offset reached by stepping `count` characters forward from `from`.
fn advance_chars(text: &str, from: usize, count: usize) -> usize {
	text[from..].char_indices().nth(count).map(|(offset, _)| from + offset).unwrap_or(text.len())
}

/// Label of the page containing `offset`: the last boundary at or before it.
/// Boundaries are expected in ascending offset order.
fn page_label_at(pages: &[PageBoundary], offset: usize) -> Option<String> {
	pages
		.iter()
		.rev()
		.find(|page| page.start_offset <= offset)
		.map(|page| page.label.clone())
}
