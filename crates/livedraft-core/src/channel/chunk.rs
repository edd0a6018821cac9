//! Markdown-aware message chunking.
//!
//! Chat backends cap the size of a single message (Telegram: 4096 characters).
//! This module splits a text snapshot into ordered chunks at safe boundaries
//! while preserving fenced code block state, so a fence is never left open
//! at the end of a chunk.

/// Telegram hard limit for text messages.
pub const TELEGRAM_MAX_LEN: usize = 4096;

/// Default split threshold (leaves headroom for the cursor glyph and fence
/// re-opening markup).
pub const DEFAULT_MAX_LEN: usize = 4000;

const FENCE: &str = "```";
const FENCE_CLOSE: &str = "\n```";

/// One render-ready piece of a text snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Markup to send as message content
    pub markup: String,
    /// Size of `markup` in characters
    pub size: usize,
}

impl Chunk {
    pub fn new(markup: impl Into<String>) -> Self {
        let markup = markup.into();
        let size = markup.chars().count();
        Self { markup, size }
    }
}

/// Maps a full text snapshot to ordered, size-bounded chunks.
///
/// Implementations must be pure: the same input yields the same chunks.
pub trait Chunker: Send + Sync {
    fn chunk(&self, text: &str) -> Vec<Chunk>;
}

impl<F> Chunker for F
where
    F: Fn(&str) -> Vec<Chunk> + Send + Sync,
{
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        self(text)
    }
}

/// Chunker that splits Markdown at paragraph/line boundaries and keeps
/// fenced code blocks balanced in every chunk.
#[derive(Debug, Clone, Copy)]
pub struct MarkdownChunker {
    max_len: usize,
}

impl MarkdownChunker {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for MarkdownChunker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

impl Chunker for MarkdownChunker {
    fn chunk(&self, text: &str) -> Vec<Chunk> {
        chunk_markdown(text, Some(self.max_len))
            .into_iter()
            .map(Chunk::new)
            .collect()
    }
}

/// Split `text` into chunks of at most `max_len` characters that respect
/// Markdown fenced code blocks.
///
/// Rules:
/// 1. Blank input yields no chunks.
/// 2. Prefer splitting at paragraph boundaries (`\n\n`).
/// 3. Fall back to line boundaries (`\n`), then hard cut.
/// 4. When a split occurs inside a fence, the current chunk gets a closing
///    `` ``` `` and the next chunk gets an opening `` ```lang ``.
pub fn chunk_markdown(text: &str, max_len: Option<usize>) -> Vec<String> {
    let limit = max_len.unwrap_or(DEFAULT_MAX_LEN).max(1);

    if text.trim().is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut remaining = text;
    let mut fence = FenceState::default();

    while !remaining.is_empty() {
        let opener = fence.opener();
        let opener_len = opener.chars().count();
        let budget = limit.saturating_sub(opener_len).max(1);

        if remaining.chars().count() <= budget {
            chunks.push(format!("{}{}", opener, remaining));
            break;
        }

        let mut split_at = find_split_point(remaining, budget);
        let mut end_state = fence.scan(&remaining[..split_at]);

        // Ending inside a fence costs extra characters for the close marker.
        if end_state.open {
            let reduced = budget.saturating_sub(FENCE_CLOSE.len()).max(1);
            split_at = find_split_point(remaining, reduced);
            end_state = fence.scan(&remaining[..split_at]);
        }

        let mut chunk = format!("{}{}", opener, &remaining[..split_at]);
        if end_state.open {
            chunk.push_str(FENCE_CLOSE);
        }
        chunks.push(chunk);

        remaining = skip_leading_newlines(&remaining[split_at..]);
        fence = end_state;
    }

    chunks
}

/// Byte offset just past the first `max_chars` characters of `text`.
fn char_boundary(text: &str, max_chars: usize) -> usize {
    text.char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

/// Find the best byte offset to split `text` within `max_chars` characters.
fn find_split_point(text: &str, max_chars: usize) -> usize {
    let window_end = char_boundary(text, max_chars);
    let window = &text[..window_end];

    if let Some(pos) = window.rfind("\n\n")
        && pos > 0
    {
        return pos;
    }

    if let Some(pos) = window.rfind('\n')
        && pos > 0
    {
        return pos;
    }

    window_end
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct FenceState {
    open: bool,
    lang: Option<String>,
}

impl FenceState {
    /// Markup that reopens this fence at the start of a chunk.
    fn opener(&self) -> String {
        match (&self.open, &self.lang) {
            (false, _) => String::new(),
            (true, Some(lang)) => format!("{}{}\n", FENCE, lang),
            (true, None) => format!("{}\n", FENCE),
        }
    }

    /// Fence state after processing all lines of `text`.
    fn scan(&self, text: &str) -> FenceState {
        let mut state = self.clone();

        for line in text.lines() {
            let Some(after) = line.trim_start().strip_prefix(FENCE) else {
                continue;
            };
            if state.open {
                state.open = false;
                state.lang = None;
            } else {
                state.open = true;
                state.lang = after.split_whitespace().next().map(str::to_string);
            }
        }

        state
    }
}

fn skip_leading_newlines(s: &str) -> &str {
    s.trim_start_matches(['\n', '\r'])
}
