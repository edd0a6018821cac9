//! Sentence Stream Simulator - replays a finished text as growing snapshots.
//!
//! Used to drive a [`DraftStreamer`](crate::draft::DraftStreamer) without a
//! live producer: the text is cut after each sentence (or newline run) and
//! the running prefix is emitted piece by piece.

use futures::Stream;
use tokio::time::{Duration, sleep};
use tracing::debug;

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Lazy iterator over the sentence pieces of a text.
///
/// Cloning restarts iteration from the current position, so a fresh call
/// to [`split_into_sentence_chunks`] (or a clone taken up front) replays
/// the whole sequence.
#[derive(Debug, Clone)]
pub struct SentenceChunks<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SentenceChunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }
        let end = sentence_end(self.rest);
        let (piece, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(piece)
    }
}

/// Split `text` after sentence terminators (`.`, `!`, `?`) that are
/// followed by whitespace or the end of text, and after newline runs.
///
/// A terminator directly followed by another character is not a boundary,
/// so decimals (`3.14`), abbreviations glued to a word (`e.g.x`) and dotted
/// names (`v1.2.3`) stay inside their sentence. Runs such as `?!` or `...`
/// count as a single terminator.
///
/// Trailing punctuation and whitespace stay with their piece, so the pieces
/// concatenate back to `text`. Blank input yields nothing.
pub fn split_into_sentence_chunks(text: &str) -> SentenceChunks<'_> {
    let rest = if text.trim().is_empty() { "" } else { text };
    SentenceChunks { rest }
}

/// Byte offset where the first piece of `text` ends.
fn sentence_end(text: &str) -> usize {
    let mut chars = text.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if ch == '\n' {
            return skip_whitespace(text, index);
        }
        if !TERMINATORS.contains(&ch) {
            continue;
        }

        let mut end = index + ch.len_utf8();
        while let Some(&(next_index, next)) = chars.peek() {
            if !TERMINATORS.contains(&next) {
                break;
            }
            end = next_index + next.len_utf8();
            chars.next();
        }

        match chars.peek() {
            None => return end,
            Some(&(_, next)) if next.is_whitespace() => return skip_whitespace(text, end),
            // "3.14", "e.g." mid-word: not a sentence boundary
            Some(_) => {}
        }
    }

    text.len()
}

fn skip_whitespace(text: &str, from: usize) -> usize {
    let tail = &text[from..];
    from + (tail.len() - tail.trim_start().len())
}

/// Replay `text` sentence by sentence, calling `on_snapshot` with the
/// accumulated prefix after each piece and sleeping `delay` in between.
///
/// Returns the number of snapshots emitted.
pub async fn simulate_sentence_stream<F>(
    text: &str,
    mut on_snapshot: F,
    delay: Option<Duration>,
) -> usize
where
    F: FnMut(&str),
{
    let mut prefix = String::with_capacity(text.len());
    let mut emitted = 0;

    for piece in split_into_sentence_chunks(text) {
        if emitted > 0
            && let Some(delay) = delay
        {
            sleep(delay).await;
        }
        prefix.push_str(piece);
        on_snapshot(&prefix);
        emitted += 1;
    }

    debug!(snapshots = emitted, "Sentence stream finished");
    emitted
}

/// Stream form of [`simulate_sentence_stream`], suitable for
/// [`DraftStreamer::pump`](crate::draft::DraftStreamer::pump).
pub fn sentence_snapshots(
    text: &str,
    delay: Option<Duration>,
) -> impl Stream<Item = String> + '_ {
    let pieces = split_into_sentence_chunks(text);
    futures::stream::unfold(
        (pieces, String::new(), true),
        move |(mut pieces, mut prefix, first)| async move {
            let piece = pieces.next()?;
            if !first && let Some(delay) = delay {
                sleep(delay).await;
            }
            prefix.push_str(piece);
            let snapshot = prefix.clone();
            Some((snapshot, (pieces, prefix, false)))
        },
    )
}
