//! Frame rendering for non-final flushes.

/// Blink phase driven by flushes rather than wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct CursorBlink {
    on: bool,
}

impl CursorBlink {
    /// Toggle and return the new phase. The first call returns `true`.
    pub(crate) fn advance(&mut self) -> bool {
        self.on = !self.on;
        self.on
    }
}

/// A rendered payload together with the snapshot generation it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Frame {
    pub(crate) payload: String,
    pub(crate) generation: u64,
}

impl Frame {
    pub(crate) fn render(head: &str, cursor: &str, show_cursor: bool, generation: u64) -> Self {
        let mut payload = String::with_capacity(head.len() + cursor.len());
        payload.push_str(head);
        if show_cursor {
            payload.push_str(cursor);
        }
        Self {
            payload,
            generation,
        }
    }

    /// Whether transmitting this frame would change what the chat shows.
    pub(crate) fn differs_from(&self, sent: Option<&Frame>) -> bool {
        sent.is_none_or(|sent| sent.payload != self.payload)
    }
}
