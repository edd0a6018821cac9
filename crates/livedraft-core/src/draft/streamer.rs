//! Draft Streamer - shows a growing text as one live-edited chat message.
//!
//! Each streamer owns a background task that exclusively holds the draft
//! state (draft message, last sent frame, blink phase, throttle deadline).
//! The [`DraftStreamer`] handle talks to it through a command queue, except
//! for the latest snapshot which is written in place so a flush always
//! renders the newest text ("latest wins").

use futures::{Stream, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::DraftConfig;
use super::render::{CursorBlink, Frame};
use crate::channel::{
    Chunk, Chunker, DraftTransport, MarkdownChunker, MessageHandle, SendOptions,
};
use crate::error::{DraftError, Result, TransportError};

/// Lifecycle of a draft stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// No draft message exists yet
    Idle,
    /// A draft message exists and receives throttled edits
    Streaming,
    /// Final chunks are being published
    Finalizing,
    /// Terminal; no further network calls
    Stopped,
}

#[derive(Debug, Default)]
struct Snapshot {
    text: String,
    generation: u64,
}

enum DraftCommand {
    /// A snapshot was stored; arm the throttle deadline if none is pending.
    Schedule,
    Flush(oneshot::Sender<()>),
    Finalize {
        text: String,
        extra: SendOptions,
        reply: oneshot::Sender<Result<Vec<MessageHandle>>>,
    },
    Stop,
}

/// Handle to a live draft stream for one response.
///
/// Cloning the handle is cheap; the background task ends after
/// [`finalize`](Self::finalize), [`stop`](Self::stop), or once every handle
/// is dropped. Must be created inside a tokio runtime.
#[derive(Clone)]
pub struct DraftStreamer {
    chat_id: Arc<str>,
    command_tx: mpsc::UnboundedSender<DraftCommand>,
    latest: Arc<Mutex<Snapshot>>,
    closed: Arc<AtomicBool>,
    /// Cancelled only by `stop()`; finalize closes the stream without it.
    abandon: CancellationToken,
    phase_rx: watch::Receiver<DraftPhase>,
}

impl DraftStreamer {
    /// Create a streamer using the default Markdown chunker.
    pub fn new(
        chat_id: impl Into<String>,
        transport: Arc<dyn DraftTransport>,
        config: DraftConfig,
    ) -> Self {
        Self::with_chunker(
            chat_id,
            transport,
            Arc::new(MarkdownChunker::default()),
            config,
        )
    }

    /// Create a streamer with a custom chunker.
    pub fn with_chunker(
        chat_id: impl Into<String>,
        transport: Arc<dyn DraftTransport>,
        chunker: Arc<dyn Chunker>,
        config: DraftConfig,
    ) -> Self {
        let chat_id: String = chat_id.into();
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (phase_tx, phase_rx) = watch::channel(DraftPhase::Idle);
        let latest = Arc::new(Mutex::new(Snapshot::default()));
        let closed = Arc::new(AtomicBool::new(false));
        let abandon = CancellationToken::new();

        let engine = DraftEngine {
            chat_id: chat_id.clone(),
            transport,
            chunker,
            config,
            latest: latest.clone(),
            closed: closed.clone(),
            abandon: abandon.clone(),
            phase_tx,
            draft: None,
            last_sent: None,
            rendered_generation: 0,
            last_flush_at: None,
            blink: CursorBlink::default(),
            deadline: None,
        };
        tokio::spawn(engine.run_loop(command_rx));

        Self {
            chat_id: chat_id.into(),
            command_tx,
            latest,
            closed,
            abandon,
            phase_rx,
        }
    }

    pub fn chat_id(&self) -> &str {
        &self.chat_id
    }

    /// Current lifecycle phase as observed by the engine task.
    pub fn phase(&self) -> DraftPhase {
        *self.phase_rx.borrow()
    }

    /// Whether the stream stopped accepting input (stopped or finalizing).
    pub fn is_stopped(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Number of snapshots accepted so far.
    pub fn generation(&self) -> u64 {
        self.latest.lock().generation
    }

    /// Store a new snapshot and schedule a throttled flush.
    ///
    /// Never blocks and never fails; a no-op once the stream is stopped.
    pub fn update(&self, text: impl Into<String>) {
        {
            let mut latest = self.latest.lock();
            if self.closed.load(Ordering::SeqCst) {
                return;
            }
            latest.text = text.into();
            latest.generation += 1;
        }
        let _ = self.command_tx.send(DraftCommand::Schedule);
    }

    /// Run one render/transmit cycle now, bypassing the throttle deadline.
    pub async fn flush(&self) {
        if self.is_stopped() {
            return;
        }
        let (done_tx, done_rx) = oneshot::channel();
        if self.command_tx.send(DraftCommand::Flush(done_tx)).is_err() {
            return;
        }
        let _ = done_rx.await;
    }

    /// Publish the final text and end the stream.
    ///
    /// The draft message receives the first chunk without cursor (with
    /// `extra` merged into its options); every further chunk becomes a new
    /// message, sent one after another. Returns the handles in chat order.
    /// A failure while sending overflow chunks aborts the remaining ones
    /// and is returned.
    pub async fn finalize(
        &self,
        text: impl Into<String>,
        extra: SendOptions,
    ) -> Result<Vec<MessageHandle>> {
        let text = text.into();
        {
            let mut latest = self.latest.lock();
            if self.closed.swap(true, Ordering::SeqCst) {
                return Err(DraftError::Stopped);
            }
            latest.text = text.clone();
            latest.generation += 1;
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.command_tx
            .send(DraftCommand::Finalize {
                text,
                extra,
                reply: reply_tx,
            })
            .map_err(|_| DraftError::EngineGone)?;
        reply_rx.await.map_err(|_| DraftError::EngineGone)?
    }

    /// Abandon the stream without publishing final content. Idempotent.
    ///
    /// A flush already waiting on the transport is dropped, so no call is
    /// issued or completed on behalf of the stream afterwards.
    pub fn stop(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!(chat_id = %self.chat_id, "Stopping draft stream");
        self.abandon.cancel();
        let _ = self.command_tx.send(DraftCommand::Stop);
    }

    /// Forward every snapshot of `snapshots` to [`update`](Self::update).
    ///
    /// Returns the number of snapshots forwarded; stops early once the
    /// stream is stopped.
    pub async fn pump<S>(&self, snapshots: S) -> usize
    where
        S: Stream<Item = String>,
    {
        let mut snapshots = std::pin::pin!(snapshots);
        let mut forwarded = 0;
        while let Some(snapshot) = snapshots.next().await {
            if self.is_stopped() {
                break;
            }
            self.update(snapshot);
            forwarded += 1;
        }
        forwarded
    }
}

/// State owned by the background task of one draft stream.
struct DraftEngine {
    chat_id: String,
    transport: Arc<dyn DraftTransport>,
    chunker: Arc<dyn Chunker>,
    config: DraftConfig,
    latest: Arc<Mutex<Snapshot>>,
    closed: Arc<AtomicBool>,
    abandon: CancellationToken,
    phase_tx: watch::Sender<DraftPhase>,
    draft: Option<MessageHandle>,
    last_sent: Option<Frame>,
    /// Generation read by the most recent flush.
    rendered_generation: u64,
    last_flush_at: Option<Instant>,
    blink: CursorBlink,
    deadline: Option<Instant>,
}

impl DraftEngine {
    async fn run_loop(mut self, mut command_rx: mpsc::UnboundedReceiver<DraftCommand>) {
        debug!(
            chat_id = %self.chat_id,
            interval_ms = self.config.edit_interval_ms,
            "Draft engine started"
        );

        loop {
            let deadline = self.deadline;
            tokio::select! {
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.flush_once().await;
                }
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(DraftCommand::Schedule) => self.schedule(),
                        Some(DraftCommand::Flush(done)) => {
                            self.deadline = None;
                            self.flush_once().await;
                            let _ = done.send(());
                        }
                        Some(DraftCommand::Finalize { text, extra, reply }) => {
                            let result = self.finalize(text, extra).await;
                            self.set_phase(DraftPhase::Stopped);
                            let _ = reply.send(result);
                            break;
                        }
                        Some(DraftCommand::Stop) => {
                            info!(chat_id = %self.chat_id, "Draft stream stopped");
                            break;
                        }
                        None => {
                            debug!(chat_id = %self.chat_id, "All draft handles dropped");
                            break;
                        }
                    }
                }
            }
        }

        self.deadline = None;
        self.set_phase(DraftPhase::Stopped);
    }

    fn set_phase(&self, phase: DraftPhase) {
        self.phase_tx.send_replace(phase);
    }

    /// Arm the trailing-edge deadline for the newest snapshot.
    fn schedule(&mut self) {
        if self.closed.load(Ordering::SeqCst) || self.deadline.is_some() {
            return;
        }
        // Already rendered by a flush that ran after this update was stored.
        if self.latest.lock().generation <= self.rendered_generation {
            return;
        }

        let now = Instant::now();
        let wait = match self.last_flush_at {
            Some(last) => self
                .config
                .edit_interval()
                .saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        };
        self.deadline = Some(now + wait);
        debug!(chat_id = %self.chat_id, wait_ms = wait.as_millis() as u64, "Draft flush scheduled");
    }

    /// One non-final render/transmit cycle. Never propagates errors.
    async fn flush_once(&mut self) {
        if self.closed.load(Ordering::SeqCst) {
            return;
        }

        let (text, generation) = {
            let latest = self.latest.lock();
            (latest.text.clone(), latest.generation)
        };
        self.rendered_generation = generation;
        self.last_flush_at = Some(Instant::now());
        let show_cursor = self.blink.advance();

        let chunks = self.chunker.chunk(&text);
        let Some(head) = chunks.first() else {
            debug!(chat_id = %self.chat_id, generation, "Nothing to render yet");
            return;
        };

        let frame = Frame::render(&head.markup, &self.config.cursor, show_cursor, generation);
        if !frame.differs_from(self.last_sent.as_ref()) {
            debug!(chat_id = %self.chat_id, generation, "Draft unchanged, skipping edit");
            return;
        }

        let abandon = self.abandon.clone();
        let send_options = SendOptions::default();
        let result = tokio::select! {
            result = self.transmit(&frame.payload, &send_options) => result,
            _ = abandon.cancelled() => {
                debug!(chat_id = %self.chat_id, generation, "Draft stopped mid-flush, call dropped");
                return;
            }
        };

        match result {
            Ok(handle) => {
                debug!(
                    chat_id = %self.chat_id,
                    message_id = %handle.id,
                    generation = frame.generation,
                    "Draft flushed"
                );
                self.last_sent = Some(frame);
            }
            Err(e) => {
                error!(
                    chat_id = %self.chat_id,
                    error = %e,
                    "Draft flush failed, retrying on next flush"
                );
            }
        }
    }

    /// Show `payload` in the draft, creating or replacing the draft message
    /// as needed.
    async fn transmit(
        &mut self,
        payload: &str,
        extra: &SendOptions,
    ) -> std::result::Result<MessageHandle, TransportError> {
        let Some(draft) = self.draft.clone() else {
            return self.acquire_draft(payload, extra).await;
        };

        let options = self.config.edit_options().merged(extra);
        match self
            .transport
            .edit_message(&self.chat_id, &draft.id, payload, &options)
            .await
        {
            Ok(handle) => {
                self.draft = Some(handle.clone());
                Ok(handle)
            }
            Err(e) if e.is_not_modified() => {
                debug!(chat_id = %self.chat_id, message_id = %draft.id, "Draft content already current");
                let handle = MessageHandle::new(draft.id, payload);
                self.draft = Some(handle.clone());
                Ok(handle)
            }
            Err(e) if self.abandon.is_cancelled() => Err(e),
            Err(e) => {
                warn!(
                    chat_id = %self.chat_id,
                    message_id = %draft.id,
                    error = %e,
                    "Draft edit failed, falling back to a new message"
                );
                self.draft = None;
                self.acquire_draft(payload, extra).await
            }
        }
    }

    async fn acquire_draft(
        &mut self,
        content: &str,
        extra: &SendOptions,
    ) -> std::result::Result<MessageHandle, TransportError> {
        let options = self.config.draft_create_options().merged(extra);
        let handle = self
            .transport
            .create_message(&self.chat_id, content, &options)
            .await?;
        debug!(chat_id = %self.chat_id, message_id = %handle.id, "Draft message acquired");

        self.draft = Some(handle.clone());
        self.phase_tx.send_if_modified(|phase| {
            if *phase == DraftPhase::Idle {
                *phase = DraftPhase::Streaming;
                true
            } else {
                false
            }
        });
        Ok(handle)
    }

    async fn finalize(&mut self, text: String, extra: SendOptions) -> Result<Vec<MessageHandle>> {
        self.deadline = None;
        self.set_phase(DraftPhase::Finalizing);

        let chunks = self.chunker.chunk(&text);
        if chunks.is_empty() {
            info!(chat_id = %self.chat_id, "Final text is empty, nothing to publish");
            return Ok(Vec::new());
        }

        let handles = self.publish(&chunks, &extra).await?;
        info!(
            chat_id = %self.chat_id,
            messages = handles.len(),
            "Draft finalized"
        );
        Ok(handles)
    }

    async fn publish(
        &mut self,
        chunks: &[Chunk],
        extra: &SendOptions,
    ) -> Result<Vec<MessageHandle>> {
        let Some((head, tail)) = chunks.split_first() else {
            return Ok(Vec::new());
        };

        if self.draft.is_none() {
            let placeholder = self.config.placeholder_text().to_string();
            self.acquire_draft(&placeholder, &SendOptions::default())
                .await?;
        }

        let mut handles = Vec::with_capacity(chunks.len());
        handles.push(self.transmit(&head.markup, extra).await?);

        let overflow_options = self.config.edit_options();
        for (index, chunk) in tail.iter().enumerate() {
            debug!(
                chat_id = %self.chat_id,
                chunk = index + 2,
                total = chunks.len(),
                "Sending overflow chunk"
            );
            let handle = self
                .transport
                .create_message(&self.chat_id, &chunk.markup, &overflow_options)
                .await?;
            handles.push(handle);
        }

        Ok(handles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::mock::MockTransport;
    use tokio::time::sleep;

    fn streamer(transport: &Arc<MockTransport>, config: DraftConfig) -> DraftStreamer {
        DraftStreamer::new("chat-1", transport.clone(), config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_initial_phase_is_idle() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());
        assert_eq!(draft.phase(), DraftPhase::Idle);
        assert!(!draft.is_stopped());
        assert_eq!(draft.chat_id(), "chat-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_update_creates_draft_with_cursor() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());

        draft.update("Hello");
        sleep(Duration::from_millis(10)).await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].is_create());
        assert_eq!(calls[0].content(), "Hello▌");
        assert_eq!(draft.phase(), DraftPhase::Streaming);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reply_to_applies_to_draft_creation() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::new().with_reply_to("500"));

        draft.update("Hi");
        sleep(Duration::from_millis(10)).await;
        draft.update("Hi there");
        sleep(Duration::from_millis(2100)).await;

        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].options().reply_to.as_deref(), Some("500"));
        assert_eq!(calls[1].options().reply_to, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_snapshot_sends_nothing() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());

        draft.update("   ");
        sleep(Duration::from_millis(10)).await;
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_flush_skips_identical_payload() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::new().with_cursor(""));

        draft.update("Hello");
        draft.flush().await;
        draft.update("Hello");
        draft.flush().await;

        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_after_stop_is_noop() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());

        draft.update("Hello");
        draft.stop();
        draft.flush().await;
        sleep(Duration::from_secs(5)).await;

        assert_eq!(transport.call_count(), 0);
        assert!(draft.is_stopped());
        assert_eq!(draft.phase(), DraftPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());

        draft.stop();
        draft.stop();
        sleep(Duration::from_millis(10)).await;
        assert_eq!(draft.phase(), DraftPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_modified_edit_is_swallowed() {
        let transport = Arc::new(MockTransport::new());
        transport.fail_edit(1, TransportError::NotModified);
        let draft = streamer(&transport, DraftConfig::default());

        draft.update("A");
        sleep(Duration::from_millis(10)).await;
        draft.update("AB");
        sleep(Duration::from_millis(2100)).await;
        draft.update("ABC");
        sleep(Duration::from_millis(2100)).await;

        assert_eq!(transport.creates().len(), 1);
        let edits = transport.edits();
        assert_eq!(edits.len(), 2);
        for edit in edits {
            match edit {
                crate::channel::mock::TransportCall::Edit { message_id, .. } => {
                    assert_eq!(message_id, "1")
                }
                other => panic!("expected edit, got {:?}", other),
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_finalize_twice_is_rejected() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());

        let first = draft.finalize("Done", SendOptions::default()).await.unwrap();
        assert_eq!(first.len(), 1);

        let second = draft.finalize("Again", SendOptions::default()).await;
        assert!(matches!(second, Err(DraftError::Stopped)));
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_after_finalize_are_ignored() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());

        draft.finalize("Done", SendOptions::default()).await.unwrap();
        let generation = draft.generation();
        draft.update("late");
        sleep(Duration::from_secs(5)).await;

        assert_eq!(draft.generation(), generation);
        assert_eq!(transport.call_count(), 2);
        assert_eq!(draft.phase(), DraftPhase::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handles_ends_engine() {
        let transport = Arc::new(MockTransport::new());
        let draft = streamer(&transport, DraftConfig::default());
        let phase_rx = draft.phase_rx.clone();

        drop(draft);
        sleep(Duration::from_millis(10)).await;
        assert_eq!(*phase_rx.borrow(), DraftPhase::Stopped);
    }
}
