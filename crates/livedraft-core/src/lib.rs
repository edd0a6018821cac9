//! LiveDraft core: throttled live-draft message streaming.
//!
//! - [`channel`]: transport trait, Telegram/console transports, chunker
//! - [`draft`]: the draft streaming engine
//! - [`simulate`]: sentence splitter and stream simulator for demos and tests

pub mod channel;
pub mod draft;
pub mod error;
pub mod simulate;

pub use channel::{Chunk, Chunker, DraftTransport, MessageHandle, ParseMode, SendOptions};
pub use draft::{DraftConfig, DraftPhase, DraftStreamer};
pub use error::{DraftError, Result, TransportError};
