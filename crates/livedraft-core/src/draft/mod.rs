//! Draft streaming engine.
//!
//! A [`DraftStreamer`] turns a sequence of growing text snapshots into one
//! chat message that is edited in place at most once per edit interval,
//! with a blinking cursor while the text is still arriving. On
//! [`finalize`](DraftStreamer::finalize) the final text is chunked; the
//! first chunk replaces the draft and the rest follow as new messages.
//!
//! # Usage
//!
//! ```ignore
//! use livedraft_core::channel::{SendOptions, TelegramTransport};
//! use livedraft_core::draft::{DraftConfig, DraftStreamer};
//!
//! let transport = Arc::new(TelegramTransport::with_token(token));
//! let draft = DraftStreamer::new("123456", transport, DraftConfig::default());
//!
//! while let Some(snapshot) = producer.next().await {
//!     draft.update(snapshot);
//! }
//! let messages = draft.finalize(final_text, SendOptions::default()).await?;
//! ```

mod config;
mod render;
mod streamer;

pub use config::{DEFAULT_CURSOR, DEFAULT_EDIT_INTERVAL_MS, DraftConfig};
pub use streamer::{DraftPhase, DraftStreamer};
