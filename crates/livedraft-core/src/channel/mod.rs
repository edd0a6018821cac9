//! Chat Transport Layer
//!
//! Everything the draft engine needs from a chat backend: the narrow
//! [`DraftTransport`] trait, message/option types, and the chunker that turns
//! a text snapshot into size-bounded messages.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            DraftStreamer                │
//! │  - throttled edits of one draft message │
//! └─────────────────────────────────────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌──────────────────┐  ┌──────────────────────┐
//! │  trait Chunker   │  │ trait DraftTransport │
//! │  - chunk(text)   │  │  - create_message    │
//! └──────────────────┘  │  - edit_message      │
//!                       └──────────────────────┘
//!                                  │
//!                        ┌─────────┼─────────┐
//!                        ▼         ▼         ▼
//!                    Telegram   Console    Mock
//! ```
//!
//! ## Implementing a Transport
//!
//! ```ignore
//! use livedraft_core::channel::{DraftTransport, MessageHandle, SendOptions};
//! use livedraft_core::error::TransportError;
//!
//! struct MyTransport;
//!
//! #[async_trait]
//! impl DraftTransport for MyTransport {
//!     async fn create_message(&self, chat_id: &str, content: &str, options: &SendOptions)
//!         -> Result<MessageHandle, TransportError> { /* ... */ }
//!
//!     async fn edit_message(&self, chat_id: &str, message_id: &str, content: &str,
//!         options: &SendOptions) -> Result<MessageHandle, TransportError> { /* ... */ }
//! }
//! ```

pub mod chunk;
mod console;
pub mod telegram;
mod traits;
mod types;

pub use chunk::{Chunk, Chunker, MarkdownChunker, chunk_markdown};
pub use console::ConsoleTransport;
pub use telegram::{TelegramConfig, TelegramTransport};
pub use traits::DraftTransport;
#[cfg(any(test, feature = "test-utils"))]
pub use traits::mock;
pub use types::{MessageHandle, ParseMode, SendOptions};
