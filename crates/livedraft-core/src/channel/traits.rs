//! Transport Trait Definitions
//!
//! Defines the narrow interface the draft engine needs from a chat backend.

use async_trait::async_trait;

use super::types::{MessageHandle, SendOptions};
use crate::error::TransportError;

/// Chat transport able to create and edit messages in place
///
/// # Example
///
/// ```ignore
/// struct MyTransport { /* ... */ }
///
/// #[async_trait]
/// impl DraftTransport for MyTransport {
///     async fn create_message(
///         &self,
///         chat_id: &str,
///         content: &str,
///         options: &SendOptions,
///     ) -> Result<MessageHandle, TransportError> {
///         // Post a new message
///     }
///
///     async fn edit_message(
///         &self,
///         chat_id: &str,
///         message_id: &str,
///         content: &str,
///         options: &SendOptions,
///     ) -> Result<MessageHandle, TransportError> {
///         // Replace the text of an existing message
///     }
/// }
/// ```
#[async_trait]
pub trait DraftTransport: Send + Sync {
    /// Post a new message to the chat
    async fn create_message(
        &self,
        chat_id: &str,
        content: &str,
        options: &SendOptions,
    ) -> Result<MessageHandle, TransportError>;

    /// Replace the content of an existing message
    ///
    /// Implementations should report unchanged content as
    /// [`TransportError::NotModified`] (or an error for which
    /// [`TransportError::is_not_modified`] holds).
    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        content: &str,
        options: &SendOptions,
    ) -> Result<MessageHandle, TransportError>;
}

/// Recording transport for tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::time::Instant;

    /// One recorded transport call
    #[derive(Debug, Clone, PartialEq)]
    pub enum TransportCall {
        Create {
            chat_id: String,
            content: String,
            options: SendOptions,
            at: Instant,
        },
        Edit {
            chat_id: String,
            message_id: String,
            content: String,
            options: SendOptions,
            at: Instant,
        },
    }

    impl TransportCall {
        pub fn content(&self) -> &str {
            match self {
                Self::Create { content, .. } | Self::Edit { content, .. } => content,
            }
        }

        pub fn at(&self) -> Instant {
            match self {
                Self::Create { at, .. } | Self::Edit { at, .. } => *at,
            }
        }

        pub fn options(&self) -> &SendOptions {
            match self {
                Self::Create { options, .. } | Self::Edit { options, .. } => options,
            }
        }

        pub fn is_create(&self) -> bool {
            matches!(self, Self::Create { .. })
        }

        pub fn is_edit(&self) -> bool {
            matches!(self, Self::Edit { .. })
        }
    }

    /// A transport that records every call and can inject failures
    ///
    /// Created messages get sequential ids starting at `"1"`. Failures are
    /// armed per call ordinal (1-based, counted separately for creates and
    /// edits), so a test can fail e.g. exactly the third create.
    #[derive(Default)]
    pub struct MockTransport {
        calls: Mutex<Vec<TransportCall>>,
        create_count: AtomicUsize,
        edit_count: AtomicUsize,
        create_failures: Mutex<HashMap<usize, TransportError>>,
        edit_failures: Mutex<HashMap<usize, TransportError>>,
        latency: Option<Duration>,
    }

    impl MockTransport {
        /// Create a new mock transport
        pub fn new() -> Self {
            Self::default()
        }

        /// Delay every call by `latency` before it is recorded
        pub fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = Some(latency);
            self
        }

        /// Fail the `ordinal`-th create call with `error`
        pub fn fail_create(&self, ordinal: usize, error: TransportError) {
            self.create_failures.lock().insert(ordinal, error);
        }

        /// Fail the `ordinal`-th edit call with `error`
        pub fn fail_edit(&self, ordinal: usize, error: TransportError) {
            self.edit_failures.lock().insert(ordinal, error);
        }

        /// Get all recorded calls
        pub fn calls(&self) -> Vec<TransportCall> {
            self.calls.lock().clone()
        }

        /// Recorded create calls only
        pub fn creates(&self) -> Vec<TransportCall> {
            self.calls().into_iter().filter(|c| c.is_create()).collect()
        }

        /// Recorded edit calls only
        pub fn edits(&self) -> Vec<TransportCall> {
            self.calls().into_iter().filter(|c| c.is_edit()).collect()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl DraftTransport for MockTransport {
        async fn create_message(
            &self,
            chat_id: &str,
            content: &str,
            options: &SendOptions,
        ) -> Result<MessageHandle, TransportError> {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let ordinal = self.create_count.fetch_add(1, Ordering::SeqCst) + 1;
            self.calls.lock().push(TransportCall::Create {
                chat_id: chat_id.to_string(),
                content: content.to_string(),
                options: options.clone(),
                at: Instant::now(),
            });
            if let Some(error) = self.create_failures.lock().remove(&ordinal) {
                return Err(error);
            }
            Ok(MessageHandle::new(ordinal.to_string(), content))
        }

        async fn edit_message(
            &self,
            chat_id: &str,
            message_id: &str,
            content: &str,
            options: &SendOptions,
        ) -> Result<MessageHandle, TransportError> {
            if let Some(latency) = self.latency {
                tokio::time::sleep(latency).await;
            }
            let ordinal = self.edit_count.fetch_add(1, Ordering::SeqCst) + 1;
            self.calls.lock().push(TransportCall::Edit {
                chat_id: chat_id.to_string(),
                message_id: message_id.to_string(),
                content: content.to_string(),
                options: options.clone(),
                at: Instant::now(),
            });
            if let Some(error) = self.edit_failures.lock().remove(&ordinal) {
                return Err(error);
            }
            Ok(MessageHandle::new(message_id, content))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{MockTransport, TransportCall};
    use super::*;

    #[tokio::test]
    async fn test_mock_transport_create_assigns_sequential_ids() {
        let transport = MockTransport::new();

        let first = transport
            .create_message("chat-1", "Hello", &SendOptions::default())
            .await
            .unwrap();
        let second = transport
            .create_message("chat-1", "World", &SendOptions::default())
            .await
            .unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(transport.creates().len(), 2);
    }

    #[tokio::test]
    async fn test_mock_transport_records_edits() {
        let transport = MockTransport::new();

        transport
            .edit_message("chat-1", "7", "Updated", &SendOptions::default())
            .await
            .unwrap();

        let edits = transport.edits();
        assert_eq!(edits.len(), 1);
        match &edits[0] {
            TransportCall::Edit {
                message_id, content, ..
            } => {
                assert_eq!(message_id, "7");
                assert_eq!(content, "Updated");
            }
            other => panic!("expected edit, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mock_transport_injected_failure_fires_once() {
        let transport = MockTransport::new();
        transport.fail_edit(1, TransportError::NotModified);

        let first = transport
            .edit_message("chat-1", "1", "same", &SendOptions::default())
            .await;
        assert!(first.unwrap_err().is_not_modified());

        let second = transport
            .edit_message("chat-1", "1", "same", &SendOptions::default())
            .await;
        assert!(second.is_ok());
        assert_eq!(transport.call_count(), 2);
    }
}
