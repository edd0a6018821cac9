//! Console transport: prints create/edit events instead of calling a chat API.

use async_trait::async_trait;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

use super::traits::DraftTransport;
use super::types::{MessageHandle, SendOptions};
use crate::error::TransportError;

pub struct ConsoleTransport {
    output: Mutex<Box<dyn Write + Send>>,
    next_id: AtomicU64,
}

impl ConsoleTransport {
    pub fn new(output: Box<dyn Write + Send>) -> Self {
        Self {
            output: Mutex::new(output),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    async fn emit(&self, line: String) -> Result<(), TransportError> {
        let mut output = self.output.lock().await;
        writeln!(output, "{}", line)?;
        output.flush()?;
        Ok(())
    }
}

#[async_trait]
impl DraftTransport for ConsoleTransport {
    async fn create_message(
        &self,
        chat_id: &str,
        content: &str,
        _options: &SendOptions,
    ) -> Result<MessageHandle, TransportError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        self.emit(format!("[create {}#{}] {}", chat_id, id, content))
            .await?;
        Ok(MessageHandle::new(id, content))
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        content: &str,
        _options: &SendOptions,
    ) -> Result<MessageHandle, TransportError> {
        self.emit(format!("[edit {}#{}] {}", chat_id, message_id, content))
            .await?;
        Ok(MessageHandle::new(message_id, content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex as SyncMutex;
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<SyncMutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_console_transport_prints_events() {
        let buffer = SharedBuffer::default();
        let transport = ConsoleTransport::new(Box::new(buffer.clone()));

        let created = transport
            .create_message("demo", "Hello▌", &SendOptions::default())
            .await
            .unwrap();
        transport
            .edit_message("demo", &created.id, "Hello", &SendOptions::default())
            .await
            .unwrap();

        let printed = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert_eq!(printed, "[create demo#1] Hello▌\n[edit demo#1] Hello\n");
    }

    #[tokio::test]
    async fn test_console_transport_sequential_ids() {
        let transport = ConsoleTransport::new(Box::new(io::sink()));
        let first = transport
            .create_message("demo", "a", &SendOptions::default())
            .await
            .unwrap();
        let second = transport
            .create_message("demo", "b", &SendOptions::default())
            .await
            .unwrap();
        assert_eq!((first.id.as_str(), second.id.as_str()), ("1", "2"));
    }
}
