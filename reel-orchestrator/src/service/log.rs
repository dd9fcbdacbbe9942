//! Log Bus
//!
//! Unbounded multi-producer queue of progress lines with a single
//! consumption point. The running job and the generation clients publish;
//! the `/api/logs` stream drains.

use reel_core::LogSink;
use reel_core::domain::log::LogEntry;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};

/// Thread-safe FIFO of log entries
///
/// Several observers may drain concurrently; each entry is delivered to
/// exactly one of them.
#[derive(Debug)]
pub struct LogBus {
    sender: mpsc::UnboundedSender<LogEntry>,
    receiver: Mutex<mpsc::UnboundedReceiver<LogEntry>>,
}

impl LogBus {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Waits up to `timeout` for the next entry
    pub async fn drain(&self, timeout: Duration) -> Option<LogEntry> {
        let mut receiver = self.receiver.lock().await;
        tokio::time::timeout(timeout, receiver.recv())
            .await
            .ok()
            .flatten()
    }

    /// Discards everything currently queued, returning how many entries were dropped
    pub async fn clear(&self) -> usize {
        let mut receiver = self.receiver.lock().await;
        let mut dropped = 0;
        while receiver.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}

impl Default for LogBus {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for LogBus {
    fn publish(&self, entry: LogEntry) {
        // The receiver lives as long as the bus, so this cannot fail
        let _ = self.sender.send(entry);
    }
}
