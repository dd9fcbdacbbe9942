//! Log DTOs for the control surface

use serde::{Deserialize, Serialize};

use crate::domain::log::LogEntry;

/// One frame of the `/api/logs` event stream
///
/// An empty `log` is a heartbeat sent while the bus is idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogFrame {
    pub log: String,
}

impl LogFrame {
    pub fn heartbeat() -> Self {
        Self::default()
    }

    pub fn is_heartbeat(&self) -> bool {
        self.log.is_empty()
    }
}

impl From<&LogEntry> for LogFrame {
    fn from(entry: &LogEntry) -> Self {
        Self {
            log: entry.to_string(),
        }
    }
}
