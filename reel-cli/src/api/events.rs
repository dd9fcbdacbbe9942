//! Server-Sent Events decoding for the log stream

use reel_core::dto::log::LogFrame;

/// Incremental decoder for `data: {...}` lines
///
/// Chunks may split lines (and multi-byte characters) anywhere; incomplete
/// input is buffered until its newline arrives.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns every frame it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<LogFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            if let Some(frame) = parse_data_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }
}

/// Parses one `data:` line; comments, event names and blank lines are ignored
fn parse_data_line(line: &str) -> Option<LogFrame> {
    let data = line.strip_prefix("data:")?.trim_start();
    serde_json::from_str(data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decodes_complete_events() {
        let mut decoder = EventDecoder::new();
        let frames = decoder.feed(
            b"data: {\"log\":\"[2025-01-31 12:00:00] [INFO] hello\"}\n\ndata: {\"log\":\"\"}\n\n",
        );

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].log, "[2025-01-31 12:00:00] [INFO] hello");
        assert!(frames[1].is_heartbeat());
    }

    #[test]
    fn test_buffers_split_lines() {
        let mut decoder = EventDecoder::new();
        let event = "data: {\"log\":\"✅ Video generation completed!\"}\n\n".as_bytes();
        // Split inside the multi-byte check mark
        let (head, tail) = event.split_at(15);

        assert!(decoder.feed(head).is_empty());
        let frames = decoder.feed(tail);

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].log, "✅ Video generation completed!");
    }

    #[test]
    fn test_ignores_non_data_lines() {
        let mut decoder = EventDecoder::new();
        let frames = decoder.feed(b": keep-alive\r\nevent: log\r\ndata: not json\r\n\r\n");
        assert!(frames.is_empty());
    }
}
