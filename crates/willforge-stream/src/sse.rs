//! Incremental server-sent-event parsing
//!
//! Small two-field record model over a chunked byte stream: an
//! `event:` line names the next record, a `data:` line emits one, a
//! blank line resets the pending event name. A single buffered partial
//! line is retained across feeds so chunk boundaries (including ones
//! that split multi-byte characters) never corrupt a record.

/// One parsed event record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseRecord {
    /// Event name from the preceding `event:` line; empty when the
    /// server sent none
    pub event: String,
    /// Raw data payload, whitespace-trimmed
    pub data: String,
}

/// Incremental parser over chunked stream bytes
#[derive(Debug, Default)]
pub struct SseParser {
    /// Bytes of the trailing, not-yet-terminated line
    buffer: Vec<u8>,
    /// Pending event name for the next data line
    pending_event: String,
}

impl SseParser {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of stream bytes, returning every record
    /// completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseRecord> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes[..line_bytes.len() - 1]);
            let line = line.strip_suffix('\r').unwrap_or(&line);

            if let Some(rest) = line.strip_prefix("event:") {
                self.pending_event = rest.trim().to_string();
                continue;
            }

            if let Some(rest) = line.strip_prefix("data:") {
                let data = rest.trim();
                if data.is_empty() {
                    continue;
                }
                records.push(SseRecord {
                    event: self.pending_event.clone(),
                    data: data.to_string(),
                });
                continue;
            }

            // Blank line ends the event; anything else (comments,
            // id/retry fields) is ignored
            if line.is_empty() {
                self.pending_event.clear();
            }
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(event: &str, data: &str) -> SseRecord {
        SseRecord {
            event: event.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn parses_event_data_pairs() {
        let mut parser = SseParser::new();
        let records = parser.feed(b"event: delta\ndata: {\"content\":\"Hi\"}\n\n");
        assert_eq!(records, vec![record("delta", "{\"content\":\"Hi\"}")]);
    }

    #[test]
    fn partial_line_retained_across_feeds() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"event: del").is_empty());
        assert!(parser.feed(b"ta\ndata: {\"content\":").is_empty());
        let records = parser.feed(b"\"Hi\"}\n");
        assert_eq!(records, vec![record("delta", "{\"content\":\"Hi\"}")]);
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let mut parser = SseParser::new();
        let payload = "data: {\"content\":\"Señor\"}\n".as_bytes();
        // Split inside the two-byte 'ñ'
        let split = payload.iter().position(|&b| b == 0xc3).unwrap() + 1;
        assert!(parser.feed(&payload[..split]).is_empty());
        let records = parser.feed(&payload[split..]);
        assert_eq!(records, vec![record("", "{\"content\":\"Señor\"}")]);
    }

    #[test]
    fn blank_line_resets_pending_event() {
        let mut parser = SseParser::new();
        let records = parser.feed(b"event: delta\ndata: a\n\ndata: b\n");
        assert_eq!(records, vec![record("delta", "a"), record("", "b")]);
    }

    #[test]
    fn event_name_reused_within_block() {
        let mut parser = SseParser::new();
        let records = parser.feed(b"event: delta\ndata: a\ndata: b\n");
        assert_eq!(records, vec![record("delta", "a"), record("delta", "b")]);
    }

    #[test]
    fn empty_data_lines_and_comments_skipped() {
        let mut parser = SseParser::new();
        let records = parser.feed(b": keep-alive\nevent: delta\ndata:\ndata: x\n");
        assert_eq!(records, vec![record("delta", "x")]);
    }

    #[test]
    fn crlf_line_endings_accepted() {
        let mut parser = SseParser::new();
        let records = parser.feed(b"event: done\r\ndata: {}\r\n\r\n");
        assert_eq!(records, vec![record("done", "{}")]);
    }
}
