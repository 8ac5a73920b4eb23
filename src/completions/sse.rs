//! Incremental decoder for `text/event-stream` bodies.
//!
//! Only the `data` field is interpreted. The stream is terminated by a
//! `data: [DONE]` event, after which further input is ignored.

use bytes::{Buf, BytesMut};

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one event, multi-line data joined with `\n`.
    Data(String),
    /// The `[DONE]` terminator.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: BytesMut,
    data_lines: Vec<String>,
    done: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed raw body bytes; returns every event completed by them.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        self.buffer.extend_from_slice(bytes);

        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line = self.buffer.split_to(pos);
            self.buffer.advance(1);

            if let Some(event) = self.process_line(&line) {
                events.push(event);
                if self.done {
                    self.buffer.clear();
                    break;
                }
            }
        }

        events
    }

    /// Flush whatever is left once the body has ended without a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        if self.done {
            return None;
        }

        if !self.buffer.is_empty() {
            let line = self.buffer.split();
            if let Some(event) = self.process_line(&line) {
                return Some(event);
            }
        }

        self.dispatch()
    }

    fn process_line(&mut self, raw: &[u8]) -> Option<SseEvent> {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        if raw.is_empty() {
            return self.dispatch();
        }

        let line = String::from_utf8_lossy(raw);
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line.as_ref(), ""),
        };

        if field == "data" {
            self.data_lines.push(value.to_string());
        }

        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            return None;
        }

        let data = std::mem::take(&mut self.data_lines).join("\n");
        if data.trim() == DONE_SENTINEL {
            self.done = true;
            return Some(SseEvent::Done);
        }

        Some(SseEvent::Data(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(s: &str) -> SseEvent {
        SseEvent::Data(s.to_string())
    }

    #[test]
    fn decodes_events_and_done() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"a\":1}\n\ndata: {\"a\":2}\n\ndata: [DONE]\n\n");

        assert_eq!(events, vec![data("{\"a\":1}"), data("{\"a\":2}"), SseEvent::Done]);
        assert!(decoder.is_done());
    }

    #[test]
    fn events_split_across_reads() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"da").is_empty());
        assert!(decoder.push(b"ta: hel").is_empty());
        assert!(decoder.push(b"lo\n").is_empty());
        assert_eq!(decoder.push(b"\ndata: wor"), vec![data("hello")]);
        assert_eq!(decoder.push(b"ld\n\n"), vec![data("world")]);
    }

    #[test]
    fn multibyte_utf8_split_across_reads() {
        let mut decoder = SseDecoder::new();
        let bytes = "data: héllo\n\n".as_bytes();
        // split inside the two-byte 'é'
        let (a, b) = bytes.split_at(8);
        assert!(decoder.push(a).is_empty());
        assert_eq!(decoder.push(b), vec![data("héllo")]);
    }

    #[test]
    fn crlf_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\r\nevent: message\r\nid: 7\r\ndata: x\r\n\r\n");
        assert_eq!(events, vec![data("x")]);
    }

    #[test]
    fn multi_line_data_is_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: first\ndata:second\n\n");
        assert_eq!(events, vec![data("first\nsecond")]);
    }

    #[test]
    fn input_after_done_is_ignored() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: [DONE]\n\ndata: late\n\n");
        assert_eq!(events, vec![SseEvent::Done]);
        assert!(decoder.push(b"data: later\n\n").is_empty());
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn finish_flushes_trailing_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").is_empty());
        assert_eq!(decoder.finish(), Some(data("tail")));
        assert_eq!(decoder.finish(), None);
    }
}
